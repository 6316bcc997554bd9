//! `i18ntool pull`: download translations into messages.<lang>.xlf files.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use i18ntool_core::{options::OptionKey, FileSettings};
use i18ntool_remote::RetryPolicy;
use i18ntool_sync::{pull, PullOutcome};

use super::{remote_client, resolve_options, CommonArgs, RunStatus};
use crate::prompt;

#[derive(Args, Debug)]
pub struct PullArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

const REQUIRED: &[OptionKey] = &[
    OptionKey::Organization,
    OptionKey::Project,
    OptionKey::Resource,
    OptionKey::Languages,
];

impl PullArgs {
    pub fn run(self) -> Result<RunStatus> {
        let mut options = resolve_options(self.common.into_raw())?;
        let mut prompter = prompt::for_options(&options);
        prompt::fill_missing(&mut options, REQUIRED, prompter.as_mut())?;

        let mut settings = FileSettings::open().context("could not open settings")?;
        let client = remote_client(&mut settings, prompter.as_mut())?;

        let report = pull::run(&client, &options, &RetryPolicy::default())?;
        for language in &report.languages {
            match &language.outcome {
                PullOutcome::Pulled { write } if !options.quiet => println!(
                    "{} pulled '{}' into {}",
                    "✓".green().bold(),
                    language.language,
                    write.path().display()
                ),
                PullOutcome::Pulled { .. } => {}
                PullOutcome::Failed { error } => eprintln!(
                    "{} language '{}' of {}: {error}",
                    "error:".red().bold(),
                    language.language,
                    report.resource
                ),
            }
        }
        if !options.quiet {
            println!(
                "{} of {} language(s) pulled",
                report.pulled(),
                report.languages.len()
            );
        }
        Ok(RunStatus::from_partial(report.is_partial()))
    }
}
