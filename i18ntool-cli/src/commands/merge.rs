//! `i18ntool merge`: reconcile language files with the source file.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use i18ntool_core::options::OptionKey;
use i18ntool_sync::{merge, MergeOutcome, MergeReport, WriteResult};

use super::{resolve_options, CommonArgs, RunStatus};
use crate::prompt;

#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Drop target units whose id is gone from the source.
    #[arg(long = "removeUnusedIds", value_name = "BOOL")]
    pub remove_unused_ids: Option<bool>,

    /// Also append source units missing from a target file.
    #[arg(long = "addMissingUnits")]
    pub add_missing_units: bool,

    /// Print a diff of each change instead of writing files.
    #[arg(long = "dryRun")]
    pub dry_run: bool,
}

impl MergeArgs {
    pub fn run(self) -> Result<RunStatus> {
        let mut raw = self.common.into_raw();
        raw.remove_unused_ids = self.remove_unused_ids;
        raw.add_missing_units = self.add_missing_units.then_some(true);
        raw.dry_run = self.dry_run.then_some(true);

        let mut options = resolve_options(raw)?;
        let mut prompter = prompt::for_options(&options);
        prompt::fill_missing(&mut options, &[OptionKey::Languages], prompter.as_mut())?;

        let report = merge::run(&options)?;
        if !options.quiet {
            print_report(&report);
        }
        for language in &report.languages {
            if let MergeOutcome::Failed { error } = &language.outcome {
                eprintln!(
                    "{} language '{}': {error}",
                    "error:".red().bold(),
                    language.language
                );
            }
        }
        Ok(RunStatus::from_partial(report.is_partial()))
    }
}

fn print_report(report: &MergeReport) {
    for language in &report.languages {
        match &language.outcome {
            MergeOutcome::Merged {
                result,
                appended,
                write,
                diff,
            } => {
                let verb = match write {
                    WriteResult::Written { .. } => "Updated",
                    WriteResult::Unchanged { .. } => "Checked",
                    WriteResult::WouldWrite { .. } => "Would update",
                };
                let mut line = format!(
                    "{} language '{}'. Added {} missing target tags. Removed {} unused trans units.",
                    verb, language.language, result.added, result.removed
                );
                if *appended > 0 {
                    line.push_str(&format!(" Appended {appended} new trans units."));
                }
                println!("{} {line}", "✓".green().bold());
                if let Some(diff) = diff {
                    print!("{diff}");
                }
            }
            MergeOutcome::MissingTarget { path } => println!(
                "{} language '{}': no file at {}, skipped",
                "!".yellow().bold(),
                language.language,
                path.display()
            ),
            MergeOutcome::Failed { .. } => {}
        }
    }
    println!(
        "{} of {} language file(s) merged",
        report.processed(),
        report.languages.len()
    );
}
