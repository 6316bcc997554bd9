//! `i18ntool push`: upload the source file, creating the resource if needed.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use i18ntool_core::{options::OptionKey, FileSettings};
use i18ntool_remote::{RemoteResource, RetryPolicy};
use i18ntool_sync::{push, PushAction};

use super::{remote_client, resolve_options, CommonArgs, RunStatus};
use crate::prompt;

#[derive(Args, Debug)]
pub struct PushArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

const REQUIRED: &[OptionKey] = &[
    OptionKey::Organization,
    OptionKey::Project,
    OptionKey::Resource,
];

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "slug")]
    slug: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "format")]
    format: String,
}

impl PushArgs {
    pub fn run(self) -> Result<RunStatus> {
        let mut options = resolve_options(self.common.into_raw())?;
        let mut prompter = prompt::for_options(&options);
        prompt::fill_missing(&mut options, REQUIRED, prompter.as_mut())?;

        let content = push::read_content(&options)?;
        let mut settings = FileSettings::open().context("could not open settings")?;
        let client = remote_client(&mut settings, prompter.as_mut())?;

        let plan = push::plan(&client, &options)?;
        if !options.quiet {
            print_resources(&plan.available);
        }

        if plan.action == PushAction::Update && !options.automate {
            let question = format!(
                "Resource '{}' already exists. Replace its source strings?",
                plan.resource.slug
            );
            if !prompter.confirm(&question)? {
                bail!("push cancelled");
            }
        }

        let outcome = push::execute(&client, &plan, &content, &RetryPolicy::default())?;
        if !options.quiet {
            let verb = match outcome.action {
                PushAction::Create => "Created",
                PushAction::Update => "Updated",
            };
            let s = outcome.summary;
            println!(
                "{} {verb} resource '{}': {} added, {} updated, {} deleted, {} skipped",
                "✓".green().bold(),
                plan.resource,
                s.added,
                s.updated,
                s.deleted,
                s.skipped
            );
        }
        Ok(RunStatus::Complete)
    }
}

fn print_resources(resources: &[RemoteResource]) {
    if resources.is_empty() {
        println!("No resources in this project yet.");
        return;
    }
    let rows: Vec<ResourceRow> = resources
        .iter()
        .map(|r| ResourceRow {
            slug: r.slug.clone(),
            name: r.name.clone(),
            format: r.i18n_format.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", "Available resources".bold());
    println!("{table}");
}
