//! i18ntool: keep XLIFF translation files in sync with a translation service.
//!
//! # Usage
//!
//! ```text
//! i18ntool push  -o <org> -p <project> -r <Name:Slug> [--srcDir DIR] [--srcFile FILE] [-a]
//! i18ntool pull  -o <org> -p <project> -r <Name:Slug> -l de,fr [--tarDir DIR]
//! i18ntool merge -l de,fr [--srcDir DIR] [--tarDir DIR] [--removeUnusedIds BOOL]
//!                [--addMissingUnits] [--dryRun]
//! i18ntool config token <value>
//! ```
//!
//! Exit codes: `0` success, `1` fatal error, `2` some languages failed or
//! were skipped.

mod commands;
mod prompt;

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;

use commands::{
    config::ConfigArgs, merge::MergeArgs, pull::PullArgs, push::PushArgs, RunStatus,
};

/// Log filter variable; defaults to `warn`.
const LOG_ENV: &str = "I18NTOOL_LOG";

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "i18ntool",
    version,
    about = "Push, pull and merge XLIFF translation files",
    long_about = None,
    disable_version_flag = true,
)]
struct Cli {
    /// Print version.
    #[allow(dead_code)]
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload the source file, creating the remote resource if needed.
    Push(PushArgs),

    /// Download translations for each language.
    Pull(PullArgs),

    /// Reconcile language files with the source file.
    Merge(MergeArgs),

    /// Store a setting such as the API token.
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(RunStatus::Complete) => ExitCode::SUCCESS,
        Ok(RunStatus::Partial) => ExitCode::from(2),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<RunStatus> {
    match cli.command {
        Commands::Push(args) => args.run(),
        Commands::Pull(args) => args.run(),
        Commands::Merge(args) => args.run(),
        Commands::Config(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use i18ntool_core::options::OPTION_TABLE;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn every_option_alias_is_a_flag() {
        let cli = Cli::command();
        let merge = cli.find_subcommand("merge").expect("merge");
        let push = cli.find_subcommand("push").expect("push");
        for alias in OPTION_TABLE {
            let known = |long: &str| {
                [merge, push].iter().any(|cmd| {
                    cmd.get_arguments().any(|arg| {
                        arg.get_long() == Some(long)
                            || arg
                                .get_visible_aliases()
                                .is_some_and(|aliases| aliases.contains(&long))
                    })
                })
            };
            assert!(known(alias.long), "--{} has no flag", alias.long);
            if let Some(other) = alias.alias {
                assert!(known(other), "--{other} has no flag");
            }
        }
    }

    #[test]
    fn short_flags_parse() {
        let cli = Cli::try_parse_from([
            "i18ntool", "pull", "-o", "acme", "-p", "web", "-r", "Master:master", "-l", "de", "-q",
            "-a",
        ])
        .expect("parse");
        match cli.command {
            Commands::Pull(args) => {
                assert_eq!(args.common.organization.as_deref(), Some("acme"));
                assert_eq!(args.common.resource.as_deref(), Some("Master:master"));
                assert!(args.common.quiet && args.common.automate);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn long_aliases_parse() {
        let cli = Cli::try_parse_from([
            "i18ntool",
            "merge",
            "--sourceDirectory",
            "src",
            "--targetDirectory",
            "locale",
            "--removeUnusedIds",
            "false",
            "--dryRun",
        ])
        .expect("parse");
        match cli.command {
            Commands::Merge(args) => {
                assert_eq!(args.common.src_dir, Some("src".into()));
                assert_eq!(args.common.tar_dir, Some("locale".into()));
                assert_eq!(args.remove_unused_ids, Some(false));
                assert!(args.dry_run);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
