//! Subcommand implementations and the flags they share.

pub mod config;
pub mod merge;
pub mod pull;
pub mod push;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use i18ntool_core::{settings::TOKEN_KEY, Options, RawOptions, SettingsError, SettingsStore};
use i18ntool_remote::TransifexClient;

use crate::prompt::Prompter;

/// How a command finished, mapped to the process exit code by `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Everything succeeded.
    Complete,
    /// The batch ran to the end but some items failed or were skipped.
    Partial,
}

impl RunStatus {
    pub fn from_partial(partial: bool) -> Self {
        if partial {
            RunStatus::Partial
        } else {
            RunStatus::Complete
        }
    }
}

/// Options understood by every file/remote command.
///
/// Flag spellings mirror `i18ntool_core::options::OPTION_TABLE`, which is also
/// what config-file keys are matched against.
#[derive(Args, Debug, Default, Clone)]
pub struct CommonArgs {
    /// JSON config file; its values override flags, its directory anchors paths.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Directory holding the source file [default: .]
    #[arg(long = "srcDir", visible_alias = "sourceDirectory", value_name = "DIR")]
    pub src_dir: Option<PathBuf>,

    /// Directory holding messages.<lang>.xlf files [default: .]
    #[arg(long = "tarDir", visible_alias = "targetDirectory", value_name = "DIR")]
    pub tar_dir: Option<PathBuf>,

    /// Source file name [default: messages.xlf]
    #[arg(long = "srcFile", visible_alias = "sourceFile", value_name = "FILE")]
    pub src_file: Option<String>,

    /// Comma-separated language codes, e.g. de_DE,en-GB.
    #[arg(short = 'l', long)]
    pub languages: Option<String>,

    /// Suppress progress output.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Organization slug on the service.
    #[arg(short = 'o', long)]
    pub organization: Option<String>,

    /// Project slug on the service.
    #[arg(short = 'p', long)]
    pub project: Option<String>,

    /// Remote resource as Name:Slug.
    #[arg(short = 'r', long, value_name = "NAME:SLUG")]
    pub resource: Option<String>,

    /// Never prompt; fail on missing input instead.
    #[arg(short = 'a', long)]
    pub automate: bool,
}

impl CommonArgs {
    /// Flags as unresolved options. Unset switches stay `None` so a config
    /// file can still set them.
    pub fn into_raw(self) -> RawOptions {
        RawOptions {
            config: self.config,
            src_dir: self.src_dir,
            tar_dir: self.tar_dir,
            src_file: self.src_file,
            languages: self.languages,
            quiet: self.quiet.then_some(true),
            organization: self.organization,
            project: self.project,
            resource: self.resource,
            automate: self.automate.then_some(true),
            ..RawOptions::default()
        }
    }
}

/// Overlay the config file and resolve against the working directory.
pub fn resolve_options(raw: RawOptions) -> Result<Options> {
    let cwd = std::env::current_dir().context("could not determine the working directory")?;
    let options = raw.overlay_config(&cwd)?.resolve(&cwd)?;
    tracing::debug!(?options, "resolved options");
    Ok(options)
}

/// The stored API token, or one asked for and then saved.
pub fn api_token(settings: &mut dyn SettingsStore, prompter: &mut dyn Prompter) -> Result<String> {
    match settings.get(TOKEN_KEY) {
        Ok(token) => Ok(token),
        Err(SettingsError::KeyNotSet { .. }) => {
            let token = prompter
                .ask("API token")?
                .context("no API token stored; run `i18ntool config token <value>` first")?;
            settings.set(TOKEN_KEY, &token)?;
            Ok(token)
        }
        Err(err) => Err(err.into()),
    }
}

pub fn remote_client(
    settings: &mut dyn SettingsStore,
    prompter: &mut dyn Prompter,
) -> Result<TransifexClient> {
    Ok(TransifexClient::new(api_token(settings, prompter)?))
}
