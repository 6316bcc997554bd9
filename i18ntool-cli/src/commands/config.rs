//! `i18ntool config <key> <value>`: persist a user setting.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;

use i18ntool_core::{FileSettings, SettingsStore};

use super::RunStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettingKey {
    Token,
    Username,
    Email,
}

impl SettingKey {
    fn as_str(self) -> &'static str {
        match self {
            SettingKey::Token => "token",
            SettingKey::Username => "username",
            SettingKey::Email => "email",
        }
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Setting to change.
    #[arg(value_enum)]
    pub key: SettingKey,

    /// New value.
    pub value: String,
}

impl ConfigArgs {
    pub fn run(self) -> Result<RunStatus> {
        let mut settings = FileSettings::open().context("could not open settings")?;
        save(&mut settings, self.key, &self.value)?;
        println!(
            "{} saved {} to {}",
            "✓".green().bold(),
            self.key.as_str(),
            settings.path().display()
        );
        Ok(RunStatus::Complete)
    }
}

fn save(settings: &mut dyn SettingsStore, key: SettingKey, value: &str) -> Result<()> {
    settings
        .set(key.as_str(), value)
        .with_context(|| format!("could not save {}", key.as_str()))
}
