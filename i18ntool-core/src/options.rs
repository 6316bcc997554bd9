//! Command options: alias table, config-file overlay, and resolution.
//!
//! Options flow through three stages:
//!
//! 1. [`RawOptions`]: everything optional, filled from command-line flags.
//! 2. [`RawOptions::overlay_config`]: values from the JSON config file named
//!    by `-c/--config` win over command-line values. Keys may be any spelling
//!    from [`OPTION_TABLE`].
//! 3. [`RawOptions::resolve`]: defaults applied, values validated, one
//!    immutable [`Options`] returned.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::types::{is_valid_slug, LanguageCode, ResourceSpec};

/// Default source file name inside the source directory.
pub const DEFAULT_SOURCE_FILE: &str = "messages.xlf";

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

/// Every option the tool understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Config,
    SourceDirectory,
    TargetDirectory,
    SourceFile,
    Languages,
    RemoveUnusedIds,
    AddMissingUnits,
    Quiet,
    Organization,
    Project,
    Resource,
    Automate,
    DryRun,
}

/// One row of the alias table: long flag, optional short flag, optional
/// alternate long spelling. Config-file keys may use any of the three.
#[derive(Debug, Clone, Copy)]
pub struct OptionAlias {
    pub key: OptionKey,
    pub long: &'static str,
    pub short: Option<&'static str>,
    pub alias: Option<&'static str>,
}

const fn row(
    key: OptionKey,
    long: &'static str,
    short: Option<&'static str>,
    alias: Option<&'static str>,
) -> OptionAlias {
    OptionAlias {
        key,
        long,
        short,
        alias,
    }
}

pub const OPTION_TABLE: &[OptionAlias] = &[
    row(OptionKey::Config, "config", Some("c"), None),
    row(OptionKey::SourceDirectory, "srcDir", None, Some("sourceDirectory")),
    row(OptionKey::TargetDirectory, "tarDir", None, Some("targetDirectory")),
    row(OptionKey::SourceFile, "srcFile", None, Some("sourceFile")),
    row(OptionKey::Languages, "languages", Some("l"), None),
    row(OptionKey::RemoveUnusedIds, "removeUnusedIds", None, None),
    row(OptionKey::AddMissingUnits, "addMissingUnits", None, None),
    row(OptionKey::Quiet, "quiet", Some("q"), None),
    row(OptionKey::Organization, "organization", Some("o"), None),
    row(OptionKey::Project, "project", Some("p"), None),
    row(OptionKey::Resource, "resource", Some("r"), None),
    row(OptionKey::Automate, "automate", Some("a"), None),
    row(OptionKey::DryRun, "dryRun", None, None),
];

impl OptionKey {
    /// Find the option for any spelling in the alias table.
    pub fn lookup(name: &str) -> Option<Self> {
        OPTION_TABLE
            .iter()
            .find(|row| row.long == name || row.short == Some(name) || row.alias == Some(name))
            .map(|row| row.key)
    }

    /// Canonical long flag name.
    pub fn name(self) -> &'static str {
        OPTION_TABLE
            .iter()
            .find(|row| row.key == self)
            .map(|row| row.long)
            .unwrap_or("unknown")
    }
}

// ---------------------------------------------------------------------------
// Raw options
// ---------------------------------------------------------------------------

/// Unresolved options as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
    pub config: Option<PathBuf>,
    pub src_dir: Option<PathBuf>,
    pub tar_dir: Option<PathBuf>,
    pub src_file: Option<String>,
    pub languages: Option<String>,
    pub remove_unused_ids: Option<bool>,
    pub add_missing_units: Option<bool>,
    pub quiet: Option<bool>,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub resource: Option<String>,
    pub automate: Option<bool>,
    pub dry_run: Option<bool>,
}

impl RawOptions {
    /// Load the config file named by `config` (relative to `cwd`) and overlay
    /// its values. A no-op when no config file was given.
    pub fn overlay_config(mut self, cwd: &Path) -> Result<Self, ConfigError> {
        let Some(config) = self.config.clone() else {
            return Ok(self);
        };
        let path = cwd.join(&config);
        let entries = load_config_file(&path)?;
        for (key, value) in &entries {
            match OptionKey::lookup(key) {
                Some(OptionKey::Config) => {
                    tracing::warn!("ignoring nested 'config' key in {}", path.display());
                }
                Some(option) => self.set(option, value).map_err(|reason| ConfigError::Load {
                    path: path.clone(),
                    reason: format!("option '{key}': {reason}"),
                })?,
                None => {
                    tracing::warn!("ignoring unknown option '{key}' in {}", path.display());
                }
            }
        }
        Ok(self)
    }

    /// Assign one JSON value to the matching field.
    fn set(&mut self, key: OptionKey, value: &Value) -> Result<(), String> {
        match key {
            OptionKey::Config => self.config = Some(PathBuf::from(expect_str(value)?)),
            OptionKey::SourceDirectory => self.src_dir = Some(PathBuf::from(expect_str(value)?)),
            OptionKey::TargetDirectory => self.tar_dir = Some(PathBuf::from(expect_str(value)?)),
            OptionKey::SourceFile => self.src_file = Some(expect_str(value)?.to_owned()),
            OptionKey::Languages => self.languages = Some(expect_list(value)?),
            OptionKey::RemoveUnusedIds => self.remove_unused_ids = Some(expect_bool(value)?),
            OptionKey::AddMissingUnits => self.add_missing_units = Some(expect_bool(value)?),
            OptionKey::Quiet => self.quiet = Some(expect_bool(value)?),
            OptionKey::Organization => self.organization = Some(expect_str(value)?.to_owned()),
            OptionKey::Project => self.project = Some(expect_str(value)?.to_owned()),
            OptionKey::Resource => self.resource = Some(expect_str(value)?.to_owned()),
            OptionKey::Automate => self.automate = Some(expect_bool(value)?),
            OptionKey::DryRun => self.dry_run = Some(expect_bool(value)?),
        }
        Ok(())
    }

    /// Apply defaults and validate. Paths are anchored at `cwd`, or at the
    /// config file's directory when a config file is in use.
    pub fn resolve(self, cwd: &Path) -> Result<Options, ConfigError> {
        let base_dir = match &self.config {
            Some(config) => cwd
                .join(config)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.to_path_buf()),
            None => cwd.to_path_buf(),
        };

        let languages = match self.languages.as_deref() {
            Some(list) => LanguageCode::parse_list(list)?,
            None => Vec::new(),
        };
        let resource = self
            .resource
            .as_deref()
            .map(str::parse::<ResourceSpec>)
            .transpose()?;
        let organization = validate_slug("organization", self.organization)?;
        let project = validate_slug("project", self.project)?;

        Ok(Options {
            base_dir,
            src_dir: self.src_dir.unwrap_or_else(|| PathBuf::from(".")),
            tar_dir: self.tar_dir.unwrap_or_else(|| PathBuf::from(".")),
            src_file: self
                .src_file
                .unwrap_or_else(|| DEFAULT_SOURCE_FILE.to_string()),
            languages,
            remove_unused_ids: self.remove_unused_ids.unwrap_or(true),
            add_missing_units: self.add_missing_units.unwrap_or(false),
            quiet: self.quiet.unwrap_or(false),
            automate: self.automate.unwrap_or(false),
            dry_run: self.dry_run.unwrap_or(false),
            organization,
            project,
            resource,
        })
    }
}

fn load_config_file(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let load_err = |reason: String| ConfigError::Load {
        path: path.to_path_buf(),
        reason,
    };
    let contents = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    match serde_json::from_str::<Value>(&contents).map_err(|e| load_err(e.to_string()))? {
        Value::Object(map) => Ok(map),
        _ => Err(load_err("expected a JSON object".to_string())),
    }
}

fn expect_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {value}"))
}

fn expect_bool(value: &Value) -> Result<bool, String> {
    value
        .as_bool()
        .ok_or_else(|| format!("expected true or false, got {value}"))
}

/// Languages may be written as `"de,fr"` or `["de", "fr"]`.
fn expect_list(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Array(items) => items
            .iter()
            .map(|item| expect_str(item).map(str::to_owned))
            .collect::<Result<Vec<_>, _>>()
            .map(|items| items.join(",")),
        other => Err(format!("expected a string or a list of strings, got {other}")),
    }
}

fn validate_slug(option: &'static str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        Some(slug) if !is_valid_slug(&slug) => Err(ConfigError::InvalidValue {
            option,
            value: slug,
            reason: "only alphanumeric characters, '_' and '-' are allowed",
        }),
        other => Ok(other),
    }
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

/// Fully resolved, immutable options for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Directory that `src_dir` and `tar_dir` are relative to.
    pub base_dir: PathBuf,
    pub src_dir: PathBuf,
    pub tar_dir: PathBuf,
    pub src_file: String,
    pub languages: Vec<LanguageCode>,
    pub remove_unused_ids: bool,
    pub add_missing_units: bool,
    pub quiet: bool,
    pub automate: bool,
    pub dry_run: bool,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub resource: Option<ResourceSpec>,
}

impl Options {
    /// `<base>/<srcDir>/<srcFile>`
    pub fn source_path(&self) -> PathBuf {
        self.base_dir.join(&self.src_dir).join(&self.src_file)
    }

    /// `<base>/<tarDir>`
    pub fn target_dir(&self) -> PathBuf {
        self.base_dir.join(&self.tar_dir)
    }

    /// `<base>/<tarDir>/messages.<lang>.xlf`
    pub fn target_path(&self, language: &LanguageCode) -> PathBuf {
        target_path_in(&self.target_dir(), language)
    }

    /// Names of the `required` options that are still unset.
    pub fn missing(&self, required: &[OptionKey]) -> Vec<&'static str> {
        required
            .iter()
            .filter(|key| match key {
                OptionKey::Languages => self.languages.is_empty(),
                OptionKey::Organization => self.organization.is_none(),
                OptionKey::Project => self.project.is_none(),
                OptionKey::Resource => self.resource.is_none(),
                _ => false,
            })
            .map(|key| key.name())
            .collect()
    }

    /// Fail with every missing option listed at once.
    pub fn require(&self, required: &[OptionKey]) -> Result<(), ConfigError> {
        let names = self.missing(required);
        if names.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingArguments { names })
        }
    }
}

/// `messages.<lang>.xlf`
pub fn target_file_name(language: &LanguageCode) -> String {
    format!("messages.{language}.xlf")
}

/// `<dir>/messages.<lang>.xlf`
pub fn target_path_in(dir: &Path, language: &LanguageCode) -> PathBuf {
    dir.join(target_file_name(language))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("c", OptionKey::Config)]
    #[case("srcDir", OptionKey::SourceDirectory)]
    #[case("sourceDirectory", OptionKey::SourceDirectory)]
    #[case("targetDirectory", OptionKey::TargetDirectory)]
    #[case("sourceFile", OptionKey::SourceFile)]
    #[case("l", OptionKey::Languages)]
    #[case("q", OptionKey::Quiet)]
    #[case("o", OptionKey::Organization)]
    #[case("p", OptionKey::Project)]
    #[case("r", OptionKey::Resource)]
    #[case("a", OptionKey::Automate)]
    fn alias_lookup(#[case] name: &str, #[case] expected: OptionKey) {
        assert_eq!(OptionKey::lookup(name), Some(expected));
    }

    #[test]
    fn unknown_alias_is_none() {
        assert_eq!(OptionKey::lookup("colour"), None);
    }

    #[test]
    fn every_key_has_a_long_name() {
        for row in OPTION_TABLE {
            assert_eq!(row.key.name(), row.long);
            assert_eq!(OptionKey::lookup(row.long), Some(row.key));
        }
    }

    #[test]
    fn defaults_apply() {
        let opts = RawOptions::default().resolve(Path::new("/work")).expect("resolve");
        assert_eq!(opts.source_path(), PathBuf::from("/work/./messages.xlf"));
        assert!(opts.remove_unused_ids);
        assert!(!opts.add_missing_units);
        assert!(!opts.quiet);
        assert!(opts.languages.is_empty());
    }

    #[test]
    fn target_path_uses_language_code() {
        let raw = RawOptions {
            tar_dir: Some(PathBuf::from("src/locale")),
            ..Default::default()
        };
        let opts = raw.resolve(Path::new("/work")).expect("resolve");
        assert_eq!(
            opts.target_path(&LanguageCode::from("de_DE")),
            PathBuf::from("/work/src/locale/messages.de_DE.xlf")
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_lang = RawOptions {
            languages: Some("de,1".into()),
            ..Default::default()
        };
        assert!(bad_lang.resolve(Path::new("/")).is_err());

        let bad_resource = RawOptions {
            resource: Some("master".into()),
            ..Default::default()
        };
        assert!(bad_resource.resolve(Path::new("/")).is_err());

        let bad_project = RawOptions {
            project: Some("my project".into()),
            ..Default::default()
        };
        assert!(bad_project.resolve(Path::new("/")).is_err());
    }

    #[test]
    fn missing_lists_every_absent_option() {
        let opts = RawOptions {
            project: Some("dashboard".into()),
            ..Default::default()
        }
        .resolve(Path::new("/"))
        .expect("resolve");

        let required = [
            OptionKey::Organization,
            OptionKey::Project,
            OptionKey::Resource,
            OptionKey::Languages,
        ];
        assert_eq!(
            opts.missing(&required),
            vec!["organization", "resource", "languages"]
        );
        let err = opts.require(&required).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required option(s): --organization, --resource, --languages"
        );
    }

    #[test]
    fn languages_accept_json_array() {
        let mut raw = RawOptions::default();
        raw.set(OptionKey::Languages, &serde_json::json!(["de", "fr"]))
            .expect("set");
        assert_eq!(raw.languages.as_deref(), Some("de,fr"));
    }

    #[test]
    fn wrong_json_type_is_reported() {
        let mut raw = RawOptions::default();
        let err = raw
            .set(OptionKey::Quiet, &serde_json::json!("yes"))
            .unwrap_err();
        assert!(err.contains("expected true or false"));
    }
}
