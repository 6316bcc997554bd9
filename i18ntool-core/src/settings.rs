//! Persisted user settings (`~/.i18ntool`).
//!
//! # Storage layout
//!
//! ```text
//! ~/.i18ntool     JSON object, mode 0600: { "token": "…", … }
//! ```
//!
//! # API pattern
//!
//! [`FileSettings::open_at`] takes an explicit home directory and is what
//! tests use with `TempDir`; [`FileSettings::open`] derives home from
//! `dirs::home_dir()`. Commands receive a `&mut dyn SettingsStore` so tests can
//! inject [`MemorySettings`] instead.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{settings_io, SettingsError};

/// File name of the settings store inside the home directory.
pub const SETTINGS_FILE: &str = ".i18ntool";

/// Key holding the API token.
pub const TOKEN_KEY: &str = "token";

/// Keys accepted by `i18ntool config <key> <value>`.
pub const KNOWN_KEYS: &[&str] = &[TOKEN_KEY, "username", "email"];

/// Key/value settings store.
pub trait SettingsStore {
    /// Read a value; [`SettingsError::KeyNotSet`] when absent.
    fn get(&self, key: &str) -> Result<String, SettingsError>;

    /// Write a value and persist it.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Settings persisted as a JSON object in `<home>/.i18ntool`.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
    values: BTreeMap<String, serde_json::Value>,
}

/// `<home>/.i18ntool`, without touching the filesystem.
pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(SETTINGS_FILE)
}

impl FileSettings {
    /// Load the store under `home`, creating an empty `{}` file if absent.
    ///
    /// Unparsable content is treated as an empty store and overwritten on the
    /// next `set`.
    pub fn open_at(home: &Path) -> Result<Self, SettingsError> {
        let path = settings_path_at(home);
        if !path.exists() {
            write_atomic(&path, "{}")?;
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| settings_io(&path, e))?;
        let values = match serde_json::from_str(&contents) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!("ignoring unreadable settings at {}: {err}", path.display());
                BTreeMap::new()
            }
        };
        Ok(Self { path, values })
    }

    /// `open_at` convenience wrapper.
    pub fn open() -> Result<Self, SettingsError> {
        let home = dirs::home_dir().ok_or(SettingsError::HomeNotFound)?;
        Self::open_at(&home)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Result<String, SettingsError> {
        match self.values.get(key) {
            Some(serde_json::Value::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(SettingsError::KeyNotSet {
                key: key.to_owned(),
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values
            .insert(key.to_owned(), serde_json::Value::String(value.to_owned()));
        let json = serde_json::to_string_pretty(&self.values)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!("saved setting '{key}' to {}", self.path.display());
        Ok(())
    }
}

/// Write flow: `.tmp` sibling → `chmod 0600` → `rename`.
fn write_atomic(path: &Path, contents: &str) -> Result<(), SettingsError> {
    let tmp = path.with_file_name(format!("{SETTINGS_FILE}.tmp"));
    std::fs::write(&tmp, contents).map_err(|e| settings_io(&tmp, e))?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, path).map_err(|e| settings_io(path, e))?;
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), SettingsError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| settings_io(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), SettingsError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Non-persistent store for tests and one-off runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: BTreeMap<String, String>,
}

impl MemorySettings {
    pub fn with(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_owned(), value.to_owned());
        store
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<String, SettingsError> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| SettingsError::KeyNotSet {
                key: key.to_owned(),
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
