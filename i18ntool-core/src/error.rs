//! Error types for i18ntool-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while parsing or serializing an XLIFF document.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The underlying XML is not well-formed.
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    /// The document ended while elements were still open.
    #[error("unexpected end of document: {open} element(s) left unclosed")]
    Unbalanced { open: usize },

    /// Well-formed XML, but no `<xliff>` root element.
    #[error("document is not XLIFF (no <xliff> root element)")]
    NotXliff,

    /// A `<trans-unit>` without an `id` attribute.
    #[error("trans-unit at byte {position} has no id attribute")]
    MissingId { position: usize },

    /// A `<trans-unit>` without a `<source>` child.
    #[error("trans-unit '{id}' has no <source> element")]
    MissingSource { id: String },

    /// Two `<trans-unit>` elements share an id.
    #[error("duplicate trans-unit id '{id}'")]
    DuplicateId { id: String },

    /// Inline source/target content that would not survive re-parsing.
    #[error("trans-unit '{id}' has malformed {field} content: {detail}")]
    InvalidFragment {
        id: String,
        field: &'static str,
        detail: String,
    },

    /// Units were added in code but the document has nowhere to put them.
    #[error("cannot place {count} new trans-unit(s): document has no <body>")]
    NoBody { count: usize },
}

/// Errors from the persisted settings store (`~/.i18ntool`).
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The requested key has never been set.
    #[error("the requested setting '{key}' is not set yet")]
    KeyNotSet { key: String },

    /// Underlying I/O failure, annotated with the settings path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error on save.
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Errors from loading the config file and resolving options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or parsed. Fatal before any command runs.
    #[error("config file could not be loaded from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// An option value did not pass validation.
    #[error("invalid value '{value}' for --{option}: {reason}")]
    InvalidValue {
        option: &'static str,
        value: String,
        reason: &'static str,
    },

    /// One or more required options are absent and could not be prompted for.
    #[error("missing required option(s): {}", .names.iter().map(|n| format!("--{n}")).collect::<Vec<_>>().join(", "))]
    MissingArguments { names: Vec<&'static str> },
}

pub(crate) fn settings_io(path: impl Into<PathBuf>, source: std::io::Error) -> SettingsError {
    SettingsError::Io {
        path: path.into(),
        source,
    }
}
