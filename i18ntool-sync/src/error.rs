//! Error types for i18ntool-sync.

use std::path::{Path, PathBuf};

use thiserror::Error;

use i18ntool_core::{ConfigError, FormatError};
use i18ntool_remote::RemoteError;

/// All errors that can arise from merge, pull and push runs.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The canonical source file does not exist.
    #[error("source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// A file could not be parsed as XLIFF.
    #[error("could not parse {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl SyncError {
    /// `true` for errors that end a batch run instead of a single language.
    pub fn aborts_batch(&self) -> bool {
        match self {
            SyncError::Remote(err) => err.aborts_batch(),
            _ => false,
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn format_err(path: &Path, source: FormatError) -> SyncError {
    SyncError::Format {
        path: path.to_path_buf(),
        source,
    }
}
