//! i18ntool core library: translation units, reconciliation, XLIFF, settings.
//!
//! - [`types`]: units, collections, validated newtypes
//! - [`merge`]: the reconciliation engine
//! - [`xliff`]: lossless XLIFF 1.2 parse / serialize
//! - [`settings`]: persisted key/value settings (`~/.i18ntool`)
//! - [`options`]: alias table, config overlay, resolved options
//! - [`error`]: [`FormatError`], [`SettingsError`], [`ConfigError`]

pub mod error;
pub mod merge;
pub mod options;
pub mod settings;
pub mod types;
pub mod xliff;

pub use error::{ConfigError, FormatError, SettingsError};
pub use merge::{merge, propagate_new_units};
pub use options::{OptionKey, Options, RawOptions};
pub use settings::{FileSettings, MemorySettings, SettingsStore};
pub use types::{LanguageCode, MergeResult, ResourceSpec, TranslationUnit, UnitCollection};
pub use xliff::XliffDocument;
