//! `i18ntool merge`: reconcile every language file against the source.
//!
//! The source is read and parsed once. Each language is then handled on its
//! own: a missing or broken target file is recorded in the report and the
//! batch moves on.

use std::path::{Path, PathBuf};

use i18ntool_core::{
    merge as engine, options::OptionKey, xliff, LanguageCode, MergeResult, Options,
    UnitCollection,
};

use crate::diff::unified_diff;
use crate::error::{format_err, SyncError};
use crate::writer::{atomic_write, read_if_exists, read_source, WriteResult};

/// What happened to one language file.
#[derive(Debug)]
pub enum MergeOutcome {
    Merged {
        result: MergeResult,
        /// Units appended by `--addMissingUnits`.
        appended: usize,
        write: WriteResult,
        /// Unified diff of the change, only in dry-run mode.
        diff: Option<String>,
    },
    /// No `messages.<lang>.xlf` in the target directory.
    MissingTarget { path: PathBuf },
    Failed { error: SyncError },
}

#[derive(Debug)]
pub struct LanguageMerge {
    pub language: LanguageCode,
    pub outcome: MergeOutcome,
}

#[derive(Debug, Default)]
pub struct MergeReport {
    pub languages: Vec<LanguageMerge>,
}

impl MergeReport {
    /// Number of language files that were merged.
    pub fn processed(&self) -> usize {
        self.languages
            .iter()
            .filter(|l| matches!(l.outcome, MergeOutcome::Merged { .. }))
            .count()
    }

    /// `true` if any language was skipped or failed.
    pub fn is_partial(&self) -> bool {
        self.processed() < self.languages.len()
    }
}

/// Merge the source into every configured language file.
///
/// Fails up front when languages are missing, or when the source file is
/// missing or malformed.
pub fn run(options: &Options) -> Result<MergeReport, SyncError> {
    options.require(&[OptionKey::Languages])?;

    let source_path = options.source_path();
    let raw = read_source(&source_path)?;
    let source = xliff::parse(&raw)
        .map_err(|e| format_err(&source_path, e))?
        .into_units();
    tracing::debug!(
        units = source.len(),
        "loaded source {}",
        source_path.display()
    );

    let mut report = MergeReport::default();
    for language in &options.languages {
        let target_path = options.target_path(language);
        let outcome = match merge_language(&source, &target_path, options) {
            Ok(Some(outcome)) => outcome,
            Ok(None) => {
                tracing::warn!(%language, "no target file at {}", target_path.display());
                MergeOutcome::MissingTarget { path: target_path }
            }
            Err(error) => {
                tracing::warn!(%language, "merge failed: {error}");
                MergeOutcome::Failed { error }
            }
        };
        report.languages.push(LanguageMerge {
            language: language.clone(),
            outcome,
        });
    }
    Ok(report)
}

/// `Ok(None)` when the target file does not exist.
fn merge_language(
    source: &UnitCollection,
    path: &Path,
    options: &Options,
) -> Result<Option<MergeOutcome>, SyncError> {
    let Some(raw) = read_if_exists(path)? else {
        return Ok(None);
    };
    let mut doc = xliff::parse(&raw).map_err(|e| format_err(path, e))?;

    let result = engine::merge(source, doc.units_mut(), options.remove_unused_ids);
    let appended = if options.add_missing_units {
        engine::propagate_new_units(source, doc.units_mut())
    } else {
        0
    };

    let updated = xliff::serialize(&doc).map_err(|e| format_err(path, e))?;
    let write = atomic_write(path, &updated, options.dry_run)?;
    let diff = match &write {
        WriteResult::WouldWrite { .. } => {
            Some(unified_diff(path, &options.base_dir, &raw, &updated))
        }
        _ => None,
    };

    Ok(Some(MergeOutcome::Merged {
        result,
        appended,
        write,
        diff,
    }))
}
