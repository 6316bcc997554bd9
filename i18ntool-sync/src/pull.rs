//! `i18ntool pull`: download every configured language from the service.

use i18ntool_core::{options::OptionKey, ConfigError, LanguageCode, Options};
use i18ntool_remote::{download_and_wait, ProjectRef, ResourceRef, ResourceStore, RetryPolicy};

use crate::error::SyncError;
use crate::writer::{atomic_write, WriteResult};

#[derive(Debug)]
pub enum PullOutcome {
    Pulled { write: WriteResult },
    Failed { error: SyncError },
}

#[derive(Debug)]
pub struct LanguagePull {
    pub language: LanguageCode,
    pub outcome: PullOutcome,
}

#[derive(Debug)]
pub struct PullReport {
    pub resource: ResourceRef,
    pub languages: Vec<LanguagePull>,
}

impl PullReport {
    pub fn pulled(&self) -> usize {
        self.languages
            .iter()
            .filter(|l| matches!(l.outcome, PullOutcome::Pulled { .. }))
            .count()
    }

    pub fn is_partial(&self) -> bool {
        self.pulled() < self.languages.len()
    }
}

const REMOTE_OPTIONS: &[OptionKey] = &[
    OptionKey::Organization,
    OptionKey::Project,
    OptionKey::Resource,
];

pub(crate) fn resource_ref(options: &Options) -> Result<ResourceRef, SyncError> {
    match (&options.organization, &options.project, &options.resource) {
        (Some(organization), Some(project), Some(resource)) => {
            Ok(ProjectRef::new(organization, project).resource(&resource.slug))
        }
        _ => Err(ConfigError::MissingArguments {
            names: options.missing(REMOTE_OPTIONS),
        }
        .into()),
    }
}

/// Download each language in turn and write `messages.<lang>.xlf`.
///
/// Per-language failures are recorded and the batch continues; an
/// authentication failure ends the run with an error.
pub fn run(
    store: &dyn ResourceStore,
    options: &Options,
    policy: &RetryPolicy,
) -> Result<PullReport, SyncError> {
    let mut required = vec![OptionKey::Languages];
    required.extend_from_slice(REMOTE_OPTIONS);
    options.require(&required)?;
    let resource = resource_ref(options)?;

    let mut languages = Vec::new();
    for language in &options.languages {
        let outcome = match pull_language(store, &resource, language, options, policy) {
            Ok(write) => PullOutcome::Pulled { write },
            Err(error) if error.aborts_batch() => return Err(error),
            Err(error) => {
                tracing::warn!(%language, "pull failed: {error}");
                PullOutcome::Failed { error }
            }
        };
        languages.push(LanguagePull {
            language: language.clone(),
            outcome,
        });
    }

    Ok(PullReport {
        resource,
        languages,
    })
}

fn pull_language(
    store: &dyn ResourceStore,
    resource: &ResourceRef,
    language: &LanguageCode,
    options: &Options,
    policy: &RetryPolicy,
) -> Result<WriteResult, SyncError> {
    let content = download_and_wait(store, resource, language, policy)?;
    atomic_write(&options.target_path(language), &content, options.dry_run)
}
