//! Bounded polling for asynchronous upload and download jobs.

use std::thread::sleep;
use std::time::Duration;

use i18ntool_core::LanguageCode;

use crate::error::RemoteError;
use crate::store::ResourceStore;
use crate::types::{JobId, JobStatus, ResourceRef, UploadSummary};

/// How long to keep polling a job before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between consecutive polls.
    pub interval: Duration,
    /// Total number of polls, including the first one.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            max_attempts: 120,
        }
    }
}

impl RetryPolicy {
    /// Poll back-to-back with no pause.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            interval: Duration::ZERO,
            max_attempts,
        }
    }
}

/// Poll `job` until it completes, fails, or the policy runs out.
///
/// Errors returned by `poll` itself end the loop immediately.
pub fn await_job<T>(
    policy: &RetryPolicy,
    job: &JobId,
    mut poll: impl FnMut(&JobId) -> Result<JobStatus<T>, RemoteError>,
) -> Result<T, RemoteError> {
    for attempt in 1..=policy.max_attempts {
        match poll(job)? {
            JobStatus::Completed(value) => {
                tracing::debug!(%job, attempt, "job completed");
                return Ok(value);
            }
            JobStatus::Failed(detail) => {
                return Err(RemoteError::JobFailed {
                    job: job.to_string(),
                    detail,
                });
            }
            JobStatus::Pending | JobStatus::Processing => {
                tracing::debug!(%job, attempt, "job still running");
                if attempt < policy.max_attempts && !policy.interval.is_zero() {
                    sleep(policy.interval);
                }
            }
        }
    }

    Err(RemoteError::Timeout {
        job: job.to_string(),
        attempts: policy.max_attempts,
    })
}

/// Submit `content` for `resource` and wait for the upload job to finish.
pub fn upload_and_wait(
    store: &dyn ResourceStore,
    resource: &ResourceRef,
    content: &str,
    policy: &RetryPolicy,
) -> Result<UploadSummary, RemoteError> {
    let job = store.submit_upload(resource, content)?;
    tracing::info!(%job, %resource, "submitted upload");
    await_job(policy, &job, |job| store.poll_upload(job))
}

/// Request the `language` translation of `resource` and wait for its content.
pub fn download_and_wait(
    store: &dyn ResourceStore,
    resource: &ResourceRef,
    language: &LanguageCode,
    policy: &RetryPolicy,
) -> Result<String, RemoteError> {
    let job = store.submit_download(resource, language)?;
    tracing::info!(%job, %resource, %language, "submitted download");
    await_job(policy, &job, |job| store.poll_download(job))
}
