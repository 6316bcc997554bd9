//! The remote resource store seam.

use i18ntool_core::LanguageCode;

use crate::error::RemoteError;
use crate::types::{
    JobId, JobStatus, NewResource, ProjectRef, RemoteResource, ResourceRef, UploadSummary,
};

/// A translation service seen as a store of resources.
///
/// Uploads and downloads are asynchronous jobs: `submit_*` returns a job id
/// and `poll_*` reports its state. [`crate::poll`] drives the polling.
pub trait ResourceStore {
    fn list_resources(&self, project: &ProjectRef) -> Result<Vec<RemoteResource>, RemoteError>;

    /// Create an empty resource. One request, no job.
    fn create_resource(
        &self,
        project: &ProjectRef,
        resource: &NewResource,
    ) -> Result<RemoteResource, RemoteError>;

    fn submit_upload(&self, resource: &ResourceRef, content: &str) -> Result<JobId, RemoteError>;

    fn poll_upload(&self, job: &JobId) -> Result<JobStatus<UploadSummary>, RemoteError>;

    fn submit_download(
        &self,
        resource: &ResourceRef,
        language: &LanguageCode,
    ) -> Result<JobId, RemoteError>;

    /// Completed downloads carry the translated file content.
    fn poll_download(&self, job: &JobId) -> Result<JobStatus<String>, RemoteError>;
}
