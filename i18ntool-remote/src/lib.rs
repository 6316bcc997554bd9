//! i18ntool-remote: the translation service seen as a resource store.
//!
//! [`ResourceStore`] is the seam the sync orchestrators talk to.
//! [`TransifexClient`] implements it over HTTP; [`poll`] turns the
//! service's asynchronous upload/download jobs into blocking calls with a
//! bounded retry policy.

pub mod error;
pub mod poll;
pub mod store;
pub mod transifex;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::RemoteError;
pub use poll::{await_job, download_and_wait, upload_and_wait, RetryPolicy};
pub use store::ResourceStore;
pub use transifex::TransifexClient;
pub use types::{
    JobId, JobStatus, NewResource, ProjectRef, RemoteResource, ResourceRef, UploadSummary,
    XLIFF_FORMAT,
};
