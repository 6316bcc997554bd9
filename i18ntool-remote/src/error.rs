//! Error types for i18ntool-remote.

use thiserror::Error;

/// Everything that can go wrong talking to the translation service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The token was rejected (HTTP 401/403).
    #[error("authentication failed, the token is invalid")]
    Authentication,

    /// Organization, project, resource or job does not exist (HTTP 404).
    #[error("not found: {what}")]
    NotFound { what: String },

    /// An asynchronous job reached the `failed` state.
    #[error("job {job} failed: {detail}")]
    JobFailed { job: String, detail: String },

    /// An asynchronous job was still running when the retry policy ran out.
    #[error("job {job} did not finish after {attempts} polls")]
    Timeout { job: String, attempts: u32 },

    /// Any other HTTP failure, with whatever detail the service returned.
    #[error("unexpected remote error: {detail}")]
    Unclassified { status: Option<u16>, detail: String },

    /// The request never got an HTTP response (DNS, TLS, connection reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response from service: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Errors that abort a whole batch instead of a single item.
    pub fn aborts_batch(&self) -> bool {
        matches!(self, RemoteError::Authentication)
    }
}
