//! Identifiers and payloads exchanged with the remote resource store.

use std::fmt;

use serde::Serialize;

/// An organization + project pair on the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectRef {
    pub organization: String,
    pub project: String,
}

impl ProjectRef {
    pub fn new(organization: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            project: project.into(),
        }
    }

    /// Resource reference for `slug` inside this project.
    pub fn resource(&self, slug: impl Into<String>) -> ResourceRef {
        ResourceRef {
            project: self.clone(),
            slug: slug.into(),
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.project)
    }
}

/// Organization + project + resource slug triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub project: ProjectRef,
    pub slug: String,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.slug)
    }
}

/// A resource as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteResource {
    pub slug: String,
    pub name: String,
    /// i18n format tag, e.g. `XLIFF`.
    pub i18n_format: String,
}

/// Payload for creating a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResource {
    pub name: String,
    pub slug: String,
    pub i18n_format: String,
}

/// i18n format tag used for every resource this tool creates.
pub const XLIFF_FORMAT: &str = "XLIFF";

/// Opaque id of an asynchronous upload or download job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// State of an asynchronous job: `pending → processing → completed | failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus<T> {
    Pending,
    Processing,
    Completed(T),
    Failed(String),
}

/// String counts reported once an upload completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub added: u64,
    pub updated: u64,
    pub deleted: u64,
    pub skipped: u64,
}
