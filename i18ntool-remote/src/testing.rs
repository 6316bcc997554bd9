//! Scripted in-memory [`ResourceStore`] for tests.
//!
//! Every call is recorded; job polls replay the status sequences queued with
//! [`ScriptedStore::script_upload`] / [`ScriptedStore::script_download`].

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use i18ntool_core::LanguageCode;

use crate::error::RemoteError;
use crate::store::ResourceStore;
use crate::types::{
    JobId, JobStatus, NewResource, ProjectRef, RemoteResource, ResourceRef, UploadSummary,
};

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(ProjectRef),
    Create(ProjectRef, String),
    SubmitUpload(ResourceRef, String),
    PollUpload(JobId),
    SubmitDownload(ResourceRef, LanguageCode),
    PollDownload(JobId),
}

#[derive(Debug, Default)]
struct State {
    resources: Vec<RemoteResource>,
    list_error: Option<RemoteError>,
    uploads: VecDeque<JobStatus<UploadSummary>>,
    downloads: HashMap<String, VecDeque<Result<JobStatus<String>, RemoteError>>>,
    calls: Vec<Call>,
    next_job: usize,
}

#[derive(Debug, Default)]
pub struct ScriptedStore {
    state: RefCell<State>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds resources with these slugs.
    pub fn with_resources(slugs: &[&str]) -> Self {
        let store = Self::new();
        store.state.borrow_mut().resources = slugs
            .iter()
            .map(|slug| RemoteResource {
                slug: (*slug).to_owned(),
                name: (*slug).to_owned(),
                i18n_format: crate::types::XLIFF_FORMAT.to_owned(),
            })
            .collect();
        store
    }

    /// Make `list_resources` fail with `err`.
    pub fn fail_listing(self, err: RemoteError) -> Self {
        self.state.borrow_mut().list_error = Some(err);
        self
    }

    /// Status sequence returned by consecutive upload polls.
    pub fn script_upload(self, statuses: Vec<JobStatus<UploadSummary>>) -> Self {
        self.state.borrow_mut().uploads = statuses.into();
        self
    }

    /// Poll results for downloads of `language`.
    pub fn script_download(
        self,
        language: &str,
        statuses: Vec<Result<JobStatus<String>, RemoteError>>,
    ) -> Self {
        self.state
            .borrow_mut()
            .downloads
            .insert(language.to_owned(), statuses.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn next_job(&self, prefix: &str) -> JobId {
        let mut state = self.state.borrow_mut();
        state.next_job += 1;
        JobId(format!("{prefix}-{}", state.next_job))
    }
}

impl ResourceStore for ScriptedStore {
    fn list_resources(&self, project: &ProjectRef) -> Result<Vec<RemoteResource>, RemoteError> {
        self.record(Call::List(project.clone()));
        let mut state = self.state.borrow_mut();
        match state.list_error.take() {
            Some(err) => Err(err),
            None => Ok(state.resources.clone()),
        }
    }

    fn create_resource(
        &self,
        project: &ProjectRef,
        resource: &NewResource,
    ) -> Result<RemoteResource, RemoteError> {
        self.record(Call::Create(project.clone(), resource.slug.clone()));
        let created = RemoteResource {
            slug: resource.slug.clone(),
            name: resource.name.clone(),
            i18n_format: resource.i18n_format.clone(),
        };
        self.state.borrow_mut().resources.push(created.clone());
        Ok(created)
    }

    fn submit_upload(&self, resource: &ResourceRef, content: &str) -> Result<JobId, RemoteError> {
        self.record(Call::SubmitUpload(resource.clone(), content.to_owned()));
        Ok(self.next_job("upload"))
    }

    fn poll_upload(&self, job: &JobId) -> Result<JobStatus<UploadSummary>, RemoteError> {
        self.record(Call::PollUpload(job.clone()));
        Ok(self
            .state
            .borrow_mut()
            .uploads
            .pop_front()
            .unwrap_or(JobStatus::Completed(UploadSummary::default())))
    }

    fn submit_download(
        &self,
        resource: &ResourceRef,
        language: &LanguageCode,
    ) -> Result<JobId, RemoteError> {
        self.record(Call::SubmitDownload(resource.clone(), language.clone()));
        Ok(JobId(format!("download-{language}")))
    }

    fn poll_download(&self, job: &JobId) -> Result<JobStatus<String>, RemoteError> {
        self.record(Call::PollDownload(job.clone()));
        let language = job.0.trim_start_matches("download-").to_owned();
        let mut state = self.state.borrow_mut();
        state
            .downloads
            .get_mut(&language)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(RemoteError::NotFound {
                    what: format!("no scripted download for '{language}'"),
                })
            })
    }
}
