//! [`ResourceStore`] backed by the Transifex REST API (v3, JSON:API).
//!
//! Request bodies and response parsing are plain functions so they can be
//! tested without a network; [`TransifexClient`] only moves bytes.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use i18ntool_core::LanguageCode;

use crate::error::RemoteError;
use crate::store::ResourceStore;
use crate::types::{
    JobId, JobStatus, NewResource, ProjectRef, RemoteResource, ResourceRef, UploadSummary,
};

/// Production API endpoint.
pub const DEFAULT_API_URL: &str = "https://rest.api.transifex.com";

/// Environment variable overriding [`DEFAULT_API_URL`].
pub const API_URL_ENV: &str = "I18NTOOL_API_URL";

const MEDIA_TYPE: &str = "application/vnd.api+json";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct TransifexClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl TransifexClient {
    /// Client for the endpoint named by `I18NTOOL_API_URL`, or the default.
    pub fn new(token: impl Into<String>) -> Self {
        let base_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        Self::with_base_url(token, base_url)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        // Finished downloads answer 303; the redirect target must be fetched
        // without the bearer token, so redirects are followed by hand.
        let agent = ureq::AgentBuilder::new()
            .redirects(0)
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("i18ntool/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, url: &str, what: &str) -> Result<ureq::Response, RemoteError> {
        tracing::debug!("GET {url}");
        self.agent
            .get(url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", MEDIA_TYPE)
            .call()
            .map_err(|err| map_error(err, what))
    }

    fn post(&self, path: &str, body: &Value, what: &str) -> Result<String, RemoteError> {
        let url = self.url(path);
        tracing::debug!("POST {url}");
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", MEDIA_TYPE)
            .set("Content-Type", MEDIA_TYPE)
            .send_string(&body.to_string())
            .map_err(|err| map_error(err, what))?;
        read_body(response)
    }
}

impl ResourceStore for TransifexClient {
    fn list_resources(&self, project: &ProjectRef) -> Result<Vec<RemoteResource>, RemoteError> {
        let mut url = self.url(&format!("/resources?filter[project]={}", project_id(project)));
        let mut resources = Vec::new();
        loop {
            let body = read_body(self.get(&url, &format!("project {project}"))?)?;
            let (page, next) = parse_resource_page(&body)?;
            resources.extend(page);
            match next {
                Some(next) => url = next,
                None => break,
            }
        }
        tracing::debug!(count = resources.len(), %project, "listed resources");
        Ok(resources)
    }

    fn create_resource(
        &self,
        project: &ProjectRef,
        resource: &NewResource,
    ) -> Result<RemoteResource, RemoteError> {
        let body = create_resource_body(project, resource);
        let response = self.post("/resources", &body, &format!("project {project}"))?;
        parse_resource(&response)
    }

    fn submit_upload(&self, resource: &ResourceRef, content: &str) -> Result<JobId, RemoteError> {
        let body = upload_body(resource, content);
        let response = self.post(
            "/resource_strings_async_uploads",
            &body,
            &format!("resource {resource}"),
        )?;
        parse_job_id(&response)
    }

    fn poll_upload(&self, job: &JobId) -> Result<JobStatus<UploadSummary>, RemoteError> {
        let url = self.url(&format!("/resource_strings_async_uploads/{job}"));
        let body = read_body(self.get(&url, &format!("upload job {job}"))?)?;
        parse_upload_status(&body)
    }

    fn submit_download(
        &self,
        resource: &ResourceRef,
        language: &LanguageCode,
    ) -> Result<JobId, RemoteError> {
        let body = download_body(resource, language);
        let response = self.post(
            "/resource_translations_async_downloads",
            &body,
            &format!("resource {resource}"),
        )?;
        parse_job_id(&response)
    }

    fn poll_download(&self, job: &JobId) -> Result<JobStatus<String>, RemoteError> {
        let url = self.url(&format!("/resource_translations_async_downloads/{job}"));
        let response = self.get(&url, &format!("download job {job}"))?;

        if (300..400).contains(&response.status()) {
            let location = response.header("Location").map(str::to_owned).ok_or_else(|| {
                RemoteError::Decode(format!("download job {job} redirected without a location"))
            })?;
            tracing::debug!(%job, "download ready");
            let file = self
                .agent
                .get(&location)
                .call()
                .map_err(|err| map_error(err, "translated file"))?;
            return read_body(file).map(JobStatus::Completed);
        }

        match parse_job_state(&read_body(response)?)? {
            JobState::Succeeded(_) => Err(RemoteError::Decode(format!(
                "download job {job} succeeded without a file location"
            ))),
            state => Ok(state.without_payload()),
        }
    }
}

fn read_body(response: ureq::Response) -> Result<String, RemoteError> {
    response
        .into_string()
        .map_err(|err| RemoteError::Transport(err.to_string()))
}

fn map_error(err: ureq::Error, what: &str) -> RemoteError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            classify_status(status, &body, what)
        }
        ureq::Error::Transport(transport) => RemoteError::Transport(transport.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Identifiers and request bodies
// ---------------------------------------------------------------------------

/// `o:<org>:p:<project>`
pub fn project_id(project: &ProjectRef) -> String {
    format!("o:{}:p:{}", project.organization, project.project)
}

/// `o:<org>:p:<project>:r:<slug>`
pub fn resource_id(resource: &ResourceRef) -> String {
    format!("{}:r:{}", project_id(&resource.project), resource.slug)
}

/// `l:<code>`
pub fn language_id(language: &LanguageCode) -> String {
    format!("l:{language}")
}

pub fn create_resource_body(project: &ProjectRef, resource: &NewResource) -> Value {
    json!({
        "data": {
            "type": "resources",
            "attributes": {
                "name": resource.name,
                "slug": resource.slug,
            },
            "relationships": {
                "project": { "data": { "type": "projects", "id": project_id(project) } },
                "i18n_format": { "data": { "type": "i18n_formats", "id": resource.i18n_format } },
            },
        }
    })
}

pub fn upload_body(resource: &ResourceRef, content: &str) -> Value {
    json!({
        "data": {
            "type": "resource_strings_async_uploads",
            "attributes": {
                "content": content,
                "content_encoding": "text",
            },
            "relationships": {
                "resource": { "data": { "type": "resources", "id": resource_id(resource) } },
            },
        }
    })
}

pub fn download_body(resource: &ResourceRef, language: &LanguageCode) -> Value {
    json!({
        "data": {
            "type": "resource_translations_async_downloads",
            "attributes": {
                "content_encoding": "text",
                "file_type": "default",
                "mode": "default",
            },
            "relationships": {
                "language": { "data": { "type": "languages", "id": language_id(language) } },
                "resource": { "data": { "type": "resources", "id": resource_id(resource) } },
            },
        }
    })
}

// ---------------------------------------------------------------------------
// Response documents
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Document<T> {
    data: T,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceData {
    attributes: ResourceAttributes,
    #[serde(default)]
    relationships: Option<ResourceRelationships>,
}

#[derive(Debug, Deserialize)]
struct ResourceAttributes {
    slug: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ResourceRelationships {
    i18n_format: Option<Relationship>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    data: Option<RelatedId>,
}

#[derive(Debug, Deserialize)]
struct RelatedId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct JobData {
    id: String,
    attributes: JobAttributes,
}

#[derive(Debug, Deserialize)]
struct JobAttributes {
    status: String,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
    #[serde(default)]
    details: Option<UploadDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct UploadDetails {
    #[serde(default)]
    strings_created: u64,
    #[serde(default)]
    strings_updated: u64,
    #[serde(default)]
    strings_deleted: u64,
    #[serde(default)]
    strings_skipped: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ApiErrorItem {
    fn describe(&self) -> String {
        let text = self
            .detail
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("no detail");
        match &self.code {
            Some(code) => format!("{code}: {text}"),
            None => text.to_owned(),
        }
    }
}

fn describe_all(errors: &[ApiErrorItem]) -> String {
    errors
        .iter()
        .map(ApiErrorItem::describe)
        .collect::<Vec<_>>()
        .join("; ")
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, RemoteError> {
    serde_json::from_str(body).map_err(|err| RemoteError::Decode(err.to_string()))
}

impl From<ResourceData> for RemoteResource {
    fn from(data: ResourceData) -> Self {
        let i18n_format = data
            .relationships
            .and_then(|r| r.i18n_format)
            .and_then(|r| r.data)
            .map(|d| d.id)
            .unwrap_or_default();
        Self {
            slug: data.attributes.slug,
            name: data.attributes.name,
            i18n_format,
        }
    }
}

/// One page of a resource listing and the URL of the next page, if any.
pub fn parse_resource_page(
    body: &str,
) -> Result<(Vec<RemoteResource>, Option<String>), RemoteError> {
    let doc: Document<Vec<ResourceData>> = decode(body)?;
    let resources = doc.data.into_iter().map(RemoteResource::from).collect();
    Ok((resources, doc.links.next))
}

pub fn parse_resource(body: &str) -> Result<RemoteResource, RemoteError> {
    let doc: Document<ResourceData> = decode(body)?;
    Ok(doc.data.into())
}

pub fn parse_job_id(body: &str) -> Result<JobId, RemoteError> {
    let doc: Document<JobData> = decode(body)?;
    Ok(JobId(doc.data.id))
}

/// Job state as reported in a job document.
#[derive(Debug, PartialEq, Eq)]
enum JobState {
    Pending,
    Processing,
    Succeeded(UploadSummary),
    Failed(String),
}

impl JobState {
    fn without_payload<T>(self) -> JobStatus<T> {
        match self {
            JobState::Pending => JobStatus::Pending,
            JobState::Processing | JobState::Succeeded(_) => JobStatus::Processing,
            JobState::Failed(detail) => JobStatus::Failed(detail),
        }
    }
}

fn parse_job_state(body: &str) -> Result<JobState, RemoteError> {
    let doc: Document<JobData> = decode(body)?;
    let attrs = doc.data.attributes;
    match attrs.status.as_str() {
        "pending" => Ok(JobState::Pending),
        "processing" => Ok(JobState::Processing),
        "succeeded" => {
            let details = attrs.details.unwrap_or_default();
            Ok(JobState::Succeeded(UploadSummary {
                added: details.strings_created,
                updated: details.strings_updated,
                deleted: details.strings_deleted,
                skipped: details.strings_skipped,
            }))
        }
        "failed" => {
            let detail = if attrs.errors.is_empty() {
                "no detail".to_owned()
            } else {
                describe_all(&attrs.errors)
            };
            Ok(JobState::Failed(detail))
        }
        other => Err(RemoteError::Decode(format!("unknown job status '{other}'"))),
    }
}

pub fn parse_upload_status(body: &str) -> Result<JobStatus<UploadSummary>, RemoteError> {
    Ok(match parse_job_state(body)? {
        JobState::Succeeded(summary) => JobStatus::Completed(summary),
        state => state.without_payload(),
    })
}

/// Map an HTTP error status to a [`RemoteError`]; `what` names the missing
/// thing for 404s.
pub fn classify_status(status: u16, body: &str, what: &str) -> RemoteError {
    match status {
        401 | 403 => RemoteError::Authentication,
        404 => RemoteError::NotFound {
            what: what.to_owned(),
        },
        _ => {
            let detail = match serde_json::from_str::<ErrorDocument>(body) {
                Ok(doc) if !doc.errors.is_empty() => describe_all(&doc.errors),
                _ if body.trim().is_empty() => format!("HTTP {status}"),
                _ => format!("HTTP {status}: {}", body.trim()),
            };
            RemoteError::Unclassified {
                status: Some(status),
                detail,
            }
        }
    }
}
