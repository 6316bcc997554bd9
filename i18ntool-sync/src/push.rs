//! `i18ntool push`: upload the source file to the service.
//!
//! Split in two so the caller can confirm between deciding and doing:
//! [`plan`] lists the remote resources and picks create or update,
//! [`execute`] carries it out.

use i18ntool_core::Options;
use i18ntool_remote::{
    upload_and_wait, NewResource, RemoteResource, ResourceRef, ResourceStore, RetryPolicy,
    UploadSummary, XLIFF_FORMAT,
};

use crate::error::SyncError;
use crate::pull::resource_ref;
use crate::writer::read_source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushAction {
    /// No remote resource has the slug yet.
    Create,
    /// Replace the content of an existing resource.
    Update,
}

#[derive(Debug, Clone)]
pub struct PushPlan {
    pub resource: ResourceRef,
    /// Display name used when the resource is created.
    pub name: String,
    pub action: PushAction,
    /// Resources currently in the project.
    pub available: Vec<RemoteResource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub action: PushAction,
    pub summary: UploadSummary,
}

/// Decide between create and update by slug membership alone.
pub fn plan(store: &dyn ResourceStore, options: &Options) -> Result<PushPlan, SyncError> {
    let resource = resource_ref(options)?;
    let name = options
        .resource
        .as_ref()
        .map(|r| r.name.clone())
        .unwrap_or_else(|| resource.slug.clone());

    let available = store.list_resources(&resource.project)?;
    let action = if available.iter().any(|r| r.slug == resource.slug) {
        PushAction::Update
    } else {
        PushAction::Create
    };
    tracing::debug!(?action, %resource, "planned push");

    Ok(PushPlan {
        resource,
        name,
        action,
        available,
    })
}

/// Carry out `plan` with `content` as the resource's file.
///
/// A create is a create request followed by the initial upload job.
pub fn execute(
    store: &dyn ResourceStore,
    plan: &PushPlan,
    content: &str,
    policy: &RetryPolicy,
) -> Result<PushOutcome, SyncError> {
    if plan.action == PushAction::Create {
        let created = store.create_resource(
            &plan.resource.project,
            &NewResource {
                name: plan.name.clone(),
                slug: plan.resource.slug.clone(),
                i18n_format: XLIFF_FORMAT.to_owned(),
            },
        )?;
        tracing::info!(slug = %created.slug, "created resource");
    }

    let summary = upload_and_wait(store, &plan.resource, content, policy)?;
    Ok(PushOutcome {
        action: plan.action,
        summary,
    })
}

/// Read the source file named by `options`.
pub fn read_content(options: &Options) -> Result<String, SyncError> {
    read_source(&options.source_path())
}
