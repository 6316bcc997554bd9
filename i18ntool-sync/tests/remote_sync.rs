//! Pull and push against the scripted in-memory store.

use std::fs;

use tempfile::TempDir;

use i18ntool_core::{Options, RawOptions};
use i18ntool_remote::testing::{Call, ScriptedStore};
use i18ntool_remote::{JobStatus, RemoteError, RetryPolicy, UploadSummary};
use i18ntool_sync::{pull, push, PullOutcome, PushAction, SyncError, WriteResult};

fn options(dir: &TempDir, languages: Option<&str>) -> Options {
    RawOptions {
        languages: languages.map(str::to_string),
        organization: Some("acme".into()),
        project: Some("web".into()),
        resource: Some("Master:master".into()),
        ..RawOptions::default()
    }
    .resolve(dir.path())
    .expect("resolve")
}

fn policy() -> RetryPolicy {
    RetryPolicy::immediate(5)
}

#[test]
fn pull_records_failures_and_continues() {
    let dir = TempDir::new().unwrap();
    let store = ScriptedStore::new()
        .script_download(
            "de",
            vec![
                Ok(JobStatus::Pending),
                Ok(JobStatus::Processing),
                Ok(JobStatus::Completed("<xliff de/>".into())),
            ],
        )
        .script_download("fr", vec![Ok(JobStatus::Failed("no such language".into()))]);

    let report = pull::run(&store, &options(&dir, Some("de,fr")), &policy()).expect("pull");

    assert_eq!(report.pulled(), 1);
    assert!(report.is_partial());
    assert!(matches!(
        report.languages[0].outcome,
        PullOutcome::Pulled {
            write: WriteResult::Written { .. }
        }
    ));
    assert!(matches!(
        report.languages[1].outcome,
        PullOutcome::Failed {
            error: SyncError::Remote(RemoteError::JobFailed { .. })
        }
    ));
    assert_eq!(
        fs::read_to_string(dir.path().join("messages.de.xlf")).unwrap(),
        "<xliff de/>"
    );
    assert!(!dir.path().join("messages.fr.xlf").exists());

    let de_polls = store
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::PollDownload(job) if job.0 == "download-de"))
        .count();
    assert_eq!(de_polls, 3);
    let written: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name())
        .collect();
    assert_eq!(written, vec![std::ffi::OsString::from("messages.de.xlf")]);
}

#[test]
fn pull_times_out_stuck_jobs() {
    let dir = TempDir::new().unwrap();
    let store = ScriptedStore::new().script_download(
        "de",
        (0..10).map(|_| Ok(JobStatus::Processing)).collect(),
    );

    let report = pull::run(&store, &options(&dir, Some("de")), &policy()).expect("pull");

    assert!(matches!(
        report.languages[0].outcome,
        PullOutcome::Failed {
            error: SyncError::Remote(RemoteError::Timeout { attempts: 5, .. })
        }
    ));
}

#[test]
fn pull_aborts_on_authentication_failure() {
    let dir = TempDir::new().unwrap();
    let store = ScriptedStore::new()
        .script_download("de", vec![Err(RemoteError::Authentication)])
        .script_download("fr", vec![Ok(JobStatus::Completed("fr".into()))]);

    let err = pull::run(&store, &options(&dir, Some("de,fr")), &policy()).unwrap_err();

    assert!(matches!(err, SyncError::Remote(RemoteError::Authentication)));
    assert!(!store
        .calls()
        .iter()
        .any(|c| matches!(c, Call::SubmitDownload(_, lang) if lang.0 == "fr")));
}

#[test]
fn pull_requires_every_remote_option() {
    let dir = TempDir::new().unwrap();
    let opts = RawOptions::default().resolve(dir.path()).unwrap();
    let err = pull::run(&ScriptedStore::new(), &opts, &policy()).unwrap_err();
    let message = err.to_string();
    for name in ["languages", "organization", "project", "resource"] {
        assert!(message.contains(name), "{message} should name {name}");
    }
}

#[test]
fn push_plans_create_for_unknown_slug() {
    let dir = TempDir::new().unwrap();
    let store = ScriptedStore::with_resources(&["admin"]);

    let plan = push::plan(&store, &options(&dir, None)).expect("plan");

    assert_eq!(plan.action, PushAction::Create);
    assert_eq!(plan.name, "Master");
    assert_eq!(plan.available.len(), 1);
}

#[test]
fn push_create_sends_create_then_upload() {
    let dir = TempDir::new().unwrap();
    let store = ScriptedStore::with_resources(&[]).script_upload(vec![
        JobStatus::Pending,
        JobStatus::Completed(UploadSummary {
            added: 2,
            ..UploadSummary::default()
        }),
    ]);

    let plan = push::plan(&store, &options(&dir, None)).expect("plan");
    let outcome = push::execute(&store, &plan, "<xliff/>", &policy()).expect("push");

    assert_eq!(outcome.action, PushAction::Create);
    assert_eq!(outcome.summary.added, 2);
    let calls = store.calls();
    assert!(matches!(calls[0], Call::List(_)));
    assert!(matches!(&calls[1], Call::Create(_, slug) if slug == "master"));
    assert!(matches!(&calls[2], Call::SubmitUpload(r, content) if r.slug == "master" && content == "<xliff/>"));
}

#[test]
fn push_update_for_existing_slug_skips_create() {
    let dir = TempDir::new().unwrap();
    let store = ScriptedStore::with_resources(&["master"]);

    let plan = push::plan(&store, &options(&dir, None)).expect("plan");
    assert_eq!(plan.action, PushAction::Update);
    push::execute(&store, &plan, "<xliff/>", &policy()).expect("push");

    assert!(!store.calls().iter().any(|c| matches!(c, Call::Create(..))));
}

#[test]
fn push_failed_upload_job_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = ScriptedStore::with_resources(&["master"])
        .script_upload(vec![JobStatus::Failed("invalid XLIFF".into())]);

    let plan = push::plan(&store, &options(&dir, None)).expect("plan");
    let err = push::execute(&store, &plan, "<xliff/>", &policy()).unwrap_err();

    assert!(matches!(
        err,
        SyncError::Remote(RemoteError::JobFailed { ref detail, .. }) if detail == "invalid XLIFF"
    ));
}

#[test]
fn push_listing_failure_aborts_before_upload() {
    let dir = TempDir::new().unwrap();
    let store = ScriptedStore::new().fail_listing(RemoteError::NotFound {
        what: "project acme/web".into(),
    });

    let err = push::plan(&store, &options(&dir, None)).unwrap_err();

    assert!(matches!(err, SyncError::Remote(RemoteError::NotFound { .. })));
    assert_eq!(store.calls().len(), 1);
}

#[test]
fn push_reads_source_or_reports_missing() {
    let dir = TempDir::new().unwrap();
    let opts = options(&dir, None);
    assert!(matches!(
        push::read_content(&opts),
        Err(SyncError::SourceNotFound { .. })
    ));
    fs::write(dir.path().join("messages.xlf"), "<xliff/>").unwrap();
    assert_eq!(push::read_content(&opts).unwrap(), "<xliff/>");
}
