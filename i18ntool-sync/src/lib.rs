//! # i18ntool-sync
//!
//! Orchestrators behind the `merge`, `pull` and `push` commands, plus the
//! atomic writer they share.
//!
//! Every run returns a report; the caller decides how to print it and which
//! exit code it maps to.

pub mod diff;
pub mod error;
pub mod merge;
pub mod pull;
pub mod push;
pub mod writer;

pub use error::SyncError;
pub use merge::{LanguageMerge, MergeOutcome, MergeReport};
pub use pull::{LanguagePull, PullOutcome, PullReport};
pub use push::{PushAction, PushOutcome, PushPlan};
pub use writer::{atomic_write, WriteResult};
