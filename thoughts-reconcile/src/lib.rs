//! # thoughts-reconcile
//!
//! Duplicate matching, group merge and canonical ordering for the thoughts
//! collection, plus the hash-gated writer that persists the result.
//!
//! Call [`pipeline::run`] to reconcile a site's collection end to end, or
//! [`reconcile`] to work on an in-memory list of entries.

pub mod canonical;
pub mod diff;
pub mod engine;
pub mod error;
pub mod matching;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod resources;
pub mod writer;

pub use engine::{reconcile, Reconciled};
pub use error::ReconcileError;
pub use matching::MatchRule;
pub use report::{DropReason, DroppedReference, ReconcileReport};
pub use resources::{FsResources, MemResources, ResourceStore};
pub use writer::WriteResult;
