//! Error types for thoughts-reconcile.

use thiserror::Error;

use thoughts_core::{ConfigError, StoreError};

/// All errors that end a reconcile run.
///
/// Per-entry and per-reference problems are not errors; they are reported in
/// [`crate::ReconcileReport`] and the run continues.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Reading, parsing or persisting the collection failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
