//! thoughts core library: entry types, collection store, configuration, errors.
//!
//! Public API surface:
//! - [`types`]: [`Entry`], [`EntryTime`]
//! - [`store`]: load / decode / render / atomic save of the YAML collection
//! - [`config`]: [`ReconcileConfig`] and its lookup order
//! - [`error`]: [`StoreError`], [`ConfigError`], [`EntryError`]

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::{ReconcileConfig, ResourceIdentity};
pub use error::{ConfigError, EntryError, StoreError};
pub use types::{Entry, EntryTime};
