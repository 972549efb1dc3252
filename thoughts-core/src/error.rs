//! Error types for thoughts-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing the collection file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure, with the path that was being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (render/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load. Includes file path and line context from serde_yaml.
    #[error("failed to parse collection at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file parsed, but its top level is not a list of entries.
    #[error("collection at {path} is not a YAML sequence")]
    NotASequence { path: PathBuf },

    /// The collection file did not exist at the expected path.
    #[error("collection not found at {path}")]
    NotFound { path: PathBuf },
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

/// Errors raised while resolving [`crate::config::ReconcileConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// An explicit `--config` path was given but does not exist.
    #[error("config file not found at {path}")]
    NotFound { path: PathBuf },
}

/// Why a single record could not be turned into an [`crate::Entry`].
///
/// These are never fatal: the record is skipped and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("record is not a mapping")]
    NotAMapping,

    #[error("unparseable date {value:?}")]
    InvalidDate { value: String },

    #[error("unparseable time {value:?}")]
    InvalidTime { value: String },

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
}
