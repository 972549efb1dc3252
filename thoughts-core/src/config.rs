//! Reconciler configuration.
//!
//! # Lookup order
//!
//! ```text
//! --config <path>                 (explicit; must exist)
//! <site>/.thoughts.yaml
//! <home>/.thoughts/config.yaml
//! built-in defaults
//! ```
//!
//! As in the rest of this crate, every loader has an `_at(home, …)` form used
//! by tests with a `TempDir`, and a convenience form that derives `home` from
//! `dirs::home_dir()`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Allowed range for [`ReconcileConfig::prefix_len`].
pub const PREFIX_LEN_RANGE: std::ops::RangeInclusive<usize> = 50..=100;

/// File name looked up in the site root.
pub const SITE_CONFIG_FILE: &str = ".thoughts.yaml";

/// How two resource references are judged to point at the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceIdentity {
    /// Equal byte size. Cheap, tolerates collisions.
    #[default]
    Size,
    /// Equal SHA-256 digest of the content.
    Sha256,
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceIdentity::Size => write!(f, "size"),
            ResourceIdentity::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Tunables for a reconcile run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Collection path, relative to the site root.
    pub data_file: PathBuf,
    /// Characters of normalized content compared by the fallback matcher.
    pub prefix_len: usize,
    pub identity: ResourceIdentity,
    /// Tidy whitespace in merged `content`.
    pub normalize_content: bool,
    /// First line of the provenance header.
    pub header_title: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("_data").join("thoughts.yml"),
            prefix_len: 100,
            identity: ResourceIdentity::Size,
            normalize_content: false,
            header_title: "Thoughts data file".to_string(),
        }
    }
}

impl ReconcileConfig {
    /// Reject values outside their documented ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !PREFIX_LEN_RANGE.contains(&self.prefix_len) {
            return Err(ConfigError::Invalid {
                field: "prefix_len",
                reason: format!(
                    "{} is outside {}..={}",
                    self.prefix_len,
                    PREFIX_LEN_RANGE.start(),
                    PREFIX_LEN_RANGE.end()
                ),
            });
        }
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "data_file",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a single config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: ReconcileConfig = if contents.trim().is_empty() {
            ReconcileConfig::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config for `site` following the lookup order above.
    ///
    /// Returns the config and the file it came from (`None` for defaults).
    pub fn resolve_at(
        home: Option<&Path>,
        site: &Path,
        explicit: Option<&Path>,
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        let mut candidates = vec![site.join(SITE_CONFIG_FILE)];
        if let Some(home) = home {
            candidates.push(home_config_path_at(home));
        }
        for candidate in candidates {
            if candidate.exists() {
                return Ok((Self::from_file(&candidate)?, Some(candidate)));
            }
        }
        Ok((Self::default(), None))
    }

    /// `resolve_at` convenience wrapper; a missing home directory just skips
    /// that lookup step.
    pub fn resolve(
        site: &Path,
        explicit: Option<&Path>,
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        Self::resolve_at(dirs::home_dir().as_deref(), site, explicit)
    }

    /// Absolute collection path for `site`.
    pub fn data_path(&self, site: &Path) -> PathBuf {
        site.join(&self.data_file)
    }
}

/// `<home>/.thoughts/config.yaml`. Pure, no I/O.
pub fn home_config_path_at(home: &Path) -> PathBuf {
    home.join(".thoughts").join("config.yaml")
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
