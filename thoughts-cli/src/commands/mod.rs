//! Subcommands and the options they share.

pub mod check;
pub mod diff;
pub mod reconcile;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use thoughts_core::ReconcileConfig;
use thoughts_reconcile::FsResources;

use crate::IdentityArg;

/// Site location and config overrides, accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Site root; the collection and image references resolve against it.
    #[arg(long, default_value = ".")]
    pub site: PathBuf,

    /// Config file to use instead of the lookup order.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Collection path relative to the site root.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Characters of normalized content compared when entries have no link.
    #[arg(long)]
    pub prefix_len: Option<usize>,

    /// How duplicate images are detected: size or sha256.
    #[arg(long)]
    pub identity: Option<IdentityArg>,

    /// Tidy whitespace in merged content.
    #[arg(long)]
    pub normalize_content: bool,
}

/// Everything a command needs to run the pipeline.
pub struct Site {
    pub root: PathBuf,
    pub config: ReconcileConfig,
    pub resources: FsResources,
}

impl SiteArgs {
    /// Load the config file (if any) and apply command-line overrides.
    pub fn resolve(&self) -> Result<Site> {
        let (mut config, source) = ReconcileConfig::resolve(&self.site, self.config.as_deref())
            .context("failed to load configuration")?;
        match &source {
            Some(path) => tracing::info!("config: {}", path.display()),
            None => tracing::info!("config: built-in defaults"),
        }

        if let Some(data) = &self.data {
            config.data_file = data.clone();
        }
        if let Some(prefix_len) = self.prefix_len {
            config.prefix_len = prefix_len;
        }
        if let Some(identity) = self.identity {
            config.identity = identity.into();
        }
        if self.normalize_content {
            config.normalize_content = true;
        }
        config
            .validate()
            .context("invalid command-line override")?;

        Ok(Site {
            resources: FsResources::new(&self.site),
            root: self.site.clone(),
            config,
        })
    }
}
