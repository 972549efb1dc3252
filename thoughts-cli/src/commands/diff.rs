//! `thoughts diff`: unified diff of what reconcile would write.

use anyhow::{Context, Result};
use clap::Args;

use thoughts_reconcile::diff::diff_collection;

use super::SiteArgs;

/// Arguments for `thoughts diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub site: SiteArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let site = self.site.resolve()?;
        let result = diff_collection(&site.root, &site.config, &site.resources)
            .with_context(|| format!("diff failed for '{}'", site.root.display()))?;

        let Some(unified) = result.unified_diff else {
            println!("No differences for '{}'.", result.path.display());
            return Ok(());
        };

        print!("{unified}");
        if !unified.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
