//! Dry-run unified diff support for `thoughts diff`.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use thoughts_core::ReconcileConfig;

use crate::pipeline::plan;
use crate::resources::ResourceStore;
use crate::ReconcileError;

/// Difference between the collection body on disk and its canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDiff {
    pub path: PathBuf,
    /// `None` when the file already is canonical.
    pub unified_diff: Option<String>,
}

/// Reconcile in memory and compare against the current body.
///
/// The provenance header is left out on both sides. No files are written.
pub fn diff_collection(
    site: &Path,
    config: &ReconcileConfig,
    resources: &dyn ResourceStore,
) -> Result<CollectionDiff, ReconcileError> {
    let plan = plan(site, config, resources)?;
    let existing = normalize_line_endings(plan.raw.body());
    let canonical = normalize_line_endings(&plan.body);

    let unified_diff = (existing != canonical).then(|| {
        let name = plan
            .raw
            .path
            .strip_prefix(site)
            .unwrap_or(plan.raw.path.as_path());
        let old_header = format!("a/{}", name.display());
        let new_header = format!("b/{}", name.display());
        TextDiff::from_lines(&existing, &canonical)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string()
    });

    Ok(CollectionDiff {
        path: plan.raw.path,
        unified_diff,
    })
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::pipeline::run;
    use crate::resources::MemResources;

    fn site_with(body: &str) -> TempDir {
        let site = TempDir::new().expect("site");
        let data = site.path().join("_data");
        fs::create_dir_all(&data).expect("mkdir");
        fs::write(data.join("thoughts.yml"), body).expect("write");
        site
    }

    #[test]
    fn no_diff_after_reconcile() {
        let site = site_with(
            "- {date: '2025-09-27', content: B}\n- {date: '2025-09-28', content: A}\n",
        );
        let config = ReconcileConfig::default();
        let store = MemResources::new();
        run(site.path(), &config, &store, false).expect("run");

        let diff = diff_collection(site.path(), &config, &store).expect("diff");
        assert!(diff.unified_diff.is_none(), "reconciled file should have no diff");
    }

    #[test]
    fn out_of_order_file_produces_unified_diff() {
        let site = site_with(
            "- {date: '2025-09-27', content: B}\n- {date: '2025-09-28', content: A}\n",
        );
        let diff = diff_collection(site.path(), &ReconcileConfig::default(), &MemResources::new())
            .expect("diff");
        let unified = diff.unified_diff.expect("expected a diff");
        assert!(unified.contains("--- a/_data/thoughts.yml"));
        assert!(unified.contains("+++ b/_data/thoughts.yml"));
        assert!(unified.contains("@@"));
    }

    #[test]
    fn header_changes_do_not_create_diff_noise() {
        let site = site_with("- {date: '2025-09-28', content: A}\n");
        let config = ReconcileConfig::default();
        let store = MemResources::new();
        run(site.path(), &config, &store, false).expect("run");

        let path = config.data_path(site.path());
        let text = fs::read_to_string(&path).expect("read");
        fs::write(&path, format!("# hand-edited note\n{text}")).expect("write");

        let diff = diff_collection(site.path(), &config, &store).expect("diff");
        assert!(diff.unified_diff.is_none());
    }
}
