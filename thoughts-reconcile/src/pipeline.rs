//! Shared reconcile pipeline entrypoint used by every CLI command.
//!
//! load → decode → reconcile → render → hash-gated write → report.

use std::path::Path;

use chrono::{DateTime, Utc};

use thoughts_core::store::{self, RawCollection, SkippedEntry};
use thoughts_core::ReconcileConfig;

use crate::engine::{reconcile, Reconciled};
use crate::report::ReconcileReport;
use crate::resources::ResourceStore;
use crate::writer::write_collection;
use crate::ReconcileError;

/// Everything computed before anything is written.
#[derive(Debug, Clone)]
pub struct Plan {
    pub raw: RawCollection,
    /// Records found in the file, malformed ones included.
    pub input_records: usize,
    pub skipped: Vec<SkippedEntry>,
    pub reconciled: Reconciled,
    /// Canonical body, header excluded.
    pub body: String,
}

/// Load the site's collection and reconcile it in memory.
pub fn plan(
    site: &Path,
    config: &ReconcileConfig,
    resources: &dyn ResourceStore,
) -> Result<Plan, ReconcileError> {
    config.validate()?;
    let path = config.data_path(site);
    let mut raw = store::load(&path)?;
    let input_records = raw.records.len();
    tracing::debug!("loaded {input_records} records from {}", path.display());

    let decoded = store::decode(std::mem::take(&mut raw.records));
    for skipped in &decoded.skipped {
        tracing::warn!(
            "{}: skipping record #{}: {}",
            path.display(),
            skipped.index,
            skipped.reason
        );
    }

    let reconciled = reconcile(&decoded.entries, config, resources);
    let body = store::render_body(&reconciled.entries)?;

    Ok(Plan {
        raw,
        input_records,
        skipped: decoded.skipped,
        reconciled,
        body,
    })
}

/// Reconcile the site's collection and persist it, stamping the header with now.
pub fn run(
    site: &Path,
    config: &ReconcileConfig,
    resources: &dyn ResourceStore,
    dry_run: bool,
) -> Result<ReconcileReport, ReconcileError> {
    run_at(site, config, resources, dry_run, Utc::now())
}

/// [`run`] with an explicit header timestamp.
pub fn run_at(
    site: &Path,
    config: &ReconcileConfig,
    resources: &dyn ResourceStore,
    dry_run: bool,
    at: DateTime<Utc>,
) -> Result<ReconcileReport, ReconcileError> {
    let plan = plan(site, config, resources)?;
    let write = write_collection(
        &plan.raw.path,
        plan.raw.body(),
        &plan.body,
        &config.header_title,
        at,
        dry_run,
    )?;

    let Plan {
        raw,
        input_records,
        skipped,
        reconciled,
        ..
    } = plan;

    Ok(ReconcileReport {
        path: raw.path,
        input_records,
        skipped,
        merged_groups: reconciled.merged_groups,
        folded_entries: reconciled.folded_entries,
        dropped_references: reconciled.dropped,
        residual_duplicates: reconciled.residual_duplicates,
        output_entries: reconciled.entries.len(),
        write,
    })
}
