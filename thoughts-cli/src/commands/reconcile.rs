//! `thoughts reconcile`: merge duplicates, sort, and write the collection back.

use anyhow::{Context, Result};
use clap::Args;

use thoughts_reconcile::{pipeline, DropReason, ReconcileReport, WriteResult};

use super::SiteArgs;

/// Arguments for `thoughts reconcile`.
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Show what would be written without actually writing the file.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ReconcileArgs {
    pub fn run(self) -> Result<()> {
        let site = self.site.resolve()?;
        let report = pipeline::run(&site.root, &site.config, &site.resources, self.dry_run)
            .with_context(|| format!("reconcile failed for '{}'", site.root.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report JSON")?
            );
            return Ok(());
        }

        print_report(&report, self.dry_run);
        Ok(())
    }
}

fn print_report(report: &ReconcileReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let verb = match &report.write {
        WriteResult::Written { .. } => "reconciled",
        WriteResult::WouldWrite { .. } => "would be reconciled",
        WriteResult::Unchanged { .. } => "already canonical",
    };
    println!(
        "{prefix}✓ {} {verb} ({} in, {} out, {} merged)",
        report.path.display(),
        report.input_records,
        report.output_entries,
        report.folded_entries,
    );

    for skipped in &report.skipped {
        println!("  ✗  record #{}: {}", skipped.index, skipped.reason);
    }
    for dropped in &report.dropped_references {
        let why = match &dropped.reason {
            DropReason::Missing => "missing".to_string(),
            DropReason::Unreadable { error } => format!("unreadable: {error}"),
            DropReason::Duplicate { of } => format!("duplicate of {of}"),
        };
        println!("  -  {} {} ({why})", dropped.entry, dropped.reference);
    }
    if !report.residual_duplicates.is_empty() {
        println!(
            "  !  {} pairs of entries still match each other",
            report.residual_duplicates.len()
        );
    }
}
