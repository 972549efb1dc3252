//! `thoughts check`: dry-run reconcile with a summary; fails when not canonical.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use thoughts_reconcile::{pipeline, DropReason, ReconcileReport};

use super::SiteArgs;

/// Arguments for `thoughts check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let site = self.site.resolve()?;
        let report = pipeline::run(&site.root, &site.config, &site.resources, true)
            .with_context(|| format!("check failed for '{}'", site.root.display()))?;

        if self.json {
            print_json(&report)?;
        } else {
            print_table(&report);
        }

        verdict(&report)
    }
}

/// `Err` when the file would be rewritten or the reconciler left duplicates.
fn verdict(report: &ReconcileReport) -> Result<()> {
    if !report.residual_duplicates.is_empty() {
        bail!(
            "{}: {} pairs of canonical entries still match each other",
            report.path.display(),
            report.residual_duplicates.len()
        );
    }
    if !report.is_canonical() {
        bail!(
            "{} is not canonical; run `thoughts reconcile`",
            report.path.display()
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckJson<'a> {
    canonical: bool,
    #[serde(flatten)]
    report: &'a ReconcileReport,
}

#[derive(Tabled)]
struct CheckTableRow {
    #[tabled(rename = "check")]
    check: &'static str,
    #[tabled(rename = "count")]
    count: usize,
}

fn print_json(report: &ReconcileReport) -> Result<()> {
    let payload = CheckJson {
        canonical: report.is_canonical(),
        report,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize check JSON")?
    );
    Ok(())
}

fn print_table(report: &ReconcileReport) {
    let status = if !report.residual_duplicates.is_empty() {
        "LEFTOVER DUPLICATES".red().bold()
    } else if report.is_canonical() {
        "CANONICAL".green().bold()
    } else {
        "NEEDS RECONCILE".yellow().bold()
    };
    println!("{} | {status}", report.path.display());

    let rows = vec![
        CheckTableRow {
            check: "records read",
            count: report.input_records,
        },
        CheckTableRow {
            check: "records skipped",
            count: report.skipped.len(),
        },
        CheckTableRow {
            check: "duplicate groups",
            count: report.merged_groups,
        },
        CheckTableRow {
            check: "entries folded",
            count: report.folded_entries,
        },
        CheckTableRow {
            check: "images missing",
            count: report.count_dropped(|r| *r == DropReason::Missing),
        },
        CheckTableRow {
            check: "images unreadable",
            count: report.count_dropped(|r| matches!(r, DropReason::Unreadable { .. })),
        },
        CheckTableRow {
            check: "images duplicated",
            count: report.count_dropped(|r| matches!(r, DropReason::Duplicate { .. })),
        },
        CheckTableRow {
            check: "leftover duplicates",
            count: report.residual_duplicates.len(),
        },
        CheckTableRow {
            check: "canonical entries",
            count: report.output_entries,
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for skipped in &report.skipped {
        println!("{} record #{}: {}", "✗".red().bold(), skipped.index, skipped.reason);
    }
    for dropped in &report.dropped_references {
        println!(
            "{} {} {}",
            "■".bright_black().bold(),
            dropped.entry,
            dropped.reference
        );
    }
}
