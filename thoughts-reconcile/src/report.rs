//! Run report: everything a reconcile changed, dropped, or skipped.

use std::path::PathBuf;

use serde::Serialize;

use thoughts_core::store::SkippedEntry;

use crate::writer::WriteResult;

/// Why a resource reference was left out of a canonical entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    /// The resource store says it does not exist.
    Missing,
    /// The existence or identity check itself failed.
    Unreadable { error: String },
    /// Same fingerprint as a reference kept earlier in the list.
    Duplicate { of: String },
}

/// One reference removed from one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedReference {
    /// `date time` of the canonical entry.
    pub entry: String,
    pub reference: String,
    #[serde(flatten)]
    pub reason: DropReason,
}

/// Summary of one reconcile run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub path: PathBuf,
    /// Records found in the file, malformed ones included.
    pub input_records: usize,
    pub skipped: Vec<SkippedEntry>,
    /// Groups that had more than one member.
    pub merged_groups: usize,
    /// Entries absorbed into another entry.
    pub folded_entries: usize,
    pub dropped_references: Vec<DroppedReference>,
    /// Pairs of output positions that still match; empty on a healthy run.
    pub residual_duplicates: Vec<(usize, usize)>,
    pub output_entries: usize,
    pub write: WriteResult,
}

impl ReconcileReport {
    /// `true` when the file on disk already was the canonical collection.
    pub fn is_canonical(&self) -> bool {
        matches!(self.write, WriteResult::Unchanged { .. })
    }

    pub fn count_dropped(&self, pred: impl Fn(&DropReason) -> bool) -> usize {
        self.dropped_references
            .iter()
            .filter(|d| pred(&d.reason))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_reference_serializes_flat() {
        let dropped = DroppedReference {
            entry: "2025-09-28 02:40".into(),
            reference: "/a.jpg".into(),
            reason: DropReason::Duplicate { of: "/b.jpg".into() },
        };
        let json = serde_json::to_value(&dropped).unwrap();
        assert_eq!(json["reason"], "duplicate");
        assert_eq!(json["of"], "/b.jpg");
        assert_eq!(json["reference"], "/a.jpg");
    }
}
