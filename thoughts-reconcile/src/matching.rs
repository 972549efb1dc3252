//! Duplicate matching.
//!
//! Two entries are duplicates when the first applicable [`MatchRule`] says so:
//!
//! 1. [`MatchRule::Identifier`]: both carry a non-empty external identifier
//!    (`source_link`, else `link`). Equal identifiers always match; different
//!    identifiers never do, whatever else the entries share.
//! 2. [`MatchRule::Fingerprint`]: otherwise, equal `(date, time)` plus equal
//!    normalized content prefix. Entries without a date have no fingerprint.
//!
//! The pairwise rule is not transitive, so [`partition`] assigns entries to
//! groups greedily in ingestion order and never lets one group hold two
//! different identifiers.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use thoughts_core::{Entry, EntryTime};

use crate::normalize::content_prefix;

/// Which rule matched a pair of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Identifier,
    Fingerprint,
}

/// Fallback matching key: `(date, time, normalized content prefix)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FingerprintKey {
    pub date: NaiveDate,
    pub time: Option<EntryTime>,
    pub prefix: String,
}

impl FingerprintKey {
    pub fn of(entry: &Entry, prefix_len: usize) -> Option<Self> {
        Some(Self {
            date: entry.date?,
            time: entry.time,
            prefix: content_prefix(entry.content.as_deref().unwrap_or(""), prefix_len),
        })
    }
}

/// Evaluate the rules in priority order for one pair.
pub fn matched_by(a: &Entry, b: &Entry, prefix_len: usize) -> Option<MatchRule> {
    if let (Some(x), Some(y)) = (a.identifier(), b.identifier()) {
        return (x == y).then_some(MatchRule::Identifier);
    }
    let (Some(x), Some(y)) = (
        FingerprintKey::of(a, prefix_len),
        FingerprintKey::of(b, prefix_len),
    ) else {
        return None;
    };
    (x == y).then_some(MatchRule::Fingerprint)
}

pub fn is_duplicate(a: &Entry, b: &Entry, prefix_len: usize) -> bool {
    matched_by(a, b, prefix_len).is_some()
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// Groups under construction; merged groups forward to their root.
#[derive(Debug, Default)]
struct Groups {
    parent: Vec<usize>,
    members: Vec<Vec<usize>>,
    keyed: Vec<bool>,
}

impl Groups {
    fn create(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        self.members.push(Vec::new());
        self.keyed.push(false);
        id
    }

    fn find(&self, mut g: usize) -> usize {
        while self.parent[g] != g {
            g = self.parent[g];
        }
        g
    }

    fn union(&mut self, a: usize, b: usize) -> usize {
        let (a, b) = (self.find(a), self.find(b));
        if a == b {
            return a;
        }
        let (root, child) = if a < b { (a, b) } else { (b, a) };
        self.parent[child] = root;
        let moved = std::mem::take(&mut self.members[child]);
        self.members[root].extend(moved);
        self.keyed[root] |= self.keyed[child];
        root
    }

    fn into_partition(self) -> Vec<Vec<usize>> {
        let mut out: Vec<Vec<usize>> = self
            .members
            .into_iter()
            .enumerate()
            .filter(|(g, members)| self.parent[*g] == *g && !members.is_empty())
            .map(|(_, mut members)| {
                members.sort_unstable();
                members
            })
            .collect();
        out.sort_by_key(|members| members[0]);
        out
    }
}

/// Partition `entries` into duplicate groups.
///
/// Each group lists entry indexes in ingestion order; groups are ordered by
/// their first member. Every entry lands in exactly one group.
pub fn partition(entries: &[Entry], prefix_len: usize) -> Vec<Vec<usize>> {
    let mut groups = Groups::default();
    let mut by_identifier: HashMap<&str, usize> = HashMap::new();
    let mut by_fingerprint: HashMap<FingerprintKey, Vec<usize>> = HashMap::new();

    for (index, entry) in entries.iter().enumerate() {
        let identifier = entry.identifier();
        let fingerprint = FingerprintKey::of(entry, prefix_len);

        let mut joined = identifier
            .and_then(|id| by_identifier.get(id).copied())
            .map(|g| groups.find(g));
        if joined.is_some() {
            tracing::debug!("{}: matched by identifier", entry.label());
        }

        if let Some(bucket) = fingerprint.as_ref().and_then(|fp| by_fingerprint.get(fp)) {
            if identifier.is_none() {
                // No identifier: any group with this fingerprint will do; take the oldest.
                if joined.is_none() {
                    joined = bucket.first().map(|g| groups.find(*g));
                    tracing::debug!("{}: matched by fingerprint", entry.label());
                }
            } else {
                // Identified entries absorb every identifier-less group they match.
                for g in bucket {
                    let g = groups.find(*g);
                    if groups.keyed[g] {
                        continue;
                    }
                    tracing::debug!("{}: absorbed fingerprint group", entry.label());
                    joined = Some(match joined {
                        Some(j) => groups.union(j, g),
                        None => g,
                    });
                }
            }
        }

        let g = match joined {
            Some(g) => g,
            None => groups.create(),
        };
        groups.members[g].push(index);
        if let Some(id) = identifier {
            groups.keyed[g] = true;
            by_identifier.entry(id).or_insert(g);
        }
        if let Some(fp) = fingerprint {
            let bucket = by_fingerprint.entry(fp).or_default();
            if !bucket.contains(&g) {
                bucket.push(g);
            }
        }
    }

    groups.into_partition()
}

/// Pairs of entries in `entries` that still match each other.
///
/// Used as a self-check on canonical output, where the answer should be empty.
pub fn residual_duplicates(entries: &[Entry], prefix_len: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();

    let mut by_identifier: HashMap<&str, usize> = HashMap::new();
    let mut by_fingerprint: HashMap<FingerprintKey, Vec<usize>> = HashMap::new();
    for (index, entry) in entries.iter().enumerate() {
        if let Some(id) = entry.identifier() {
            if let Some(first) = by_identifier.insert(id, index) {
                pairs.push((first, index));
            }
        }
        if let Some(fp) = FingerprintKey::of(entry, prefix_len) {
            by_fingerprint.entry(fp).or_default().push(index);
        }
    }

    for bucket in by_fingerprint.values() {
        for (i, &a) in bucket.iter().enumerate() {
            for &b in &bucket[i + 1..] {
                if matched_by(&entries[a], &entries[b], prefix_len) == Some(MatchRule::Fingerprint) {
                    pairs.push((a, b));
                }
            }
        }
    }

    pairs.sort_unstable();
    pairs.dedup();
    pairs
}
