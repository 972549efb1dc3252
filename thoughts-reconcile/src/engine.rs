//! The reconciler proper: partition → merge → sort → self-check.
//!
//! Pure with respect to the collection: the only side effects go through the
//! [`ResourceStore`] handed in by the caller.

use thoughts_core::{Entry, ReconcileConfig};

use crate::canonical::sort_canonical;
use crate::matching::{partition, residual_duplicates};
use crate::merge::{merge_group, MergeContext};
use crate::report::DroppedReference;
use crate::resources::ResourceStore;

/// The canonical collection and what it took to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub entries: Vec<Entry>,
    pub merged_groups: usize,
    pub folded_entries: usize,
    pub dropped: Vec<DroppedReference>,
    pub residual_duplicates: Vec<(usize, usize)>,
}

/// Reconcile `entries`, given in ingestion order.
///
/// Partition and merge repeat until a pass merges nothing. A merged entry can
/// take its `date`/`time` from one member and its `content` from another, so
/// it may match an entry that none of its members matched. Every repeat pass
/// shrinks the collection, so the loop ends.
pub fn reconcile(
    entries: &[Entry],
    config: &ReconcileConfig,
    resources: &dyn ResourceStore,
) -> Reconciled {
    let ctx = MergeContext {
        resources,
        identity: config.identity,
        normalize_content: config.normalize_content,
    };

    let mut merged_groups = 0;
    let mut dropped = Vec::new();
    let mut current = merge_pass(entries, config, &ctx, &mut dropped, &mut merged_groups);
    let mut folded_entries = entries.len() - current.len();

    let mut folded = folded_entries;
    while folded > 0 {
        let next = merge_pass(&current, config, &ctx, &mut dropped, &mut merged_groups);
        folded = current.len() - next.len();
        if folded > 0 {
            tracing::debug!("another pass folded {folded} merged entries");
        }
        folded_entries += folded;
        current = next;
    }

    let mut canonical = current;
    sort_canonical(&mut canonical);

    let residual = residual_duplicates(&canonical, config.prefix_len);
    for (a, b) in &residual {
        tracing::warn!(
            "canonical entries {} and {} still match each other",
            canonical[*a].label(),
            canonical[*b].label()
        );
    }

    Reconciled {
        entries: canonical,
        merged_groups,
        folded_entries,
        dropped,
        residual_duplicates: residual,
    }
}

/// One partition → merge pass. Output keeps group order (first member first).
fn merge_pass(
    entries: &[Entry],
    config: &ReconcileConfig,
    ctx: &MergeContext<'_>,
    dropped: &mut Vec<DroppedReference>,
    merged_groups: &mut usize,
) -> Vec<Entry> {
    let groups = partition(entries, config.prefix_len);
    let mut out = Vec::with_capacity(groups.len());
    for group in &groups {
        let members: Vec<&Entry> = group.iter().map(|&i| &entries[i]).collect();
        if members.len() > 1 {
            *merged_groups += 1;
            tracing::debug!(
                "merging {} entries into {}",
                members.len(),
                members[0].label()
            );
        }
        let merged = merge_group(&members, ctx);
        dropped.extend(merged.dropped);
        out.push(merged.entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MemResources;

    fn entries(yaml: &str) -> Vec<Entry> {
        let records: Vec<serde_yaml::Value> = serde_yaml::from_str(yaml).unwrap();
        records
            .into_iter()
            .map(|r| Entry::from_value(r).unwrap())
            .collect()
    }

    #[test]
    fn exact_repeats_collapse_to_one() {
        let input = entries(
            "- {date: '2025-09-28', time: '02:40', content: A}\n\
             - {date: '2025-09-28', time: '02:40', content: A}\n\
             - {date: '2025-09-28', time: '02:40', content: A}\n",
        );
        let out = reconcile(&input, &ReconcileConfig::default(), &MemResources::new());
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.merged_groups, 1);
        assert_eq!(out.folded_entries, 2);
        assert!(out.residual_duplicates.is_empty());
    }

    #[test]
    fn second_pass_is_a_fixed_point() {
        let input = entries(
            "- {date: '2025-09-27', content: B, source_link: 'https://x/2'}\n\
             - {date: '2025-09-28', time: '02:40', content: '  A  '}\n\
             - {date: '2025-09-28', time: '02:40', content: A, source_link: 'https://x/1'}\n\
             - {date: '2025-09-29', content: B again, source_link: 'https://x/2'}\n",
        );
        let store = MemResources::new();
        let config = ReconcileConfig::default();
        let first = reconcile(&input, &config, &store);
        let second = reconcile(&first.entries, &config, &store);
        assert_eq!(first.entries, second.entries);
        assert_eq!(second.merged_groups, 0);
    }

    #[test]
    fn link_group_across_days_leaves_no_leftovers() {
        // The first member has no time, so the merged timestamp mixes the
        // date of one member with the time of another.
        let input = entries(
            "- {date: '2025-09-28', content: A, source_link: 'https://x/3'}\n\
             - {date: '2025-09-30', time: '09:15', content: A, source_link: 'https://x/3'}\n\
             - {date: '2025-09-30', time: '09:15', content: A}\n\
             - {date: '2025-09-28', time: '09:15', content: A}\n",
        );
        let store = MemResources::new();
        let config = ReconcileConfig::default();

        let first = reconcile(&input, &config, &store);
        assert!(first.residual_duplicates.is_empty(), "got {:?}", first.residual_duplicates);
        assert_eq!(first.entries.len(), 1);
        assert_eq!(first.entries[0].label(), "2025-09-28 09:15");

        let second = reconcile(&first.entries, &config, &store);
        assert_eq!(second.entries, first.entries);
        assert_eq!(second.merged_groups, 0);
        assert!(second.residual_duplicates.is_empty());
    }

    #[test]
    fn merged_timestamp_and_content_catch_a_later_copy() {
        // The link group takes 02:40 from its first member and the longer
        // content from its second; the unlinked copy only matches that blend.
        let input = entries(
            "- {date: '2025-09-28', time: '02:40', content: short, source_link: 'https://x/1'}\n\
             - {date: '2025-09-29', time: '08:00', content: much longer text, source_link: 'https://x/1'}\n\
             - {date: '2025-09-28', time: '02:40', content: much longer text}\n",
        );
        let store = MemResources::new();
        let config = ReconcileConfig::default();

        let first = reconcile(&input, &config, &store);
        assert!(first.residual_duplicates.is_empty(), "got {:?}", first.residual_duplicates);
        assert_eq!(first.entries.len(), 1);
        assert_eq!(first.folded_entries, 2);
        assert_eq!(first.entries[0].label(), "2025-09-28 02:40");
        assert_eq!(first.entries[0].content.as_deref(), Some("much longer text"));
        assert_eq!(first.entries[0].source_link.as_deref(), Some("https://x/1"));

        let second = reconcile(&first.entries, &config, &store);
        assert_eq!(second.entries, first.entries);
        assert_eq!(second.merged_groups, 0);
    }
}
