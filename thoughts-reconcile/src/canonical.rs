//! Canonical ordering: newest first.

use std::cmp::Ordering;

use thoughts_core::{Entry, EntryTime};

/// Compare two entries for canonical order.
///
/// `(date, time)` descending. A missing time sorts as [`EntryTime::MIDNIGHT`];
/// a missing date sorts after every dated entry.
pub fn canonical_cmp(a: &Entry, b: &Entry) -> Ordering {
    let key = |e: &Entry| (e.date, e.time.unwrap_or(EntryTime::MIDNIGHT));
    key(b).cmp(&key(a))
}

/// Sort in place. Stable: ties keep their current relative order.
pub fn sort_canonical(entries: &mut [Entry]) {
    entries.sort_by(canonical_cmp);
}
