//! Group merge: collapse one duplicate group into one canonical entry.
//!
//! Members are folded left to right in ingestion order:
//!
//! - scalar fields keep the best-scoring value ([`score`]), first seen on ties;
//! - `date` / `time` keep the first present value;
//! - unknown fields keep the first non-null value;
//! - `images` are unioned in first-seen order, then checked against the
//!   [`ResourceStore`]: missing, unreadable and same-fingerprint references
//!   are dropped and reported. An empty result removes the field.

use std::collections::{HashMap, HashSet};

use thoughts_core::{Entry, ResourceIdentity};

use crate::normalize::tidy_content;
use crate::report::{DropReason, DroppedReference};
use crate::resources::{Fingerprint, ResourceStore};

/// Knobs and collaborators for merging.
pub struct MergeContext<'a> {
    pub resources: &'a dyn ResourceStore,
    pub identity: ResourceIdentity,
    pub normalize_content: bool,
}

/// A canonical entry plus the references removed while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub entry: Entry,
    pub dropped: Vec<DroppedReference>,
}

/// Quality of a scalar value, compared lexicographically; higher wins.
///
/// Non-empty beats empty, then paragraph structure (`"\n\n"`), then length
/// in characters. A present value beats an absent one only when everything
/// else ties.
pub fn score(value: Option<&str>) -> (bool, bool, usize, bool) {
    match value {
        None => (false, false, 0, false),
        Some(v) => (
            !v.trim().is_empty(),
            v.contains("\n\n"),
            v.chars().count(),
            true,
        ),
    }
}

fn pick(current: &mut Option<String>, candidate: &Option<String>) {
    if score(candidate.as_deref()) > score(current.as_deref()) {
        current.clone_from(candidate);
    }
}

/// Merge a group, given in ingestion order. An empty group yields a default entry.
pub fn merge_group(members: &[&Entry], ctx: &MergeContext<'_>) -> Merged {
    let mut iter = members.iter();
    let mut merged = iter.next().map(|e| (*e).clone()).unwrap_or_default();
    let mut references: Vec<String> = merged.images.take().unwrap_or_default();

    for other in iter {
        if merged.date.is_none() {
            merged.date = other.date;
        }
        if merged.time.is_none() {
            merged.time = other.time;
        }
        pick(&mut merged.content, &other.content);
        pick(&mut merged.topic, &other.topic);
        pick(&mut merged.link, &other.link);
        pick(&mut merged.link_title, &other.link_title);
        pick(&mut merged.source_link, &other.source_link);

        if let Some(images) = &other.images {
            references.extend(images.iter().cloned());
        }

        for (key, value) in &other.extra {
            match merged.extra.get_mut(key) {
                Some(existing) if existing.is_null() && !value.is_null() => {
                    *existing = value.clone();
                }
                Some(_) => {}
                None => {
                    merged.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }

    if ctx.normalize_content {
        if let Some(content) = merged.content.as_mut() {
            *content = tidy_content(content);
        }
    }

    let label = merged.label();
    let (kept, dropped) = resolve_references(&label, references, ctx);
    merged.images = if kept.is_empty() { None } else { Some(kept) };

    Merged {
        entry: merged,
        dropped,
    }
}

/// Check every reference once, in order, keeping the first of each identity.
fn resolve_references(
    label: &str,
    references: Vec<String>,
    ctx: &MergeContext<'_>,
) -> (Vec<String>, Vec<DroppedReference>) {
    let mut kept = Vec::with_capacity(references.len());
    let mut dropped = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut by_fingerprint: HashMap<Fingerprint, String> = HashMap::new();

    let mut reject = |reference: String, reason: DropReason| {
        dropped.push(DroppedReference {
            entry: label.to_owned(),
            reference,
            reason,
        });
    };

    for reference in references {
        if !seen.insert(reference.clone()) {
            continue;
        }

        match ctx.resources.exists(&reference) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("{label}: dropping missing resource {reference}");
                reject(reference, DropReason::Missing);
                continue;
            }
            Err(err) => {
                tracing::error!("{label}: cannot check resource {reference}: {err}; dropping it");
                reject(
                    reference,
                    DropReason::Unreadable {
                        error: err.to_string(),
                    },
                );
                continue;
            }
        }

        match ctx.resources.fingerprint(&reference, ctx.identity) {
            Ok(Some(fp)) => {
                if let Some(first) = by_fingerprint.get(&fp) {
                    tracing::info!("{label}: {reference} duplicates {first}; dropping it");
                    let of = first.clone();
                    reject(reference, DropReason::Duplicate { of });
                    continue;
                }
                by_fingerprint.insert(fp, reference.clone());
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!("{label}: cannot fingerprint resource {reference}: {err}; dropping it");
                reject(
                    reference,
                    DropReason::Unreadable {
                        error: err.to_string(),
                    },
                );
                continue;
            }
        }

        kept.push(reference);
    }

    (kept, dropped)
}
