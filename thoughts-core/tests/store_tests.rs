//! Collection store: load errors, decode edge cases, render/load fidelity,
//! atomic-write safety.

use assert_fs::prelude::*;
use chrono::{TimeZone, Utc};
use predicates::prelude::predicate;
use rstest::rstest;
use std::fs;
use thoughts_core::{store, EntryError, StoreError};

fn data_file(dir: &assert_fs::TempDir) -> assert_fs::fixture::ChildPath {
    dir.child("_data").child("thoughts.yml")
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_collection_returns_not_found() {
    let site = assert_fs::TempDir::new().expect("tempdir");
    let err = store::load(data_file(&site).path()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("thoughts.yml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let site = assert_fs::TempDir::new().expect("tempdir");
    let file = data_file(&site);
    file.write_str("- date: '2025-01-01'\n  content: [unclosed\n").unwrap();

    let err = store::load(file.path()).unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("thoughts.yml"), "must contain file path, got: {err}");
}

#[test]
fn load_mapping_document_is_not_a_sequence() {
    let site = assert_fs::TempDir::new().expect("tempdir");
    let file = data_file(&site);
    file.write_str("date: '2025-01-01'\ncontent: hi\n").unwrap();

    let err = store::load(file.path()).unwrap_err();
    assert!(matches!(err, StoreError::NotASequence { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Decode
// ---------------------------------------------------------------------------

#[rstest]
#[case("- date: 2025-13-40\n", "unparseable date")]
#[case("- date: '2025-01-01'\n  time: '25:99'\n", "unparseable time")]
#[case("- date: '2025-01-01'\n  images: {a: 1}\n", "field `images`")]
#[case("- date: '2025-01-01'\n  topic: [x]\n", "field `topic`")]
#[case("- just a string\n", "not a mapping")]
fn malformed_records_are_skipped_with_reason(#[case] yaml: &str, #[case] reason: &str) {
    let site = assert_fs::TempDir::new().expect("tempdir");
    let file = data_file(&site);
    file.write_str(yaml).unwrap();

    let raw = store::load(file.path()).expect("load");
    let decoded = store::decode(raw.records);
    assert!(decoded.entries.is_empty());
    assert_eq!(decoded.skipped.len(), 1);
    assert!(
        decoded.skipped[0].reason.contains(reason),
        "reason {:?} should mention {reason:?}",
        decoded.skipped[0].reason
    );
}

#[test]
fn header_comments_are_ignored_on_load() {
    let site = assert_fs::TempDir::new().expect("tempdir");
    let file = data_file(&site);
    file.write_str(
        "# ====\n# Thoughts\n# ====\n\n- date: '2025-09-28'\n  time: '02:40'\n  content: A\n",
    )
    .unwrap();

    let raw = store::load(file.path()).expect("load");
    assert!(raw.body().starts_with("- date:"));
    let decoded = store::decode(raw.records);
    assert_eq!(decoded.entries.len(), 1);
    assert!(decoded.skipped.is_empty());
}

#[test]
fn scalar_types_are_coerced_to_text() {
    let records: Vec<serde_yaml::Value> =
        serde_yaml::from_str("- date: '2025-01-01'\n  content: 42\n  topic: true\n").unwrap();
    let decoded = store::decode(records);
    let entry = &decoded.entries[0];
    assert_eq!(entry.content.as_deref(), Some("42"));
    assert_eq!(entry.topic.as_deref(), Some("true"));
}

#[test]
fn skipped_error_variant_is_preserved() {
    let records: Vec<serde_yaml::Value> = serde_yaml::from_str("- time: 9000\n").unwrap();
    let decoded = store::decode(records);
    assert!(matches!(decoded.skipped[0].error, EntryError::InvalidTime { .. }));
}

// ---------------------------------------------------------------------------
// 3. Render → load fidelity
// ---------------------------------------------------------------------------

#[test]
fn rendered_collection_loads_back_identically() {
    let site = assert_fs::TempDir::new().expect("tempdir");
    let file = data_file(&site);
    file.write_str(concat!(
        "- date: '2025-09-28'\n",
        "  time: '02:40'\n",
        "  content: \"line one\\n\\nline two\"\n",
        "  images:\n",
        "  - /assets/thoughts/a.jpg\n",
        "  source_link: https://example.com/p/1\n",
        "  likes: 3\n",
        "- date: '2025-09-27'\n",
        "  content: plain\n",
    ))
    .unwrap();

    let first = store::decode(store::load(file.path()).unwrap().records).entries;
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let text = store::render("Thoughts data file", at, &first).unwrap();
    store::write_atomic(file.path(), &text).unwrap();

    file.assert(predicate::str::contains("# Reconciled at: 2026-01-01 00:00:00 UTC"));
    file.assert(predicate::str::contains("time: '02:40'"));

    let second = store::decode(store::load(file.path()).unwrap().records).entries;
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// 4. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn save_cleans_up_tmp_file() {
    let site = assert_fs::TempDir::new().expect("tempdir");
    let file = data_file(&site);
    store::write_atomic(file.path(), "[]\n").expect("save");
    assert!(!store::tmp_path(file.path()).exists(), ".tmp must be removed after save");
}

#[test]
fn mid_write_crash_leaves_original_intact() {
    let site = assert_fs::TempDir::new().expect("tempdir");
    let file = data_file(&site);
    store::write_atomic(file.path(), "- date: '2025-01-01'\n").expect("save");
    let original_bytes = fs::read(file.path()).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = store::tmp_path(file.path());
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    let current_bytes = fs::read(file.path()).expect("read after crash");
    assert_eq!(original_bytes, current_bytes, "original must be unchanged after crash");

    // The orphan does not confuse the next load.
    let raw = store::load(file.path()).expect("load");
    assert_eq!(raw.records.len(), 1);
}
