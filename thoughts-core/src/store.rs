//! YAML collection file.
//!
//! # File layout
//!
//! ```text
//! # ============================================
//! # <header title>
//! # ============================================
//! #
//! # Reconciled at: 2026-10-18 09:12:44 UTC
//! #
//! # ============================================
//!
//! - date: '2025-09-28'
//!   time: '02:40'
//!   content: ...
//! ```
//!
//! Everything up to the first line that is neither blank nor a `#` comment is
//! the provenance header; the rest is the body. Only the body carries meaning.
//!
//! Saves are atomic: serialize → `<name>.tmp` sibling → `rename`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_yaml::Value;

use crate::error::{io_err, EntryError, StoreError};
use crate::types::Entry;

const RULE: &str = "# ============================================";

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// A collection file as read from disk, before per-record decoding.
#[derive(Debug, Clone)]
pub struct RawCollection {
    pub path: PathBuf,
    /// Full file text, header included.
    pub text: String,
    pub records: Vec<Value>,
}

impl RawCollection {
    /// The body of the file as it is on disk right now.
    pub fn body(&self) -> &str {
        split_header(&self.text).1
    }
}

/// Read and parse the collection at `path`.
///
/// Returns `StoreError::NotFound` if absent, `StoreError::Parse` (with path
/// and line context) if the YAML is malformed, and `StoreError::NotASequence`
/// if the top level is anything but a list. An empty file is an empty list.
pub fn load(path: &Path) -> Result<RawCollection, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if split_header(&text).1.trim().is_empty() {
        return Ok(RawCollection {
            path: path.to_path_buf(),
            text,
            records: Vec::new(),
        });
    }
    let parsed: Value = serde_yaml::from_str(&text).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let records = match parsed {
        Value::Null => Vec::new(),
        Value::Sequence(records) => records,
        _ => {
            return Err(StoreError::NotASequence {
                path: path.to_path_buf(),
            })
        }
    };
    Ok(RawCollection {
        path: path.to_path_buf(),
        text,
        records,
    })
}

// ---------------------------------------------------------------------------
// 2. Decode
// ---------------------------------------------------------------------------

/// A record that could not be decoded and was left out of the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Zero-based position in the file.
    pub index: usize,
    pub reason: String,
    #[serde(skip)]
    pub error: EntryError,
}

/// Decoded entries in file order, plus the records that were skipped.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub entries: Vec<Entry>,
    pub skipped: Vec<SkippedEntry>,
}

/// Decode every record; malformed records are collected, never fatal.
pub fn decode(records: Vec<Value>) -> Decoded {
    let mut decoded = Decoded::default();
    for (index, record) in records.into_iter().enumerate() {
        match Entry::from_value(record) {
            Ok(entry) => decoded.entries.push(entry),
            Err(error) => decoded.skipped.push(SkippedEntry {
                index,
                reason: error.to_string(),
                error,
            }),
        }
    }
    decoded
}

// ---------------------------------------------------------------------------
// 3. Render
// ---------------------------------------------------------------------------

/// Split file text into `(header, body)`.
pub fn split_header(text: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            break;
        }
        offset += line.len();
    }
    text.split_at(offset)
}

/// Provenance header. Metadata only.
pub fn render_header(title: &str, at: DateTime<Utc>) -> String {
    format!(
        "{RULE}\n# {title}\n{RULE}\n#\n# Reconciled at: {}\n#\n{RULE}\n\n",
        at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Serialize entries into the collection body.
pub fn render_body(entries: &[Entry]) -> Result<String, StoreError> {
    let seq = Value::Sequence(entries.iter().map(Entry::to_value).collect());
    let yaml = serde_yaml::to_string(&seq)?;
    Ok(quote_timestamps(&yaml))
}

/// Force single quotes on top-level `date:`/`time:` scalars.
///
/// serde_yaml follows YAML 1.2 and leaves `02:40` and `2025-09-28` bare; the
/// site's YAML 1.1 readers would turn those into an integer and a timestamp.
/// Only the entry-level keys are touched (a `- ` or two-space prefix), so
/// block scalar content, which is indented deeper, is never rewritten.
fn quote_timestamps(yaml: &str) -> String {
    let mut out = String::with_capacity(yaml.len() + 64);
    for line in yaml.split_inclusive('\n') {
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        out.push_str(&quote_timestamp_line(body));
        out.push_str(newline);
    }
    out
}

fn quote_timestamp_line(line: &str) -> String {
    for prefix in ["- ", "  "] {
        let Some(rest) = line.strip_prefix(prefix) else {
            continue;
        };
        for key in ["date: ", "time: "] {
            if let Some(value) = rest.strip_prefix(key) {
                if !value.is_empty() && !value.starts_with('\'') && !value.starts_with('"') {
                    return format!("{prefix}{key}'{value}'");
                }
            }
        }
    }
    line.to_owned()
}

/// Header followed by body.
pub fn render(title: &str, at: DateTime<Utc>, entries: &[Entry]) -> Result<String, StoreError> {
    Ok(format!("{}{}", render_header(title, at), render_body(entries)?))
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Temporary sibling used by [`write_atomic`]: `<name>.tmp` in the same directory.
pub fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.tmp"))
}

/// Atomically replace `path` with `contents`.
///
/// `.tmp` is always in the same directory as the target (same filesystem).
/// If the rename fails the `.tmp` is removed and the original stays intact.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    write_atomic_with_tmp(path, contents, &tmp_path(path))
}

pub(crate) fn write_atomic_with_tmp(
    path: &Path,
    contents: &str,
    tmp: &Path,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, contents).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
