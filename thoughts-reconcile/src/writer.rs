//! Hash-gated atomic writer for the collection file.
//!
//! ## `write_collection` protocol
//!
//! 1. Render the canonical body (already done by caller).
//! 2. SHA-256 hash the body, line endings normalised to LF.
//! 3. Hash the body currently on disk the same way.
//! 4. Equal → skip; the file, its header and its mtime stay untouched.
//! 5. `--dry-run` → report what would happen, write nothing.
//! 6. Prepend a fresh provenance header and replace the file atomically.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use thoughts_core::store;

use crate::error::ReconcileError;

/// Outcome of writing the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteResult {
    /// File was written (the canonical body differs from what was on disk).
    Written { path: PathBuf },
    /// File was skipped: it already holds the canonical body.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

/// Hex SHA-256 of `content` with CRLF normalised to LF.
pub fn body_digest(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n");
    let mut h = Sha256::new();
    h.update(normalized.as_bytes());
    hex::encode(h.finalize())
}

/// Replace the collection at `path` with `body` unless it already holds it.
pub fn write_collection(
    path: &Path,
    current_body: &str,
    body: &str,
    header_title: &str,
    at: DateTime<Utc>,
    dry_run: bool,
) -> Result<WriteResult, ReconcileError> {
    if body_digest(current_body) == body_digest(body) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    let contents = format!("{}{}", store::render_header(header_title, at), body);
    store::write_atomic(path, &contents)?;

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, current: &str, body: &str, dry_run: bool) -> WriteResult {
        write_collection(path, current, body, "Thoughts", Utc::now(), dry_run).unwrap()
    }

    #[test]
    fn changed_body_is_written_with_header() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("thoughts.yml");
        let result = write(&path, "", "- date: '2025-01-01'\n", false);
        assert!(matches!(result, WriteResult::Written { .. }));
        let disk = fs::read_to_string(&path).unwrap();
        assert!(disk.starts_with("# ===="));
        assert!(disk.ends_with("- date: '2025-01-01'\n"));
    }

    #[test]
    fn same_body_returns_unchanged_and_does_not_touch_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("thoughts.yml");
        fs::write(&path, "# old header\n- date: '2025-01-01'\n").unwrap();
        let result = write(&path, "- date: '2025-01-01'\n", "- date: '2025-01-01'\n", false);
        assert!(matches!(result, WriteResult::Unchanged { .. }));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# old header\n- date: '2025-01-01'\n"
        );
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.yml");
        let result = write(&path, "", "[]\n", true);
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
    }

    #[test]
    fn crlf_and_lf_bodies_share_the_same_hash() {
        assert_eq!(body_digest("a\r\nb\r\n"), body_digest("a\nb\n"));
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.yml");
        write(&path, "", "[]\n", false);
        assert!(!store::tmp_path(&path).exists(), ".tmp must be cleaned up");
    }
}
