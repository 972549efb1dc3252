//! Resource capability: existence and identity of image references.
//!
//! The reconciler never touches the filesystem for resources directly; it
//! goes through [`ResourceStore`]. [`FsResources`] resolves references
//! against a site root; [`MemResources`] is an in-memory store for tests and
//! for callers that already hold the resource table.

use std::collections::HashMap;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};

use thoughts_core::ResourceIdentity;

/// Identity of a resource's bytes, as far as the configured check can tell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    Size(u64),
    Sha256(String),
}

/// Existence and identity lookups for resource references.
///
/// `Err` means the check itself failed (distinct from "not found").
pub trait ResourceStore {
    fn exists(&self, reference: &str) -> io::Result<bool>;

    /// Byte size, or `None` when the store cannot tell.
    fn size(&self, reference: &str) -> io::Result<Option<u64>>;

    /// Hex SHA-256 of the content, or `None` when the store cannot tell.
    fn sha256(&self, reference: &str) -> io::Result<Option<String>>;

    /// Fingerprint under `identity`. `None` leaves the exact reference
    /// string as the only identity.
    fn fingerprint(
        &self,
        reference: &str,
        identity: ResourceIdentity,
    ) -> io::Result<Option<Fingerprint>> {
        Ok(match identity {
            ResourceIdentity::Size => self.size(reference)?.map(Fingerprint::Size),
            ResourceIdentity::Sha256 => self.sha256(reference)?.map(Fingerprint::Sha256),
        })
    }
}

// ---------------------------------------------------------------------------
// FsResources
// ---------------------------------------------------------------------------

/// References resolved against a site root on the local filesystem.
///
/// `/assets/x.jpg` and `assets/x.jpg` both resolve to `<root>/assets/x.jpg`.
/// `http(s)://` references are not checked: they exist, with no fingerprint.
/// A reference that climbs out of the root (`../x.jpg`) is reported missing.
#[derive(Debug, Clone)]
pub struct FsResources {
    root: PathBuf,
}

impl FsResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path for `reference` under the root; `None` for remote
    /// references and for references that leave the root.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        match self.locate(reference) {
            Location::Local(path) => Some(path),
            Location::Remote | Location::Outside => None,
        }
    }

    fn locate(&self, reference: &str) -> Location {
        if is_remote(reference) {
            return Location::Remote;
        }
        let relative = Path::new(reference.trim().trim_start_matches('/'));
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            tracing::debug!("reference leaves the site root: {reference}");
            return Location::Outside;
        }
        Location::Local(self.root.join(relative))
    }
}

enum Location {
    Remote,
    Local(PathBuf),
    Outside,
}

fn is_remote(reference: &str) -> bool {
    let lower = reference.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

impl ResourceStore for FsResources {
    fn exists(&self, reference: &str) -> io::Result<bool> {
        let path = match self.locate(reference) {
            Location::Local(path) => path,
            Location::Remote => return Ok(true),
            Location::Outside => return Ok(false),
        };
        match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn size(&self, reference: &str) -> io::Result<Option<u64>> {
        let Some(path) = self.resolve(reference) else {
            return Ok(None);
        };
        match std::fs::metadata(&path) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn sha256(&self, reference: &str) -> io::Result<Option<String>> {
        let Some(path) = self.resolve(reference) else {
            return Ok(None);
        };
        let mut file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(Some(hex::encode(hasher.finalize())))
    }
}

// ---------------------------------------------------------------------------
// MemResources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum MemResource {
    Bytes(Vec<u8>),
    Unreadable(String),
}

/// In-memory resource table keyed by the exact reference string.
#[derive(Debug, Clone, Default)]
pub struct MemResources {
    items: HashMap<String, MemResource>,
}

impl MemResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing resource with the given content.
    pub fn with_file(mut self, reference: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.items
            .insert(reference.to_owned(), MemResource::Bytes(bytes.into()));
        self
    }

    /// Register a reference whose every check fails with an I/O error.
    pub fn with_unreadable(mut self, reference: &str, message: &str) -> Self {
        self.items.insert(
            reference.to_owned(),
            MemResource::Unreadable(message.to_owned()),
        );
        self
    }

    fn lookup(&self, reference: &str) -> io::Result<Option<&[u8]>> {
        match self.items.get(reference) {
            None => Ok(None),
            Some(MemResource::Bytes(bytes)) => Ok(Some(bytes.as_slice())),
            Some(MemResource::Unreadable(message)) => Err(io::Error::other(message.clone())),
        }
    }
}

impl ResourceStore for MemResources {
    fn exists(&self, reference: &str) -> io::Result<bool> {
        Ok(self.lookup(reference)?.is_some())
    }

    fn size(&self, reference: &str) -> io::Result<Option<u64>> {
        Ok(self.lookup(reference)?.map(|b| b.len() as u64))
    }

    fn sha256(&self, reference: &str) -> io::Result<Option<String>> {
        Ok(self
            .lookup(reference)?
            .map(|b| hex::encode(Sha256::digest(b))))
    }
}
