//! Bounded path→digest cache: insert-until-full, never evict.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::hasher::FileDigest;

/// Default maximum number of cached digests.
pub const DEFAULT_CAPACITY: usize = 100;

/// Caches the digest of each distinct path hashed so far.
///
/// Entries are immutable once written and never removed; once the cache
/// is full, further inserts are silently ignored. The first
/// capacity-many unique paths win.
pub struct DigestCache {
    entries: HashMap<PathBuf, FileDigest>,
    capacity: usize,
}

impl DigestCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Look up the cached digest for a path. Side-effect free.
    pub fn lookup(&self, path: &Path) -> Option<FileDigest> {
        self.entries.get(path).copied()
    }

    /// Insert a digest if capacity remains and the path is not already
    /// cached. Returns whether the entry was stored.
    pub fn insert(&mut self, path: &Path, digest: FileDigest) -> bool {
        if self.entries.len() >= self.capacity || self.entries.contains_key(path) {
            return false;
        }
        self.entries.insert(path.to_path_buf(), digest);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
