//! Size-ordered queue of pending hash requests with waiter coalescing.

use std::path::{Path, PathBuf};

/// All currently-outstanding asks for one path.
///
/// Owned by the queue until dequeued, then by the worker processing it.
#[derive(Debug)]
pub struct PendingRequest {
    pub path: PathBuf,
    /// File size observed when the request was first enqueued; the sort
    /// key. A failed stat records 0, so such entries sort first.
    pub size_at_enqueue: u64,
    /// Reply destinations of every client waiting on this path.
    pub waiters: Vec<String>,
}

/// Pending requests ordered ascending by size at enqueue time, so that
/// smaller files are served first. No two entries share a path.
#[derive(Default)]
pub struct RequestQueue {
    entries: Vec<PendingRequest>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one ask for `path`. If the path is already queued, the new
    /// waiter joins the existing entry (coalescing) and `true` is
    /// returned. Otherwise a new entry is inserted before the first
    /// strictly-larger one, so equal sizes keep arrival order.
    pub fn enqueue(&mut self, path: &Path, reply_dest: String, size: u64) -> bool {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.path == path) {
            existing.waiters.push(reply_dest);
            return true;
        }

        let pos = self
            .entries
            .iter()
            .position(|e| e.size_at_enqueue > size)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            pos,
            PendingRequest {
                path: path.to_path_buf(),
                size_at_enqueue: size,
                waiters: vec![reply_dest],
            },
        );
        false
    }

    /// Remove and return the smallest-size entry with its full waiter set.
    pub fn dequeue_front(&mut self) -> Option<PendingRequest> {
        (!self.entries.is_empty()).then(|| self.entries.remove(0))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
