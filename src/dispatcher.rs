//! Request dispatch: a bounded pool of worker tasks draining the
//! size-ordered queue, with cache consultation and reply fan-out.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::cache::DigestCache;
use crate::hasher::{self, FileDigest, HashError};
use crate::protocol;
use crate::queue::{PendingRequest, RequestQueue};
use crate::transport;

/// Default maximum number of concurrently hashing workers.
pub const DEFAULT_POOL_LIMIT: usize = 5;

/// Computes file digests for the dispatcher.
/// This allows instrumenting or stubbing the hashing step in tests.
pub trait DigestBackend: Send + Sync + 'static {
    fn digest(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<FileDigest, HashError>> + Send + '_>>;
}

/// Production backend: chunked SHA-256 over the real filesystem.
pub struct FileDigester;

impl DigestBackend for FileDigester {
    fn digest(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<FileDigest, HashError>> + Send + '_>> {
        let path = path.to_path_buf();
        Box::pin(async move { hasher::digest_file(&path).await })
    }
}

/// State shared by the intake loop and every worker. Guarded by one
/// lock; critical sections are short scans and never span I/O.
struct DispatchState {
    queue: RequestQueue,
    cache: DigestCache,
    active_workers: usize,
}

pub struct Dispatcher<B: DigestBackend> {
    state: Mutex<DispatchState>,
    pool_limit: usize,
    backend: B,
}

impl<B: DigestBackend> Dispatcher<B> {
    pub fn new(backend: B, pool_limit: usize, cache_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(DispatchState {
                queue: RequestQueue::new(),
                cache: DigestCache::new(cache_capacity),
                active_workers: 0,
            }),
            pool_limit,
            backend,
        })
    }

    fn locked(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accept one raw request: stat the file for its sort key, enqueue
    /// (merging with any queued entry for the same path), and spawn a
    /// worker if the pool has capacity. Queue depth is unbounded; the
    /// worker count is the only admission control.
    pub fn submit(self: &Arc<Self>, path: &Path, reply_dest: String) {
        // A failed stat sorts the request first, same as a zero-byte file.
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let spawn = {
            let mut state = self.locked();
            let merged = state.queue.enqueue(path, reply_dest, size);
            if merged {
                debug!(path = %path.display(), "request merged into queued entry");
            } else {
                debug!(path = %path.display(), size, depth = state.queue.len(), "request queued");
            }
            if state.active_workers < self.pool_limit {
                state.active_workers += 1;
                true
            } else {
                false
            }
        };

        if spawn {
            let dispatcher = self.clone();
            tokio::spawn(async move { dispatcher.run_worker().await });
        }
    }

    /// One pooled worker: drains the queue until empty, then releases
    /// its pool slot. The empty check and the slot release happen under
    /// the same lock acquisition, so a request enqueued after the check
    /// sees either a free slot or a worker that will pick it up.
    async fn run_worker(self: Arc<Self>) {
        debug!("worker started");
        loop {
            let request = {
                let mut state = self.locked();
                match state.queue.dequeue_front() {
                    Some(request) => request,
                    None => {
                        state.active_workers -= 1;
                        debug!(active = state.active_workers, "worker exiting");
                        return;
                    }
                }
            };
            self.process(request).await;
        }
    }

    /// Serve one dequeued request: cache lookup, hash on miss, then
    /// deliver the same single line to every waiter independently.
    async fn process(&self, request: PendingRequest) {
        let path = request.path;

        let cached = self.locked().cache.lookup(&path);
        let outcome = match cached {
            Some(digest) => {
                debug!(path = %path.display(), "cache hit");
                Ok(digest)
            }
            None => match self.backend.digest(&path).await {
                Ok(digest) => {
                    let mut state = self.locked();
                    let stored = state.cache.insert(&path, digest);
                    debug!(path = %path.display(), stored, cached = state.cache.len(), "digest computed");
                    Ok(digest)
                }
                // Failures are reported, never cached.
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "hashing failed");
                    Err(e)
                }
            },
        };

        let line = match &outcome {
            Ok(digest) => protocol::format_success(&path, digest),
            Err(_) => protocol::format_error(&path),
        };

        for waiter in &request.waiters {
            // One failed delivery must not block the remaining waiters.
            match transport::send_reply(waiter, line.as_bytes()).await {
                Ok(()) => debug!(path = %path.display(), dest = %waiter, "reply delivered"),
                Err(e) => warn!(path = %path.display(), dest = %waiter, error = %e, "reply delivery failed"),
            }
        }
    }

    #[cfg(test)]
    fn cache_len(&self) -> usize {
        self.locked().cache.len()
    }

    #[cfg(test)]
    fn active_workers(&self) -> usize {
        self.locked().active_workers
    }
}
