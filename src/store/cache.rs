//! Single-slot, TTL and size bounded cache for the question pool.
//!
//! The system holds one bank, so the cache is keyed by a constant key:
//! one slot holding an immutable snapshot of the validated pool. A
//! monotonically increasing sequence number guards against the race
//! between a concurrent `invalidate()` and an in-flight reload: a reload
//! only installs its snapshot if no invalidation happened since it read
//! the bank.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::model::Question;

/// One cached materialization of the bank.
#[derive(Debug, Clone)]
pub struct CachedPool {
    /// Immutable snapshot of the validated pool.
    pub snapshot: Arc<Vec<Question>>,
    /// When the snapshot was installed.
    pub inserted_at: Instant,
    /// Sequence number the snapshot was built under.
    pub seq: u64,
}

/// The pool cache.
#[derive(Debug)]
pub struct PoolCache {
    slot: Mutex<Option<CachedPool>>,
    seq: AtomicU64,
    ttl: Duration,
    max_size: usize,
}

impl PoolCache {
    /// Create a cache with the given time-to-live and maximum snapshot
    /// size (in questions). A pool larger than `max_size` is served to
    /// callers but never retained.
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self {
            slot: Mutex::new(None),
            seq: AtomicU64::new(0),
            ttl,
            max_size,
        }
    }

    /// Return the cached snapshot if present and unexpired.
    ///
    /// An expired entry is dropped on the way out.
    pub fn get(&self) -> Option<Arc<Vec<Question>>> {
        let mut slot = self.slot.lock().unwrap();
        match slot.as_ref() {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                Some(Arc::clone(&entry.snapshot))
            }
            Some(_) => {
                tracing::debug!("pool cache expired, dropping snapshot");
                *slot = None;
                None
            }
            None => None,
        }
    }

    /// Read the current sequence number before starting a reload.
    pub fn begin(&self) -> u64 {
        self.seq.load(Ordering::Acquire)
    }

    /// Install a freshly built snapshot.
    ///
    /// The install is skipped (returning false) when an invalidation
    /// happened since `started_seq` was read, or when the snapshot
    /// exceeds the size bound. The caller still hands its snapshot to the
    /// requester either way.
    pub fn install(&self, snapshot: Arc<Vec<Question>>, started_seq: u64) -> bool {
        if snapshot.len() > self.max_size {
            tracing::debug!(
                size = snapshot.len(),
                max = self.max_size,
                "pool exceeds cache size bound, not retaining"
            );
            return false;
        }
        let mut slot = self.slot.lock().unwrap();
        if self.seq.load(Ordering::Acquire) != started_seq {
            tracing::debug!("pool cache invalidated during reload, discarding snapshot");
            return false;
        }
        *slot = Some(CachedPool {
            snapshot,
            inserted_at: Instant::now(),
            seq: started_seq,
        });
        true
    }

    /// Drop the cached pool unconditionally and bump the sequence number
    /// so in-flight reloads cannot resurrect a stale snapshot.
    pub fn invalidate(&self) {
        // Bump under the slot lock so install() cannot interleave between
        // the bump and the clear.
        let mut slot = self.slot.lock().unwrap();
        self.seq.fetch_add(1, Ordering::AcqRel);
        *slot = None;
    }
}
