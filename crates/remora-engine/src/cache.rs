//! Local digest→bytes chunk cache for the receiving side.
//!
//! A receiver reconstructing blobs keeps the windows it has seen, keyed
//! by digest, so future transfers can reference them instead of resending
//! bytes. [`MemoryChunkCache`] bounds itself by total bytes and evicts
//! least-recently-used entries.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use bytes::Bytes;
use remora_types::Digest;
use tracing::debug;

/// Digest-addressed chunk cache.
///
/// Implementations must be `Send + Sync`; reconstruction reads and writes
/// through this trait so a persistent cache can be swapped in.
pub trait ChunkCache: Send + Sync {
    /// Look up a chunk's bytes by digest.
    fn get(&self, digest: &Digest) -> Option<Bytes>;

    /// Insert a chunk's bytes under its digest.
    fn insert(&self, digest: Digest, data: Bytes);
}

/// Thread-safe LRU chunk cache bounded by total bytes.
///
/// All operations acquire a single lock — fine because the critical
/// section is pure in-memory work with no I/O.
pub struct MemoryChunkCache {
    max_bytes: u64,
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    /// Access order: front = oldest (eviction candidate), back = newest.
    order: VecDeque<Digest>,
    data: HashMap<Digest, Bytes>,
    used_bytes: u64,
}

impl MemoryChunkCache {
    /// Create a cache with the given byte limit.
    ///
    /// A `max_bytes` of 0 disables caching entirely.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            inner: Mutex::new(CacheInner {
                order: VecDeque::new(),
                data: HashMap::new(),
                used_bytes: 0,
            }),
        }
    }

    /// Create an effectively unbounded cache (for tests).
    pub fn unbounded() -> Self {
        Self::new(u64::MAX)
    }

    /// Current number of cached chunks.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").data.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .expect("cache lock poisoned")
            .data
            .is_empty()
    }

    /// Current bytes used by cached chunks.
    pub fn used_bytes(&self) -> u64 {
        self.inner.lock().expect("cache lock poisoned").used_bytes
    }

    /// The digests currently cached, in no particular order.
    ///
    /// This is what a node reports as its holdings.
    pub fn digests(&self) -> Vec<Digest> {
        self.inner
            .lock()
            .expect("cache lock poisoned")
            .data
            .keys()
            .copied()
            .collect()
    }
}

impl ChunkCache for MemoryChunkCache {
    fn get(&self, digest: &Digest) -> Option<Bytes> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let data = inner.data.get(digest)?.clone();

        // Promote: remove from current position, push to back.
        inner.order.retain(|d| d != digest);
        inner.order.push_back(*digest);

        Some(data)
    }

    fn insert(&self, digest: Digest, data: Bytes) {
        let data_len = data.len() as u64;
        if data_len > self.max_bytes {
            return;
        }

        let mut inner = self.inner.lock().expect("cache lock poisoned");

        // If already cached, remove the old entry first.
        if let Some(old) = inner.data.remove(&digest) {
            inner.used_bytes -= old.len() as u64;
            inner.order.retain(|d| *d != digest);
        }

        // Evict until there is room.
        while inner.used_bytes + data_len > self.max_bytes {
            let Some(evict) = inner.order.pop_front() else {
                break;
            };
            if let Some(evicted) = inner.data.remove(&evict) {
                inner.used_bytes -= evicted.len() as u64;
                debug!(digest = %evict, "evicted cached chunk");
            }
        }

        inner.used_bytes += data_len;
        inner.data.insert(digest, data);
        inner.order.push_back(digest);
    }
}
