//! Shared test utilities for remora-engine tests.

use std::sync::Arc;

use bytes::Bytes;
use remora_index::{AvailabilityTracker, MemorySetStore};
use remora_store::{BlobStore, MemoryBlobStore};
use remora_types::{Recipe, WindowGeometry};

use crate::assembler::DiffAssembler;
use crate::cache::{ChunkCache, MemoryChunkCache};

/// Generate deterministic, non-repeating test data.
pub fn test_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0xDEAD_BEEF;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

/// A single-process setup: in-memory blob store and set store behind a
/// tracker and an assembler with the default geometry.
pub struct TestRig {
    pub blob_store: Arc<MemoryBlobStore>,
    pub set_store: Arc<MemorySetStore>,
    pub tracker: Arc<AvailabilityTracker>,
    pub assembler: DiffAssembler,
}

pub fn rig() -> TestRig {
    let blob_store = Arc::new(MemoryBlobStore::new());
    let set_store = Arc::new(MemorySetStore::new());
    let tracker = Arc::new(AvailabilityTracker::new(set_store.clone()));
    let assembler = DiffAssembler::new(
        blob_store.clone(),
        tracker.clone(),
        WindowGeometry::default(),
    );
    TestRig {
        blob_store,
        set_store,
        tracker,
        assembler,
    }
}

/// A rig with one blob already stored under `path`.
pub async fn rig_with_blob(path: &str, data: &[u8]) -> TestRig {
    let rig = rig();
    rig.blob_store
        .put_content(path, Bytes::copy_from_slice(data))
        .await
        .unwrap();
    rig
}

/// Seed a cache with every window of `blob` keyed by its recipe digest —
/// a receiver that genuinely holds everything it was reported to hold.
pub fn seed_cache(cache: &MemoryChunkCache, recipe: &Recipe, blob: &[u8], geometry: WindowGeometry) {
    for (i, digest) in recipe.iter().enumerate() {
        let (start, end) = geometry.block_indices(i, blob.len());
        cache.insert(*digest, Bytes::copy_from_slice(&blob[start..end]));
    }
}
