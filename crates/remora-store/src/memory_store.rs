//! In-memory blob storage backend.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::{BlobInfo, BlobStore};

/// In-memory blob store backed by a `RwLock<HashMap>`.
///
/// Useful for testing and for the surrounding service's memory-only mode.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get_content(&self, path: &str) -> Result<Bytes, StoreError> {
        let map = self.blobs.read().expect("lock poisoned");
        map.get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn put_content(&self, path: &str, data: Bytes) -> Result<(), StoreError> {
        let mut map = self.blobs.write().expect("lock poisoned");
        debug!(path, size = data.len(), "storing blob in memory");
        map.insert(path.to_string(), data);
        Ok(())
    }

    async fn stat(&self, path: &str) -> Result<BlobInfo, StoreError> {
        let map = self.blobs.read().expect("lock poisoned");
        match map.get(path) {
            Some(data) => Ok(BlobInfo {
                path: path.to_string(),
                size: data.len() as u64,
            }),
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let map = self.blobs.read().expect("lock poisoned");
        let mut paths: Vec<String> = map
            .keys()
            .filter(|p| p.starts_with(prefix))
            .cloned()
            .collect();
        paths.sort();
        Ok(paths)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let mut map = self.blobs.write().expect("lock poisoned");
        if map.remove(path).is_none() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        debug!(path, "deleted blob from memory");
        Ok(())
    }
}
