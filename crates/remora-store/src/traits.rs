//! Core trait and types for blob storage.

use bytes::Bytes;

use crate::error::StoreError;

/// Metadata about a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    /// Path the blob is stored under.
    pub path: String,
    /// Size of the blob in bytes.
    pub size: u64,
}

/// Trait for byte-addressable blob storage.
///
/// All implementations must be `Send + Sync` for use across async tasks.
/// Data is passed as [`Bytes`] to enable zero-copy handoff to the codec.
/// Every operation on an absent path fails with [`StoreError::NotFound`].
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the full contents of a blob.
    async fn get_content(&self, path: &str) -> Result<Bytes, StoreError>;

    /// Store a blob under the given path, replacing any existing content.
    async fn put_content(&self, path: &str, data: Bytes) -> Result<(), StoreError>;

    /// Return metadata about a blob without fetching its bytes.
    async fn stat(&self, path: &str) -> Result<BlobInfo, StoreError>;

    /// List all stored paths starting with the given prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Delete a blob.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}
