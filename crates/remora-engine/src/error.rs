//! Error types for the assembly engine.

use remora_types::Digest;

/// Errors that can occur during assembly or reconstruction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Failed to access the blob store.
    #[error("store error: {0}")]
    Store(#[from] remora_store::StoreError),

    /// Failed to query or update the availability index.
    #[error("index error: {0}")]
    Index(#[from] remora_index::IndexError),

    /// Chunking error.
    #[error("chunk error: {0}")]
    Chunk(#[from] remora_chunk::ChunkError),

    /// Wire codec error.
    #[error("wire error: {0}")]
    Wire(#[from] remora_wire::WireError),

    /// The requested blob does not exist.
    ///
    /// Distinct from transient store failures: retrying will not help.
    #[error("blob not found: {0}")]
    BlobNotFound(String),

    /// A reference entry's digest was not in the local chunk cache.
    ///
    /// The sender's view of this node's holdings was stale or wrong;
    /// reconstruction of this blob must be abandoned, never patched over.
    #[error("missing chunk during rebuild: {digest}")]
    MissingChunk {
        /// The digest that could not be resolved locally.
        digest: Digest,
    },

    /// Cached bytes for a referenced chunk do not fit its window.
    #[error("chunk {digest} has {actual} bytes, window needs {expected}")]
    ChunkSizeMismatch {
        /// The chunk whose cached bytes are the wrong size.
        digest: Digest,
        /// Bytes the window requires.
        expected: usize,
        /// Bytes found.
        actual: usize,
    },
}

impl EngineError {
    /// Whether retrying the whole operation may succeed.
    ///
    /// Chunking and encoding are pure functions of the same inputs, so a
    /// retry after a transient store or index failure is safe and
    /// idempotent. Input errors, absent blobs, and reconstruction
    /// failures are not retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Index(_) | EngineError::Chunk(_) => true,
            EngineError::Store(err) => !matches!(err, remora_store::StoreError::NotFound(_)),
            EngineError::Wire(_)
            | EngineError::BlobNotFound(_)
            | EngineError::MissingChunk { .. }
            | EngineError::ChunkSizeMismatch { .. } => false,
        }
    }
}
