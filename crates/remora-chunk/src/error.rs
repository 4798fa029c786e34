//! Error types for chunking operations.

/// Errors that can occur while generating a recipe.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// An I/O error occurred while streaming blob bytes.
    ///
    /// Fatal to the whole operation: a failed read never yields a
    /// truncated recipe.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
