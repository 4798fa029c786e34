//! Error types for blob storage operations.

/// Errors that can occur during blob storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested path does not exist in the store.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store could not be reached.
    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}
