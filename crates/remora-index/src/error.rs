//! Error types for availability-index operations.

/// Errors that can occur while talking to the node-state store.
///
/// An unreachable store must surface here rather than degrade into a
/// "node has everything" answer: over-reporting holdings silently corrupts
/// the receiver's reconstructed blob, while failing loudly only costs a
/// retry.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The node-state store could not be reached.
    #[error("node-state store unavailable: {0}")]
    Unavailable(String),

    /// An I/O error occurred on the store transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
