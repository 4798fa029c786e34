//! Assembly orchestration for the Remora deduplication protocol.
//!
//! [`DiffAssembler`] drives the end-to-end encode path: fetch blob →
//! chunk → query availability → build declaration → encode. The resulting
//! [`BlockTransfer`] is handed to the transport layer, which is out of
//! scope here.
//!
//! The receiving side is covered by [`rebuild`]: decoded entries plus a
//! local [`ChunkCache`] reproduce the original blob byte for byte.

pub mod assembler;
pub mod cache;
pub mod error;
pub mod rebuild;

pub use assembler::{BlockTransfer, DiffAssembler};
pub use cache::{ChunkCache, MemoryChunkCache};
pub use error::EngineError;
pub use rebuild::{rebuild, rebuild_response};

#[cfg(test)]
mod tests;
