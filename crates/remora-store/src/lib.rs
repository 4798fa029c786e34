//! Byte-addressable blob storage for Remora.
//!
//! The deduplication core treats blob storage as a collaborator, not an
//! implementation concern: [`BlobStore`] is the seam behind which
//! object-store adapters live. The assembly path only ever calls
//! [`BlobStore::get_content`]; the remaining operations are the surface
//! the surrounding service uses for bookkeeping.
//!
//! [`MemoryBlobStore`] is the in-memory backend used by tests and by
//! memory-only deployments.

mod error;
mod memory_store;
mod traits;

pub use error::StoreError;
pub use memory_store::MemoryBlobStore;
pub use traits::{BlobInfo, BlobStore};
