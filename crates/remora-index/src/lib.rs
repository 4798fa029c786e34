//! Node chunk-availability tracking.
//!
//! Each node's known holdings (the set of chunk digests it already has)
//! live in a networked key/set store, injected behind the [`NodeSetStore`]
//! trait. [`AvailabilityTracker`] answers batched membership queries
//! against a recipe, producing the [`Declaration`](remora_types::Declaration)
//! the wire codec consumes.
//!
//! [`DeclarationSource`] is the seam at which an alternative availability
//! backend (a bitmap service, say) can be substituted without touching the
//! codec.

mod error;
mod memory_set_store;
mod store;
mod tracker;

pub use error::IndexError;
pub use memory_set_store::MemorySetStore;
pub use store::NodeSetStore;
pub use tracker::{AvailabilityTracker, DeclarationSource, DEFAULT_QUERY_BATCH};
