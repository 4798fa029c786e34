//! Trait for the networked key/set store holding per-node chunk sets.

use remora_types::{Digest, NodeId};

use crate::error::IndexError;

/// A networked key/set store keeping one named digest set per node.
///
/// Implementations must be `Send + Sync`. The store is the only shared
/// mutable state in the deduplication core and therefore its
/// synchronization point; everything else is pure computation.
#[async_trait::async_trait]
pub trait NodeSetStore: Send + Sync {
    /// Replace a node's set wholesale with exactly `digests`.
    ///
    /// Not additive: callers pass the node's complete current holdings.
    /// Implementations that cannot replace atomically must clear the old
    /// set before inserting the new one — a concurrent reader may then
    /// observe a partial set, which only ever under-reports holdings.
    async fn replace_set(&self, node: &NodeId, digests: Vec<Digest>) -> Result<(), IndexError>;

    /// Batched membership lookup against a node's set.
    ///
    /// Returns one boolean per queried digest, in query order. A node with
    /// no recorded set answers all-`false`.
    async fn contains_batch(
        &self,
        node: &NodeId,
        digests: &[Digest],
    ) -> Result<Vec<bool>, IndexError>;

    /// Store-side intersection between a node's set and an ad-hoc digest
    /// list. Returns the digests present in the node's set.
    async fn intersect(&self, node: &NodeId, digests: &[Digest])
        -> Result<Vec<Digest>, IndexError>;
}
