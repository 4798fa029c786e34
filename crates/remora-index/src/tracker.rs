//! Availability tracker and the declaration-building seam.

use std::collections::HashSet;
use std::sync::Arc;

use remora_types::{Declaration, Digest, NodeId, Recipe};
use tracing::debug;

use crate::error::IndexError;
use crate::store::NodeSetStore;

/// Default number of digests per membership round-trip.
///
/// Bounds request and response sizes toward the node-state store; a
/// recipe longer than this is queried in several round-trips.
pub const DEFAULT_QUERY_BATCH: usize = 5000;

/// Source of declarations for a (node, recipe) pair.
///
/// This is the seam between availability lookup and the wire codec: the
/// assembler depends on this trait, so an alternative backend (a bitmap
/// service instead of a set store) can be substituted without touching
/// the encode path.
#[async_trait::async_trait]
pub trait DeclarationSource: Send + Sync {
    /// Build the declaration for `recipe` as held by `node`.
    async fn declare(&self, node: &NodeId, recipe: &Recipe) -> Result<Declaration, IndexError>;
}

/// Tracks, per node, which chunk digests that node is known to hold,
/// and answers membership queries against a recipe.
///
/// All state lives in the injected [`NodeSetStore`]; the tracker itself
/// holds no mutable state and needs no locks.
pub struct AvailabilityTracker {
    store: Arc<dyn NodeSetStore>,
    batch_size: usize,
}

impl AvailabilityTracker {
    /// Create a tracker with the default query batch size.
    pub fn new(store: Arc<dyn NodeSetStore>) -> Self {
        Self::with_batch_size(store, DEFAULT_QUERY_BATCH)
    }

    /// Create a tracker with an explicit query batch size (minimum 1).
    pub fn with_batch_size(store: Arc<dyn NodeSetStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Record a node's complete current holdings, replacing any previous
    /// set wholesale. Reporting the same holdings twice is idempotent.
    pub async fn report_holdings(
        &self,
        node: &NodeId,
        digests: Vec<Digest>,
    ) -> Result<(), IndexError> {
        self.store.replace_set(node, digests).await
    }

    /// Query which chunks of `recipe` the node already holds.
    ///
    /// Digests are looked up in batches of at most `batch_size` per
    /// round-trip. A node with no recorded holdings yields an all-`false`
    /// declaration of the recipe's length; an unreachable store is an
    /// error, never a default answer.
    pub async fn query_availability(
        &self,
        node: &NodeId,
        recipe: &Recipe,
    ) -> Result<Declaration, IndexError> {
        let mut held = Vec::with_capacity(recipe.len());
        for batch in recipe.digests().chunks(self.batch_size) {
            let mut part = self.store.contains_batch(node, batch).await?;
            held.append(&mut part);
        }

        debug!(
            %node,
            chunks = recipe.len(),
            held = held.iter().filter(|&&h| h).count(),
            "queried chunk availability"
        );
        Ok(Declaration::new(held))
    }

    /// Query availability via the store-side intersection primitive.
    ///
    /// One round-trip; the membership vector is reconstructed locally by
    /// testing each recipe digest against the returned subset. Equivalent
    /// to [`Self::query_availability`] for a consistent store.
    pub async fn query_availability_via_intersection(
        &self,
        node: &NodeId,
        recipe: &Recipe,
    ) -> Result<Declaration, IndexError> {
        let subset: HashSet<Digest> = self
            .store
            .intersect(node, recipe.digests())
            .await?
            .into_iter()
            .collect();

        Ok(Declaration::new(
            recipe.iter().map(|d| subset.contains(d)).collect(),
        ))
    }
}

#[async_trait::async_trait]
impl DeclarationSource for AvailabilityTracker {
    async fn declare(&self, node: &NodeId, recipe: &Recipe) -> Result<Declaration, IndexError> {
        self.query_availability(node, recipe).await
    }
}
