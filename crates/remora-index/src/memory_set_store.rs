//! In-memory node-set store.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use remora_types::{Digest, NodeId};
use tracing::{debug, info};

use crate::error::IndexError;
use crate::store::NodeSetStore;

/// In-memory [`NodeSetStore`] backed by a `RwLock<HashMap>`.
///
/// Used by tests and by single-process deployments. A fault-injection
/// switch lets tests exercise the unreachable-store path.
#[derive(Default)]
pub struct MemorySetStore {
    sets: RwLock<HashMap<NodeId, HashSet<Digest>>>,
    unavailable: AtomicBool,
}

impl MemorySetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store becoming unreachable (or reachable again).
    /// Subsequent operations fail with [`IndexError::Unavailable`] while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> Result<(), IndexError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IndexError::Unavailable(
                "simulated store outage".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of nodes with a recorded set.
    pub fn node_count(&self) -> usize {
        self.sets.read().expect("lock poisoned").len()
    }
}

#[async_trait::async_trait]
impl NodeSetStore for MemorySetStore {
    async fn replace_set(&self, node: &NodeId, digests: Vec<Digest>) -> Result<(), IndexError> {
        self.check_reachable()?;
        let mut map = self.sets.write().expect("lock poisoned");
        let set = map.entry(node.clone()).or_default();
        // Clear-then-insert ordering: an interleaved reader on a store
        // without this lock would see a subset, never stale extras.
        set.clear();
        set.extend(digests);
        info!(%node, holdings = set.len(), "replaced node holdings");
        Ok(())
    }

    async fn contains_batch(
        &self,
        node: &NodeId,
        digests: &[Digest],
    ) -> Result<Vec<bool>, IndexError> {
        self.check_reachable()?;
        let map = self.sets.read().expect("lock poisoned");
        let held = match map.get(node) {
            Some(set) => digests.iter().map(|d| set.contains(d)).collect(),
            // Unknown node holds nothing.
            None => vec![false; digests.len()],
        };
        debug!(%node, queried = digests.len(), "answered membership batch");
        Ok(held)
    }

    async fn intersect(
        &self,
        node: &NodeId,
        digests: &[Digest],
    ) -> Result<Vec<Digest>, IndexError> {
        self.check_reachable()?;
        let map = self.sets.read().expect("lock poisoned");
        let result = match map.get(node) {
            Some(set) => digests.iter().filter(|d| set.contains(d)).copied().collect(),
            None => Vec::new(),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digests(n: usize) -> Vec<Digest> {
        (0..n)
            .map(|i| Digest::from_data(format!("chunk-{i}").as_bytes()))
            .collect()
    }

    #[tokio::test]
    async fn test_unknown_node_holds_nothing() {
        let store = MemorySetStore::new();
        let node = NodeId::from("never-seen");
        let held = store.contains_batch(&node, &digests(3)).await.unwrap();
        assert_eq!(held, vec![false, false, false]);
    }

    #[tokio::test]
    async fn test_replace_then_query() {
        let store = MemorySetStore::new();
        let node = NodeId::from("node-1");
        let ds = digests(4);

        store
            .replace_set(&node, vec![ds[1], ds[3]])
            .await
            .unwrap();

        let held = store.contains_batch(&node, &ds).await.unwrap();
        assert_eq!(held, vec![false, true, false, true]);
    }

    #[tokio::test]
    async fn test_replace_is_wholesale_not_additive() {
        let store = MemorySetStore::new();
        let node = NodeId::from("node-1");
        let ds = digests(3);

        store.replace_set(&node, vec![ds[0]]).await.unwrap();
        store.replace_set(&node, vec![ds[2]]).await.unwrap();

        let held = store.contains_batch(&node, &ds).await.unwrap();
        assert_eq!(held, vec![false, false, true], "old holdings must be gone");
    }

    #[tokio::test]
    async fn test_intersect_returns_held_subset() {
        let store = MemorySetStore::new();
        let node = NodeId::from("node-1");
        let ds = digests(5);

        store
            .replace_set(&node, vec![ds[0], ds[2], ds[4]])
            .await
            .unwrap();

        let subset = store.intersect(&node, &ds).await.unwrap();
        assert_eq!(subset, vec![ds[0], ds[2], ds[4]]);
    }

    #[tokio::test]
    async fn test_intersect_unknown_node_is_empty() {
        let store = MemorySetStore::new();
        let node = NodeId::from("never-seen");
        let subset = store.intersect(&node, &digests(3)).await.unwrap();
        assert!(subset.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_loudly() {
        let store = MemorySetStore::new();
        let node = NodeId::from("node-1");
        store.set_unavailable(true);

        assert!(matches!(
            store.contains_batch(&node, &digests(1)).await.unwrap_err(),
            IndexError::Unavailable(_)
        ));
        assert!(matches!(
            store.replace_set(&node, digests(1)).await.unwrap_err(),
            IndexError::Unavailable(_)
        ));

        store.set_unavailable(false);
        assert!(store.contains_batch(&node, &digests(1)).await.is_ok());
    }
}
