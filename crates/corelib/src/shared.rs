//! Selector that can be shared between threads.

use crate::error::Result;
use crate::node::NodeSummary;
use crate::pool::{NodePool, PoolEvent};
use crate::selector::{Algorithm, Selector};
use parking_lot::RwLock;

/// A [`Selector`] behind a read/write lock.
///
/// Consistent hash lookups only take the read lock and run concurrently.
/// Round robin picks mutate counters and take the write lock, as do
/// rebuilds.
#[derive(Debug)]
pub struct SharedSelector {
    inner: RwLock<Selector>,
}

impl SharedSelector {
    pub fn new(selector: Selector) -> Self {
        Self {
            inner: RwLock::new(selector),
        }
    }

    pub fn select(&self, key: &str) -> Result<NodeSummary> {
        {
            let guard = self.inner.read();
            if let Selector::ConsistentHash(ring) = &*guard {
                return ring.try_select(key);
            }
        }
        // the variant may have been swapped in between; `select` handles both
        self.inner.write().select(key)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.inner.read().algorithm()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn apply(&self, event: &PoolEvent, pool: &NodePool) {
        self.inner.write().apply(event, pool);
    }

    /// Swap in a new selector, returning the old one.
    pub fn replace(&self, selector: Selector) -> Selector {
        std::mem::replace(&mut *self.inner.write(), selector)
    }
}

impl From<Selector> for SharedSelector {
    fn from(selector: Selector) -> Self {
        Self::new(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use std::collections::HashMap;

    fn pool() -> NodePool {
        NodePool::from_nodes([
            Node::new("a", "a").with_weight(3),
            Node::new("b", "b"),
        ])
        .unwrap()
    }

    #[test]
    fn test_concurrent_round_robin_keeps_proportions() {
        let shared = SharedSelector::new(Selector::build(Algorithm::WeightedRoundRobin, &pool()));

        let picks: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        (0..100)
                            .map(|_| shared.select("").unwrap().name)
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        let mut counts: HashMap<String, usize> = HashMap::new();
        for name in picks {
            *counts.entry(name).or_default() += 1;
        }
        // 400 serialized picks over a 4-pick cycle
        assert_eq!(counts["a"], 300);
        assert_eq!(counts["b"], 100);
    }

    #[test]
    fn test_concurrent_ring_reads_agree() {
        let shared = SharedSelector::new(Selector::build(Algorithm::ConsistentHash, &pool()));
        let expected: Vec<_> = (0..50).map(|i| shared.select(&format!("user-{}", i)).unwrap()).collect();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for (i, want) in expected.iter().enumerate() {
                        assert_eq!(&shared.select(&format!("user-{}", i)).unwrap(), want);
                    }
                });
            }
        });
    }

    #[test]
    fn test_replace_swaps_algorithm() {
        let pool = pool();
        let shared = SharedSelector::from(Selector::build(Algorithm::WeightedRoundRobin, &pool));
        let old = shared.replace(Selector::build(Algorithm::ConsistentHash, &pool));
        assert_eq!(old.algorithm(), Algorithm::WeightedRoundRobin);
        assert_eq!(shared.algorithm(), Algorithm::ConsistentHash);
        assert_eq!(shared.len(), 2);
    }
}
