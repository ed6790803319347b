//! Smooth weighted round robin.
//!
//! On every pick each peer's `current` grows by its weight, the peer with
//! the largest `current` wins (earliest peer on ties) and pays back the
//! total weight. Over any `total_weight` consecutive picks from a fresh
//! selector each peer is chosen exactly `weight` times, and heavy peers are
//! interleaved with light ones instead of being picked in bursts.

use crate::error::{Error, Result};
use crate::node::{Node, NodeSummary};
use tracing::{debug, trace};

#[derive(Clone, Debug)]
struct Peer {
    summary: NodeSummary,
    weight: i64,
    current: i64,
}

/// Weighted round robin selector.
///
/// `select` mutates the per-peer counters, so a shared instance must be
/// serialized by the caller (see [`SharedSelector`](crate::SharedSelector)).
#[derive(Clone, Debug)]
pub struct WeightedRoundRobin {
    peers: Vec<Peer>,
    total_weight: i64,
}

impl WeightedRoundRobin {
    /// Build over the online nodes, in the given order.
    ///
    /// If every weight is zero, each peer is treated as weight 1.
    pub fn new<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        let mut peers: Vec<Peer> = nodes
            .into_iter()
            .filter(|n| n.is_online())
            .map(|n| Peer {
                summary: n.summary(),
                weight: i64::from(n.weight),
                current: 0,
            })
            .collect();

        let mut total_weight: i64 = peers.iter().map(|p| p.weight).sum();
        if total_weight == 0 && !peers.is_empty() {
            debug!(peers = peers.len(), "all weights are zero, treating each as 1");
            for peer in peers.iter_mut() {
                peer.weight = 1;
            }
            total_weight = peers.len() as i64;
        }

        debug!(peers = peers.len(), total_weight, "weighted round robin built");
        Self { peers, total_weight }
    }

    /// Pick the next peer.
    pub fn select(&mut self) -> Result<NodeSummary> {
        let mut best: Option<usize> = None;
        let mut max = i64::MIN;
        for (idx, peer) in self.peers.iter_mut().enumerate() {
            peer.current += peer.weight;
            // strict: the earliest peer keeps ties
            if best.is_none() || peer.current > max {
                max = peer.current;
                best = Some(idx);
            }
        }

        let idx = best.ok_or(Error::NoAvailableNodes)?;
        let peer = &mut self.peers[idx];
        peer.current -= self.total_weight;
        trace!(node = %peer.summary.id, current = peer.current, "peer selected");
        Ok(peer.summary.clone())
    }

    /// Zero every counter, as if freshly built from the same nodes.
    pub fn reset(&mut self) {
        for peer in self.peers.iter_mut() {
            peer.current = 0;
        }
    }

    pub fn total_weight(&self) -> i64 {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Effective weights in peer order, after the zero-weight fallback.
    pub fn weights(&self) -> Vec<(NodeSummary, i64)> {
        self.peers.iter().map(|p| (p.summary.clone(), p.weight)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rr: &mut WeightedRoundRobin, n: usize) -> Vec<String> {
        (0..n).map(|_| rr.select().unwrap().name).collect()
    }

    #[test]
    fn test_equal_weights_alternate() {
        let nodes = [Node::new("a", "a"), Node::new("b", "b"), Node::new("c", "c")];
        let mut rr = WeightedRoundRobin::new(&nodes);
        assert_eq!(names(&mut rr, 6), vec!["a", "b", "c", "a", "b", "c"]);
    }

    #[test]
    fn test_three_to_one() {
        let nodes = [Node::new("a", "a").with_weight(3), Node::new("b", "b")];
        let mut rr = WeightedRoundRobin::new(&nodes);
        assert_eq!(names(&mut rr, 8), vec!["a", "a", "b", "a", "a", "a", "b", "a"]);
    }

    #[test]
    fn test_zero_weights_fall_back_to_one() {
        let nodes = [
            Node::new("a", "a").with_weight(0),
            Node::new("b", "b").with_weight(0),
        ];
        let mut rr = WeightedRoundRobin::new(&nodes);
        assert_eq!(rr.total_weight(), 2);
        assert!(rr.weights().iter().all(|(_, w)| *w == 1));
        assert_eq!(names(&mut rr, 4), vec!["a", "b", "a", "b"]);
    }

    #[test]
    fn test_zero_weight_beside_positive_is_never_picked() {
        let nodes = [Node::new("a", "a").with_weight(0), Node::new("b", "b").with_weight(2)];
        let mut rr = WeightedRoundRobin::new(&nodes);
        assert_eq!(rr.total_weight(), 2);
        assert!(names(&mut rr, 20).iter().all(|n| n == "b"));
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let nodes = [Node::new("a", "a").with_weight(2), Node::new("b", "b")];
        let mut rr = WeightedRoundRobin::new(&nodes);
        let first = names(&mut rr, 2);
        rr.reset();
        assert_eq!(names(&mut rr, 2), first);
    }

    #[test]
    fn test_empty_selector_fails() {
        let none: [Node; 0] = [];
        let mut rr = WeightedRoundRobin::new(&none);
        assert!(rr.is_empty());
        assert_eq!(rr.total_weight(), 0);
        assert_eq!(rr.select(), Err(Error::NoAvailableNodes));
    }
}
