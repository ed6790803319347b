//! Property tests for both selectors.

use dispatch_core::node::{Node, NodeId};
use dispatch_core::ring::HashRing;
use dispatch_core::wrr::WeightedRoundRobin;
use proptest::prelude::*;
use std::collections::HashMap;

fn weighted_nodes(weights: &[u32]) -> Vec<Node> {
    weights
        .iter()
        .enumerate()
        .map(|(i, w)| Node::new(format!("node-{}", i), format!("node-{}", i)).with_weight(*w))
        .collect()
}

proptest! {
    #[test]
    fn wrr_window_matches_weights(weights in prop::collection::vec(1u32..20, 1..8), windows in 1usize..4) {
        let nodes = weighted_nodes(&weights);
        let mut rr = WeightedRoundRobin::new(&nodes);
        let total = rr.total_weight() as usize;

        for _ in 0..windows {
            let mut counts: HashMap<NodeId, u32> = HashMap::new();
            for _ in 0..total {
                *counts.entry(rr.select().unwrap().id).or_default() += 1;
            }
            for node in &nodes {
                prop_assert_eq!(counts.get(&node.id).copied().unwrap_or(0), node.weight);
            }
        }
    }

    #[test]
    fn wrr_is_deterministic(weights in prop::collection::vec(0u32..10, 1..8)) {
        let nodes = weighted_nodes(&weights);
        let mut a = WeightedRoundRobin::new(&nodes);
        let mut b = WeightedRoundRobin::new(&nodes);
        for _ in 0..64 {
            prop_assert_eq!(a.select().unwrap(), b.select().unwrap());
        }
    }

    #[test]
    fn ring_lookup_is_deterministic(ids in prop::collection::hash_set("[a-z]{1,8}", 1..10), key in ".*") {
        let nodes: Vec<Node> = ids.iter().map(|id| Node::new(id.as_str(), id.as_str())).collect();
        let ring = HashRing::new(&nodes);
        let first = ring.select(&key);
        prop_assert!(first.is_some());
        prop_assert_eq!(ring.select(&key), first);
    }

    #[test]
    fn ring_removal_is_minimally_disruptive(
        ids in prop::collection::hash_set("[a-z0-9-]{1,10}", 2..10),
        keys in prop::collection::vec("[a-z0-9-]{0,12}", 1..60),
        pick in any::<prop::sample::Index>(),
    ) {
        let nodes: Vec<Node> = ids.iter().map(|id| Node::new(id.as_str(), id.as_str())).collect();
        let mut ring = HashRing::new(&nodes);
        let removed = nodes[pick.index(nodes.len())].id.clone();
        let successor = ring.successor_of(&removed).map(|e| e.id.clone());

        let before: Vec<NodeId> = keys.iter().map(|k| ring.select(k).unwrap().id).collect();
        ring.remove_node(&removed);
        let after: Vec<NodeId> = keys.iter().map(|k| ring.select(k).unwrap().id).collect();

        for (old, new) in before.iter().zip(&after) {
            if old == &removed {
                prop_assert_eq!(Some(new), successor.as_ref());
            } else {
                prop_assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn ring_stays_sorted(ids in prop::collection::vec("[a-zA-Z0-9]{0,12}", 0..30)) {
        let mut ring = HashRing::empty();
        for id in &ids {
            ring.add_node(&Node::new(id.as_str(), id.as_str()));
            prop_assert!(ring.entries().windows(2).all(|w| w[0].position <= w[1].position));
        }
        prop_assert_eq!(ring.len(), ids.len());
    }
}
