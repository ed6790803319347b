//! The authoritative set of backend nodes.
//!
//! Every mutation returns a [`PoolEvent`] so whoever owns a selector can
//! bring it back in line with the pool (see [`Selector::apply`]).
//!
//! [`Selector::apply`]: crate::selector::Selector::apply

use crate::error::{Error, Result};
use crate::node::{Node, NodeId, NodeStatus};

/// Membership change produced by a pool mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolEvent {
    Added(Node),
    Removed(Node),
    WeightChanged { id: NodeId, old: u32, new: u32 },
    StatusChanged { id: NodeId, status: NodeStatus },
}

/// Nodes keyed by id, kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct NodePool {
    nodes: Vec<Node>,
}

impl NodePool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from a list of nodes, rejecting duplicate ids.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self> {
        let mut pool = Self::new();
        for node in nodes {
            pool.add(node)?;
        }
        Ok(pool)
    }

    /// Append a node; fails with `DuplicateNode` if the id is taken.
    pub fn add(&mut self, node: Node) -> Result<PoolEvent> {
        if self.contains(&node.id) {
            return Err(Error::DuplicateNode(node.id));
        }
        self.nodes.push(node.clone());
        Ok(PoolEvent::Added(node))
    }

    /// Remove a node by id, returning it inside the event.
    pub fn remove(&mut self, id: &NodeId) -> Result<PoolEvent> {
        let idx = self.index_of(id)?;
        Ok(PoolEvent::Removed(self.nodes.remove(idx)))
    }

    /// Replace a node's weight; the event carries the old and new values.
    pub fn set_weight(&mut self, id: &NodeId, weight: u32) -> Result<PoolEvent> {
        let idx = self.index_of(id)?;
        let old = std::mem::replace(&mut self.nodes[idx].weight, weight);
        Ok(PoolEvent::WeightChanged {
            id: id.clone(),
            old,
            new: weight,
        })
    }

    /// Mark a node online or offline.
    pub fn set_status(&mut self, id: &NodeId, status: NodeStatus) -> Result<PoolEvent> {
        let idx = self.index_of(id)?;
        self.nodes[idx].status = status;
        Ok(PoolEvent::StatusChanged {
            id: id.clone(),
            status,
        })
    }

    /// Node with this id, if present.
    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// First node carrying this display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Whether a node with this id is in the pool.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.get(id).is_some()
    }

    /// All nodes in insertion order, online or not.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Nodes eligible for selection, in pool order.
    pub fn online(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_online())
    }

    /// Number of nodes, offline ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the pool has no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn index_of(&self, id: &NodeId) -> Result<usize> {
        self.nodes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| Error::UnknownNode(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> NodePool {
        NodePool::from_nodes([
            Node::new("a", "Alpha").with_weight(3),
            Node::new("b", "Bravo"),
            Node::new("c", "Charlie").with_status(NodeStatus::Offline),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut pool = pool();
        let err = pool.add(Node::new("a", "Again")).unwrap_err();
        assert_eq!(err, Error::DuplicateNode(NodeId::from("a")));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_online_snapshot_skips_offline() {
        let pool = pool();
        let ids: Vec<&str> = pool.online().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_mutations_emit_events() {
        let mut pool = pool();

        let event = pool.set_weight(&NodeId::from("b"), 4).unwrap();
        assert_eq!(
            event,
            PoolEvent::WeightChanged {
                id: NodeId::from("b"),
                old: 1,
                new: 4
            }
        );
        assert_eq!(pool.get(&NodeId::from("b")).unwrap().weight, 4);

        let event = pool.set_status(&NodeId::from("c"), NodeStatus::Online).unwrap();
        assert!(matches!(event, PoolEvent::StatusChanged { status: NodeStatus::Online, .. }));
        assert_eq!(pool.online().count(), 3);

        match pool.remove(&NodeId::from("a")).unwrap() {
            PoolEvent::Removed(node) => assert_eq!(node.name, "Alpha"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(!pool.contains(&NodeId::from("a")));
    }

    #[test]
    fn test_unknown_node() {
        let mut pool = pool();
        let missing = NodeId::from("zz");
        assert_eq!(pool.remove(&missing), Err(Error::UnknownNode(missing.clone())));
        assert!(pool.set_weight(&missing, 2).is_err());
        assert!(pool.set_status(&missing, NodeStatus::Offline).is_err());
    }
}
