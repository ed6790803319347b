//! Ring entry: one node placed at one position.

use crate::node::{Node, NodeId, NodeSummary};
use std::fmt;

/// A node placed on the consistent hash ring.
///
/// Entries are ordered by `position` only; entries sharing a position keep
/// the order in which they were inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingEntry {
    pub id: NodeId,
    pub name: String,
    /// Carried for the summary only; placement ignores it.
    pub weight: u32,
    pub position: u32,
}

impl RingEntry {
    pub fn new(node: &Node, position: u32) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            weight: node.weight,
            position,
        }
    }

    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            weight: self.weight,
        }
    }
}

impl fmt::Display for RingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}° {} ({})", self.position, self.name, self.id)
    }
}
