//! Node abstractions shared by the pool and both selectors.
//!
//! Nodes are identified by an opaque string `NodeId`. Selectors never hand
//! out a `Node` itself, only the `NodeSummary` describing it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a node in the pool.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap any string as a node id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Whether a node takes part in selection.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Online,
    Offline,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Online => write!(f, "online"),
            NodeStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Backend node held by the pool.
///
/// Only the pool mutates a node; selectors copy what they need when they
/// are built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique within a pool.
    pub id: NodeId,
    /// Human-readable name shown in logs.
    pub name: String,
    /// Relative share of round robin traffic; also scales capacity.
    pub weight: u32,
    pub status: NodeStatus,
}

impl Node {
    /// Construct an online node with weight 1.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight: 1,
            status: NodeStatus::Online,
        }
    }

    /// Set the weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Set the status.
    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the node takes part in selection.
    #[inline]
    pub fn is_online(&self) -> bool {
        self.status == NodeStatus::Online
    }

    /// Public identity handed out by selectors.
    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            weight: self.weight,
        }
    }
}

/// Public identity of a selected node: `{id, name, weight}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: NodeId,
    pub name: String,
    pub weight: u32,
}

impl fmt::Display for NodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, w={})", self.name, self.id, self.weight)
    }
}
