//! Error types for the core library.

use crate::node::NodeId;
use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing the pool or selecting nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The selector has no online node to hand out.
    #[error("No online servers available.")]
    NoAvailableNodes,
    /// A weight that is not a non-negative integer.
    #[error("invalid weight: {0}")]
    InvalidWeight(String),
    /// A node with this id is already in the pool.
    #[error("node {0} is already in the pool")]
    DuplicateNode(NodeId),
    /// No node with this id is in the pool.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    /// Algorithm name that does not match any selector.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}
