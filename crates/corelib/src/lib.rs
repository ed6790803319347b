//! Core library for request distribution over a pool of weighted nodes.
//!
//! This crate provides:
//! - Node and node pool abstractions
//! - Smooth weighted round robin selection
//! - Consistent hash ring selection with pluggable partitioners
//! - A closed `Selector` variant and a thread-shareable wrapper

pub mod error;
pub mod node;
pub mod partitioner;
pub mod pool;
pub mod ring;
pub mod selector;
pub mod shared;
pub mod wrr;

pub use error::{Error, Result};
pub use node::{Node, NodeId, NodeStatus, NodeSummary};
pub use partitioner::Partitioner;
pub use pool::{NodePool, PoolEvent};
pub use ring::{HashRing, RingBuilder};
pub use selector::{Algorithm, Selector};
pub use shared::SharedSelector;
pub use wrr::WeightedRoundRobin;
