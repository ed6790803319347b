//! Closed set of selection strategies behind one `select` call.

use crate::error::{Error, Result};
use crate::node::NodeSummary;
use crate::pool::{NodePool, PoolEvent};
use crate::ring::{HashRing, RingBuilder};
use crate::wrr::WeightedRoundRobin;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use tracing::debug;

/// Selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "wrr")]
    WeightedRoundRobin,
    #[serde(rename = "ch")]
    ConsistentHash,
}

impl Algorithm {
    /// Long name used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::WeightedRoundRobin => "Weighted Round Robin",
            Algorithm::ConsistentHash => "Consistent Hashing",
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wrr" | "roundrobin" | "weighted-round-robin" => Ok(Algorithm::WeightedRoundRobin),
            "ch" | "hash" | "consistent-hash" => Ok(Algorithm::ConsistentHash),
            _ => Err(Error::UnknownAlgorithm(s.to_owned())),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::WeightedRoundRobin => write!(f, "wrr"),
            Algorithm::ConsistentHash => write!(f, "ch"),
        }
    }
}

/// The active selector.
///
/// Owned by whoever owns the pool; rebuilt or patched through
/// [`apply`](Self::apply) after each pool mutation.
#[derive(Debug, Clone)]
pub enum Selector {
    WeightedRoundRobin(WeightedRoundRobin),
    ConsistentHash(HashRing),
}

impl Selector {
    /// Build a selector over the pool's online nodes.
    pub fn build(algorithm: Algorithm, pool: &NodePool) -> Self {
        match algorithm {
            Algorithm::WeightedRoundRobin => {
                Self::WeightedRoundRobin(WeightedRoundRobin::new(pool.online()))
            }
            Algorithm::ConsistentHash => Self::ConsistentHash(HashRing::new(pool.online())),
        }
    }

    /// Consistent hash selector with a custom ring configuration.
    pub fn with_ring(builder: RingBuilder, pool: &NodePool) -> Self {
        Self::ConsistentHash(builder.add_nodes(pool.online()).build())
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Selector::WeightedRoundRobin(_) => Algorithm::WeightedRoundRobin,
            Selector::ConsistentHash(_) => Algorithm::ConsistentHash,
        }
    }

    /// Number of selectable nodes (ring entries for consistent hashing).
    pub fn len(&self) -> usize {
        match self {
            Selector::WeightedRoundRobin(rr) => rr.len(),
            Selector::ConsistentHash(ring) => ring.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pick a node for a request. Round robin ignores `key`.
    pub fn select(&mut self, key: &str) -> Result<NodeSummary> {
        match self {
            Selector::WeightedRoundRobin(rr) => rr.select(),
            Selector::ConsistentHash(ring) => ring.try_select(key),
        }
    }

    /// Bring the selector in line with the pool after `event`.
    ///
    /// The ring is patched in place when a single node joins or leaves;
    /// every other change rebuilds from the pool's online nodes.
    pub fn apply(&mut self, event: &PoolEvent, pool: &NodePool) {
        match self {
            Selector::ConsistentHash(ring) => match event {
                PoolEvent::Added(node) => {
                    if node.is_online() {
                        ring.add_node(node);
                    }
                }
                PoolEvent::Removed(node) => {
                    ring.remove_node(&node.id);
                }
                _ => ring.rebuild(pool.online()),
            },
            Selector::WeightedRoundRobin(rr) => {
                *rr = WeightedRoundRobin::new(pool.online());
                debug!(?event, "round robin rebuilt");
            }
        }
    }
}
