//! Hash ring data structure and its builder.

use crate::error::{Error, Result};
use crate::node::{Node, NodeId, NodeSummary};
use crate::partitioner::{Partitioner, StringHashPartitioner};
use crate::ring::position::RingEntry;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Number of slots on the ring unless a builder says otherwise.
pub const DEFAULT_RING_SIZE: u32 = 360;

/// Consistent hash selector.
///
/// Each node occupies exactly one position, `partition(id) mod ring_size`,
/// regardless of its weight. Entries are kept sorted by position after every
/// mutation, so lookups are a binary search.
///
/// Lookups only need `&self`, so a ring can be read from many threads at
/// once; [`add_node`](Self::add_node) and [`remove_node`](Self::remove_node)
/// need exclusive access.
#[derive(Clone)]
pub struct HashRing {
    entries: Vec<RingEntry>,
    ring_size: u32,
    partitioner: Arc<dyn Partitioner>,
}

impl HashRing {
    /// Build a ring over the online nodes using the default partitioner.
    pub fn new<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        RingBuilder::new().add_nodes(nodes).build()
    }

    /// Empty ring with the default partitioner and size.
    pub fn empty() -> Self {
        RingBuilder::new().build()
    }

    /// Place a node on the ring.
    ///
    /// The entry goes after any existing entries at the same position. The
    /// node's status is not checked; callers add online nodes only.
    pub fn add_node(&mut self, node: &Node) {
        let position = self.partitioner.position(node.id.as_str(), self.ring_size);
        let idx = self.entries.partition_point(|e| e.position <= position);
        self.entries.insert(idx, RingEntry::new(node, position));
        debug!(node = %node.id, position, entries = self.entries.len(), "node added to ring");
    }

    /// Remove every entry belonging to `id`. Returns whether anything was removed.
    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            debug!(node = %id, entries = self.entries.len(), "node removed from ring");
        }
        removed
    }

    /// Replace every entry with the online nodes given, keeping this ring's
    /// partitioner and size.
    pub fn rebuild<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Node>) {
        self.entries.clear();
        for node in nodes.into_iter().filter(|n| n.is_online()) {
            self.add_node(node);
        }
    }

    /// Node responsible for `key`: the first entry whose position is at or
    /// after the key's position, wrapping to the smallest position.
    ///
    /// Returns `None` only when the ring is empty.
    pub fn select(&self, key: &str) -> Option<NodeSummary> {
        let entry = self.lookup(key)?;
        trace!(key, node = %entry.id, position = entry.position, "key routed");
        Some(entry.summary())
    }

    /// Like [`select`](Self::select), but an empty ring is an error.
    pub fn try_select(&self, key: &str) -> Result<NodeSummary> {
        self.select(key).ok_or(Error::NoAvailableNodes)
    }

    /// Ring entry responsible for `key`.
    pub fn lookup(&self, key: &str) -> Option<&RingEntry> {
        let position = self.position_of(key);
        let idx = self.entries.partition_point(|e| e.position < position);
        self.entries.get(idx).or_else(|| self.entries.first())
    }

    /// Position a key (or node id) hashes to on this ring.
    pub fn position_of(&self, key: &str) -> u32 {
        self.partitioner.position(key, self.ring_size)
    }

    /// Entries sorted by position.
    pub fn entries(&self) -> &[RingEntry] {
        &self.entries
    }

    /// Entry that takes over a node's keys if it leaves: the next entry
    /// clockwise that belongs to a different node.
    pub fn successor_of(&self, id: &NodeId) -> Option<&RingEntry> {
        let start = self.entries.iter().position(|e| &e.id == id)?;
        (1..self.entries.len())
            .map(|step| &self.entries[(start + step) % self.entries.len()])
            .find(|e| &e.id != id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ring_size(&self) -> u32 {
        self.ring_size
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("entries", &self.entries)
            .field("ring_size", &self.ring_size)
            .field("partitioner", &self.partitioner.name())
            .finish()
    }
}

/// Builder for a [`HashRing`] with a custom partitioner or ring size.
///
/// ```rust
/// use dispatch_core::node::Node;
/// use dispatch_core::partitioner::Xxh3Partitioner;
/// use dispatch_core::ring::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .ring_size(1024)
///     .partitioner(Xxh3Partitioner)
///     .add_node(&Node::new("a", "Alpha"))
///     .build();
/// assert!(ring.select("user-1").is_some());
/// ```
pub struct RingBuilder {
    ring_size: u32,
    partitioner: Arc<dyn Partitioner>,
    nodes: Vec<Node>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self {
            ring_size: DEFAULT_RING_SIZE,
            partitioner: Arc::new(StringHashPartitioner),
            nodes: Vec::new(),
        }
    }

    /// Number of ring slots. Values below 1 are raised to 1.
    pub fn ring_size(mut self, ring_size: u32) -> Self {
        self.ring_size = ring_size.max(1);
        self
    }

    pub fn partitioner<P: Partitioner>(mut self, partitioner: P) -> Self {
        self.partitioner = Arc::new(partitioner);
        self
    }

    pub fn shared_partitioner(mut self, partitioner: Arc<dyn Partitioner>) -> Self {
        self.partitioner = partitioner;
        self
    }

    /// Queue a node for placement. Offline nodes are skipped.
    pub fn add_node(mut self, node: &Node) -> Self {
        if node.is_online() {
            self.nodes.push(node.clone());
        }
        self
    }

    pub fn add_nodes<'a>(self, nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        nodes.into_iter().fold(self, |builder, node| builder.add_node(node))
    }

    pub fn build(self) -> HashRing {
        let mut ring = HashRing {
            entries: Vec::with_capacity(self.nodes.len()),
            ring_size: self.ring_size,
            partitioner: self.partitioner,
        };
        for node in &self.nodes {
            ring.add_node(node);
        }
        ring
    }
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self::new()
    }
}
