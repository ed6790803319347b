//! Consistent hash ring implementation.
//!
//! The ring places every online node at a single position and routes a key
//! to the first node at or after the key's position, wrapping around.

pub mod position;
#[allow(clippy::module_inception)]
pub mod ring;

pub use position::RingEntry;
pub use ring::{HashRing, RingBuilder, DEFAULT_RING_SIZE};
