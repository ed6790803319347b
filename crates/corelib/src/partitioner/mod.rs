//! Partitioner abstraction for the hash ring.
//!
//! Partitioners map node ids and request keys onto ring positions.

pub mod string_hash;
pub mod traits;
pub mod xxh3;

pub use string_hash::StringHashPartitioner;
pub use traits::Partitioner;
pub use xxh3::Xxh3Partitioner;
