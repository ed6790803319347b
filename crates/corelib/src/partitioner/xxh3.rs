//! XXH3 partitioner implementation.

use crate::partitioner::traits::Partitioner;
use xxhash_rust::xxh3::xxh3_64;

/// XXH3-64 over the UTF-8 bytes of the key, truncated to 32 bits.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3Partitioner;

impl Partitioner for Xxh3Partitioner {
    fn hash(&self, key: &str) -> i32 {
        xxh3_64(key.as_bytes()) as u32 as i32
    }

    fn name(&self) -> &'static str {
        "Xxh3Partitioner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_and_in_range() {
        let p = Xxh3Partitioner;
        for i in 0..100 {
            let key = format!("user-{}", i);
            let pos = p.position(&key, 360);
            assert!(pos < 360);
            assert_eq!(pos, p.position(&key, 360));
        }
        assert_ne!(p.hash("ab"), p.hash("ba"));
    }
}
