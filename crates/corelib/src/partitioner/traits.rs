//! Core partitioner trait definitions.

/// A partitioner turns a string (node id or request key) into a position
/// on a ring of `ring_size` slots.
///
/// Partitioners are stateless and must be deterministic across runs and
/// platforms so ring layouts are reproducible.
pub trait Partitioner: Send + Sync + 'static {
    /// Signed 32-bit hash of the key. Must be sensitive to byte order.
    fn hash(&self, key: &str) -> i32;

    /// Position of `key` on a ring of `ring_size` slots: `|hash| mod ring_size`.
    ///
    /// # Panics
    ///
    /// Panics if `ring_size` is zero.
    fn position(&self, key: &str, ring_size: u32) -> u32 {
        reduce(self.hash(key), ring_size)
    }

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}

/// `|hash| mod ring_size`, where `|i32::MIN|` is taken as 2^31.
#[inline]
pub fn reduce(hash: i32, ring_size: u32) -> u32 {
    hash.unsigned_abs() % ring_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_handles_min() {
        assert_eq!(reduce(i32::MIN, 360), 128);
        assert_eq!(reduce(-725, 360), 5);
        assert_eq!(reduce(725, 360), 5);
        assert_eq!(reduce(0, 360), 0);
    }
}
