//! Multiplicative string hash partitioner (the default).

use crate::partitioner::traits::Partitioner;

/// `h = h * 31 + unit` over UTF-16 code units, wrapping at 32 bits.
///
/// Cheap and stable, but clusters similar keys ("user-1", "user-2", ...)
/// into neighbouring slots. Use [`Xxh3Partitioner`] for a better spread.
///
/// [`Xxh3Partitioner`]: crate::partitioner::Xxh3Partitioner
#[derive(Clone, Copy, Debug, Default)]
pub struct StringHashPartitioner;

impl Partitioner for StringHashPartitioner {
    fn hash(&self, key: &str) -> i32 {
        key.encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
    }

    fn name(&self) -> &'static str {
        "StringHashPartitioner"
    }
}
