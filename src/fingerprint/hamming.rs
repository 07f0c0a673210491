use super::HashBits;
use crate::error::Result;

/// Number of differing bit positions between two hashes
#[inline]
pub fn hamming_distance(a: HashBits, b: HashBits) -> u32 {
    (a.bits() ^ b.bits()).count_ones()
}

/// Hamming distance over textual hashes (bit-string or hex).
///
/// Both operands are parsed into [`HashBits`] first, so anything that does not encode exactly 64
/// bits is rejected instead of being compared up to the shorter length.
pub fn hamming_distance_str(a: &str, b: &str) -> Result<u32> {
    Ok(hamming_distance(a.parse()?, b.parse()?))
}
