#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed-size bit vector over 64-bit words.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    bits: Vec<u64>,
    n: usize,
}

impl BitSet {
    pub fn new(n: usize) -> Self {
        let words = n.div_ceil(64);
        Self { bits: vec![0; words], n }
    }
    #[inline]
    pub fn test(&self, idx: usize) -> bool {
        debug_assert!(idx < self.n);
        let (w, b) = (idx / 64, idx % 64);
        (self.bits[w] >> b) & 1 == 1
    }
    #[inline]
    pub fn set(&mut self, idx: usize) {
        debug_assert!(idx < self.n);
        let (w, b) = (idx / 64, idx % 64);
        self.bits[w] |= 1u64 << b;
    }
    /// Set bits strictly below `idx` within `idx`'s own word.
    #[inline]
    pub fn count_in_word_below(&self, idx: usize) -> u32 {
        let (w, b) = (idx / 64, idx % 64);
        let mask = (1u64 << b) - 1;
        (self.bits[w] & mask).count_ones()
    }
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.bits
    }
}
