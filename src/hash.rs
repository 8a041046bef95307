#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_128_with_seed;

/// Upper bound on the hash vector width, so lookups can hash into a stack buffer.
pub const MAX_HASH_SIZE: usize = 8;

/// Seeded hash family feeding the hypergraph: one key and one seed give `out.len()`
/// pseudo-random 32-bit values.
///
/// Implementations must be deterministic for a given `(seed, key)` and behave
/// independently across seeds, otherwise retries cannot escape a bad graph.
pub trait KeyHasher: Send + Sync {
    fn hash(&self, seed: u32, key: &[u8], out: &mut [u32]);
}

impl<T: KeyHasher + ?Sized> KeyHasher for &T {
    #[inline]
    fn hash(&self, seed: u32, key: &[u8], out: &mut [u32]) {
        (**self).hash(seed, key, out)
    }
}

/// xxh3-128, four words per call; wider vectors rehash with a derived seed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xxh3Hasher;

impl KeyHasher for Xxh3Hasher {
    #[inline]
    fn hash(&self, seed: u32, key: &[u8], out: &mut [u32]) {
        for (round, chunk) in out.chunks_mut(4).enumerate() {
            let s = (u64::from(seed) ^ 0x9E37_79B9_7F4A_7C15)
                .wrapping_add((round as u64).wrapping_mul(0xA24B_1F6F));
            let h = xxh3_128_with_seed(key, s);
            for (i, word) in chunk.iter_mut().enumerate() {
                *word = (h >> (32 * i)) as u32;
            }
        }
    }
}

/// One wyhash pass, expanded with splitmix64 into as many words as requested.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WyHasher;

impl KeyHasher for WyHasher {
    #[inline]
    fn hash(&self, seed: u32, key: &[u8], out: &mut [u32]) {
        let base = wyhash::wyhash(key, u64::from(seed));
        for (round, pair) in out.chunks_mut(2).enumerate() {
            let x = splitmix64(base ^ (round as u64).wrapping_mul(0x853C_49E6_0A6C_9D39));
            pair[0] = x as u32;
            if let Some(hi) = pair.get_mut(1) {
                *hi = (x >> 32) as u32;
            }
        }
    }
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words<H: KeyHasher>(h: &H, seed: u32, key: &[u8], len: usize) -> Vec<u32> {
        let mut out = vec![0u32; len];
        h.hash(seed, key, &mut out);
        out
    }

    #[test]
    fn deterministic_per_seed() {
        for len in [2, 3, 5, MAX_HASH_SIZE] {
            assert_eq!(words(&Xxh3Hasher, 7, b"key", len), words(&Xxh3Hasher, 7, b"key", len));
            assert_eq!(words(&WyHasher, 7, b"key", len), words(&WyHasher, 7, b"key", len));
        }
    }

    #[test]
    fn seed_changes_output() {
        assert_ne!(words(&Xxh3Hasher, 1, b"key", 3), words(&Xxh3Hasher, 2, b"key", 3));
        assert_ne!(words(&WyHasher, 1, b"key", 3), words(&WyHasher, 2, b"key", 3));
    }

    #[test]
    fn wide_vectors_do_not_repeat_rounds() {
        let w = words(&Xxh3Hasher, 11, b"abc", 8);
        assert_ne!(w[..4], w[4..]);
        let w = words(&WyHasher, 11, b"abc", 4);
        assert_ne!(w[..2], w[2..]);
    }
}
