#![allow(dead_code)]

use ahash::AHashSet;
use hypergraph_mph::KeyHasher;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n` distinct printable keys of varying length.
pub fn random_keys(n: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = AHashSet::with_capacity(n);
    let mut keys = Vec::with_capacity(n);
    while keys.len() < n {
        let len = rng.gen_range(1..24);
        let key: Vec<u8> = (0..len).map(|_| rng.gen_range(b'!'..=b'~')).collect();
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }
    keys
}

/// Fixed vertices per key, ignoring the seed: "a"-(0,1), "b"-(1,2), "c"-(2,3), "d"-(3,4).
pub struct PathHasher;

impl KeyHasher for PathHasher {
    fn hash(&self, _seed: u32, key: &[u8], out: &mut [u32]) {
        let base = u32::from(key[0] - b'a');
        for (i, h) in out.iter_mut().enumerate() {
            *h = base + i as u32;
        }
    }
}

/// Every hash value identical: every edge self-collides.
#[derive(Debug)]
pub struct CollidingHasher;

impl KeyHasher for CollidingHasher {
    fn hash(&self, _seed: u32, key: &[u8], out: &mut [u32]) {
        out.fill(key.len() as u32);
    }
}

/// "a"-(0,1), "b"-(1,2), "c"-(2,0): a triangle under every seed.
#[derive(Debug)]
pub struct TriangleHasher;

impl KeyHasher for TriangleHasher {
    fn hash(&self, _seed: u32, key: &[u8], out: &mut [u32]) {
        let base = u32::from(key[0] - b'a');
        for (i, h) in out.iter_mut().enumerate() {
            *h = (base + i as u32) % 3;
        }
    }
}

/// Self-collides for three seeds out of four, otherwise defers to `inner`.
pub struct FlakyHasher<H>(pub H);

impl<H: KeyHasher> KeyHasher for FlakyHasher<H> {
    fn hash(&self, seed: u32, key: &[u8], out: &mut [u32]) {
        if seed & 3 != 0 {
            out.fill(seed);
        } else {
            self.0.hash(seed, key, out);
        }
    }
}
