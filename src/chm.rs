//! CHM: per-vertex labels modulo n, `h(k) = (Σ g[hash_s(k) mod v]) mod n`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::MphError;
use crate::graph::Hypergraph;
use crate::hash::{KeyHasher, MAX_HASH_SIZE, Xxh3Hasher};
use crate::peel::OutputOrder;
use crate::util::BitSet;

/// Label every vertex so that the edge at position `p` of `order` sums to `p` mod n.
pub fn assign<const R: usize>(graph: &Hypergraph<R>, order: &OutputOrder) -> Vec<u32> {
    let n = graph.edge_count() as u64;
    let mut g = vec![0u32; graph.vertex_count()];
    let mut visited = BitSet::new(graph.vertex_count());

    for (p, &e) in order.as_slice().iter().enumerate() {
        let vertices = graph.edge(e).vertices;
        let pivot = vertices
            .iter()
            .position(|&x| !visited.test(x as usize))
            .expect("peeling order leaves a free vertex on every edge");
        let others: u64 = vertices
            .iter()
            .enumerate()
            .filter(|&(side, _)| side != pivot)
            .map(|(_, &x)| u64::from(g[x as usize]))
            .sum();
        g[vertices[pivot] as usize] = ((p as u64 + n - others % n) % n) as u32;
        for x in vertices {
            visited.set(x as usize);
        }
    }
    g
}

/// CHM minimal perfect hash over an r-uniform hypergraph (r = 2 or 3).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Chm<H = Xxh3Hasher> {
    pub n: u32,          // number of keys
    pub v: u32,          // graph vertices
    pub r: u8,           // hash values summed per key
    pub hash_size: u8,   // width requested from the hasher
    pub seed: u32,       // seed of the successful attempt
    pub g: Vec<u32>,     // length == v, values in [0..n)
    /// `result_map[i]` is the input position of the key hashing to `i`.
    pub result_map: Vec<u32>,
    pub hasher: H,
}

impl<H: KeyHasher> Chm<H> {
    pub(crate) fn from_parts<const R: usize>(
        graph: &Hypergraph<R>,
        order: OutputOrder,
        seed: u32,
        hash_size: usize,
        hasher: H,
    ) -> Self {
        let g = assign(graph, &order);
        Self {
            n: graph.edge_count() as u32,
            v: graph.vertex_count() as u32,
            r: R as u8,
            hash_size: hash_size as u8,
            seed,
            g,
            result_map: order.into_inner(),
            hasher,
        }
    }

    #[inline]
    pub fn index(&self, key: &[u8]) -> u64 {
        let mut buf = [0u32; MAX_HASH_SIZE];
        let hashes = &mut buf[..self.hash_size as usize];
        self.hasher.hash(self.seed, key, hashes);
        let sum: u64 = hashes[..self.r as usize]
            .iter()
            .map(|&h| u64::from(self.g[(h % self.v) as usize]))
            .sum();
        sum % u64::from(self.n)
    }

    #[inline]
    pub fn index_str(&self, s: &str) -> u64 {
        self.index(s.as_bytes())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n as usize
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}

#[cfg(feature = "serde")]
impl<H: KeyHasher + Serialize + serde::de::DeserializeOwned> Chm<H> {
    pub fn to_bytes(&self) -> Result<Vec<u8>, MphError> {
        Ok(bincode::serialize(self)?)
    }
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MphError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
