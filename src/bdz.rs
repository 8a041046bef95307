#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::MphError;
use crate::graph::Hypergraph;
use crate::hash::{KeyHasher, MAX_HASH_SIZE, Xxh3Hasher};
use crate::peel::OutputOrder;
use crate::util::BitSet;

/// Label of a vertex that is not responsible for any key.
pub const UNUSED: u8 = 3;

const BLOCK: usize = 64;
const SUPER_BLOCK: usize = 65536;

/// Result of the BDZ labelling pass.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// 2-bit label per vertex, [`UNUSED`] for holes.
    pub labels: Vec<u8>,
    /// Edge a vertex is responsible for; meaningful only where the label is not a hole.
    pub owner: Vec<u32>,
}

/// BDZ labelling over a 3-uniform hypergraph.
///
/// The first unvisited endpoint `x` of each edge (left, middle, right priority)
/// at side `s` gets `g[x] = (9 + s - g[o1] - g[o2]) % 3`, so the edge's labels sum
/// to `s` mod 3 and evaluation recovers which endpoint is responsible. Holes keep
/// label 3, which is 0 mod 3 and leaves every sum unchanged.
pub fn assign(graph: &Hypergraph<3>, order: &OutputOrder) -> Assignment {
    let v = graph.vertex_count();
    let mut labels = vec![UNUSED; v];
    let mut owner = vec![0u32; v];
    let mut visited = BitSet::new(v);

    for &e in order.as_slice() {
        let [a, b, c] = graph.edge(e).vertices;
        let (side, x, o1, o2) = if !visited.test(a as usize) {
            (0u8, a, b, c)
        } else if !visited.test(b as usize) {
            (1, b, a, c)
        } else if !visited.test(c as usize) {
            (2, c, a, b)
        } else {
            panic!("peeling order leaves a free vertex on every edge (edge {e} has none)");
        };
        labels[x as usize] = (9 + side - labels[o1 as usize] - labels[o2 as usize]) % 3;
        owner[x as usize] = e;
        visited.set(a as usize);
        visited.set(b as usize);
        visited.set(c as usize);
    }
    Assignment { labels, owner }
}

/// Two-level hole counts: per 65536-vertex block and, relative to that, per 64-vertex word.
///
/// `rank(idx) = idx - holes64k[idx / 65536] - holes64[idx / 64] - popcount(holes below idx in its word)`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankIndex {
    pub holes64k: Vec<u32>,
    pub holes64: Vec<u16>,
    holes: BitSet,
}

impl RankIndex {
    pub fn build(labels: &[u8]) -> Self {
        let v = labels.len();
        let mut holes = BitSet::new(v);
        let mut holes64k = Vec::with_capacity(v / SUPER_BLOCK + 1);
        let mut holes64 = Vec::with_capacity(v / BLOCK + 1);
        let (mut total, mut block_base) = (0u32, 0u32);

        for (i, &g) in labels.iter().enumerate() {
            if i % SUPER_BLOCK == 0 {
                holes64k.push(total);
                block_base = total;
            }
            if i % BLOCK == 0 {
                holes64.push((total - block_base) as u16);
            }
            if g == UNUSED {
                holes.set(i);
                total += 1;
            }
        }
        Self {
            holes64k,
            holes64,
            holes,
        }
    }

    /// Hole vertices with index `< idx`.
    #[inline]
    pub fn holes_before(&self, idx: usize) -> usize {
        self.holes64k[idx / SUPER_BLOCK] as usize
            + self.holes64[idx / BLOCK] as usize
            + self.holes.count_in_word_below(idx) as usize
    }

    /// Compacted position of the non-hole vertex `idx`.
    #[inline]
    pub fn rank(&self, idx: usize) -> usize {
        idx - self.holes_before(idx)
    }

    #[inline]
    pub fn is_hole(&self, idx: usize) -> bool {
        self.holes.test(idx)
    }

    /// Hole bitmap, one bit per vertex.
    #[inline]
    pub fn hole_words(&self) -> &[u64] {
        self.holes.words()
    }
}

/// BDZ minimal perfect hash: 2 bits per vertex plus a rank index.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Bdz<H = Xxh3Hasher> {
    pub n: u32,
    pub v: u32,
    pub hash_size: u8,
    pub seed: u32,
    pub labels: Vec<u8>,
    pub rank: RankIndex,
    /// `result_map[i]` is the input position of the key hashing to `i`.
    pub result_map: Vec<u32>,
    pub hasher: H,
}

impl<H: KeyHasher> Bdz<H> {
    pub(crate) fn from_parts(
        graph: &Hypergraph<3>,
        order: &OutputOrder,
        seed: u32,
        hash_size: usize,
        hasher: H,
    ) -> Self {
        let Assignment { labels, owner } = assign(graph, order);
        let rank = RankIndex::build(&labels);
        let result_map = labels
            .iter()
            .zip(&owner)
            .filter(|&(&g, _)| g != UNUSED)
            .map(|(_, &e)| e)
            .collect();
        Self {
            n: graph.edge_count() as u32,
            v: graph.vertex_count() as u32,
            hash_size: hash_size as u8,
            seed,
            labels,
            rank,
            result_map,
            hasher,
        }
    }

    #[inline]
    pub fn index(&self, key: &[u8]) -> u64 {
        let mut buf = [0u32; MAX_HASH_SIZE];
        let hashes = &mut buf[..self.hash_size as usize];
        self.hasher.hash(self.seed, key, hashes);
        let vs = [hashes[0] % self.v, hashes[1] % self.v, hashes[2] % self.v];
        let (mut low, mut high) = (0u32, 0u32);
        for x in vs {
            let g = u32::from(self.labels[x as usize]);
            low += g & 1;
            high += g >> 1;
        }
        let side = ((9 + low - high) % 3) as usize;
        self.rank.rank(vs[side] as usize) as u64
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

    /// Split the labels into low-bit (`g1`) and high-bit (`g2`) bitmaps, 64 vertices per word.
    /// Holes have both bits set.
    pub fn packed_labels(&self) -> (Vec<u64>, Vec<u64>) {
        let words = self.labels.len().div_ceil(64);
        let (mut g1, mut g2) = (vec![0u64; words], vec![0u64; words]);
        for (i, &g) in self.labels.iter().enumerate() {
            g1[i / 64] |= u64::from(g & 1) << (i % 64);
            g2[i / 64] |= u64::from(g >> 1) << (i % 64);
        }
        (g1, g2)
    }
}

#[cfg(feature = "serde")]
impl<H: KeyHasher + Serialize + serde::de::DeserializeOwned> Bdz<H> {
    pub fn to_bytes(&self) -> Result<Vec<u8>, MphError> {
        Ok(bincode::serialize(self)?)
    }
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MphError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responsible(labels: &[u8], vs: [u32; 3]) -> u32 {
        let sum: u32 = vs.iter().map(|&x| u32::from(labels[x as usize])).sum();
        vs[(sum % 3) as usize]
    }

    #[test]
    fn each_edge_gets_its_own_vertex() {
        let edges = [[0, 1, 2], [2, 3, 4], [4, 5, 6], [6, 7, 0], [8, 9, 1]];
        let mut graph = Hypergraph::<3>::from_edges(10, &edges).unwrap();
        let order = graph.peel().unwrap();
        let Assignment { labels, owner } = assign(&graph, &order);

        let mut picked: Vec<u32> = edges.iter().map(|&vs| responsible(&labels, vs)).collect();
        for (e, &x) in picked.iter().enumerate() {
            assert_ne!(labels[x as usize], UNUSED);
            assert_eq!(owner[x as usize], e as u32);
        }
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), edges.len());
        assert_eq!(labels.iter().filter(|&&g| g != UNUSED).count(), edges.len());
    }

    #[test]
    #[should_panic(expected = "free vertex")]
    fn order_from_another_graph_is_rejected() {
        let mut tree = Hypergraph::<3>::from_edges(6, &[[0, 1, 2], [2, 3, 4], [4, 5, 0]]).unwrap();
        let order = tree.peel().unwrap();
        let twins = Hypergraph::<3>::from_edges(6, &[[0, 1, 2], [0, 1, 2], [3, 4, 5]]).unwrap();
        assign(&twins, &order);
    }

    #[test]
    fn rank_matches_naive_count() {
        let v = 2 * SUPER_BLOCK + 1000;
        let labels: Vec<u8> = (0..v)
            .map(|i| if (i * 7 + i / 13) % 5 < 2 { UNUSED } else { (i % 3) as u8 })
            .collect();
        let rank = RankIndex::build(&labels);
        assert_eq!(rank.holes64k.len(), 3);
        assert_eq!(rank.holes64.len(), v.div_ceil(64));

        let mut holes = 0usize;
        for (i, &g) in labels.iter().enumerate() {
            assert_eq!(rank.holes_before(i), holes, "vertex {i}");
            assert_eq!(rank.is_hole(i), g == UNUSED);
            if g == UNUSED {
                holes += 1;
            } else {
                assert_eq!(rank.rank(i), i - rank.holes_before(i));
            }
        }
    }

    #[test]
    fn packed_labels_split_bits() {
        let bdz = Bdz {
            n: 2,
            v: 4,
            hash_size: 3,
            seed: 0,
            labels: vec![0, 1, 2, UNUSED],
            rank: RankIndex::build(&[0, 1, 2, UNUSED]),
            result_map: vec![],
            hasher: Xxh3Hasher,
        };
        let (g1, g2) = bdz.packed_labels();
        assert_eq!(g1, vec![0b1010]);
        assert_eq!(g2, vec![0b1100]);
    }
}
