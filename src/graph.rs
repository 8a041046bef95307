//! Random r-uniform hypergraph with one edge per key.
//!
//! Vertices and edges live in two arenas addressed by `u32`. Every vertex keeps,
//! for each side (left/right, or left/middle/right), the head of a doubly linked
//! list threaded through the edges that occupy that side, so edges can be
//! inserted and detached in O(1).

use crate::error::AttemptError;
use crate::hash::{KeyHasher, MAX_HASH_SIZE};

/// Empty link / empty list head.
pub const NONE: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct Edge<const R: usize> {
    /// Vertex indices, one per side.
    pub vertices: [u32; R],
    prev: [u32; R],
    next: [u32; R],
    attached: bool,
}

#[derive(Debug, Clone)]
struct Vertex<const R: usize> {
    head: [u32; R],
    degree: u32,
}

#[derive(Debug, Clone)]
pub struct Hypergraph<const R: usize> {
    edges: Vec<Edge<R>>,
    verts: Vec<Vertex<R>>,
}

impl<const R: usize> Hypergraph<R> {
    /// Hash every key with `seed`, reduce the values modulo `v` and link the edges in.
    ///
    /// With `check_duplicates` set, identical keys are reported as
    /// [`AttemptError::DuplicateKey`] before any [`AttemptError::SelfCollision`],
    /// so a true duplicate never hides behind an unlucky seed.
    pub fn build<K, H>(
        keys: &[K],
        hasher: &H,
        hash_size: usize,
        seed: u32,
        v: u32,
        check_duplicates: bool,
    ) -> Result<Self, AttemptError>
    where
        K: AsRef<[u8]> + Sync,
        H: KeyHasher,
    {
        debug_assert!(R <= hash_size && hash_size <= MAX_HASH_SIZE);
        let vertices = edge_vertices::<K, H, R>(keys, hasher, hash_size, seed, v);

        let mut graph = Self::with_vertices(v, keys.len());
        let mut collision = None;
        for (e, vs) in vertices.into_iter().enumerate() {
            if collision.is_none() && !pairwise_distinct(&vs) {
                collision = Some(e as u32);
            }
            graph.push_edge(vs);
        }

        if check_duplicates {
            if let Some((first, second)) = graph.find_duplicate(keys) {
                return Err(AttemptError::DuplicateKey { first, second });
            }
        }
        match collision {
            Some(edge) => Err(AttemptError::SelfCollision { edge }),
            None => Ok(graph),
        }
    }

    /// Build from precomputed vertex tuples, rejecting tuples with repeated vertices.
    pub fn from_edges(v: u32, edges: &[[u32; R]]) -> Result<Self, AttemptError> {
        let mut graph = Self::with_vertices(v, edges.len());
        for (e, vs) in edges.iter().enumerate() {
            if !pairwise_distinct(vs) {
                return Err(AttemptError::SelfCollision { edge: e as u32 });
            }
            debug_assert!(vs.iter().all(|&x| x < v));
            graph.push_edge(*vs);
        }
        Ok(graph)
    }

    fn with_vertices(v: u32, n: usize) -> Self {
        Self {
            edges: Vec::with_capacity(n),
            verts: vec![
                Vertex {
                    head: [NONE; R],
                    degree: 0,
                };
                v as usize
            ],
        }
    }

    fn push_edge(&mut self, vertices: [u32; R]) {
        let e = self.edges.len() as u32;
        self.edges.push(Edge {
            vertices,
            prev: [NONE; R],
            next: [NONE; R],
            attached: false,
        });
        self.attach(e);
    }

    fn attach(&mut self, e: u32) {
        let vertices = self.edges[e as usize].vertices;
        for (side, &x) in vertices.iter().enumerate() {
            let vert = &mut self.verts[x as usize];
            let head = vert.head[side];
            vert.head[side] = e;
            vert.degree += 1;
            let edge = &mut self.edges[e as usize];
            edge.prev[side] = NONE;
            edge.next[side] = head;
            if head != NONE {
                self.edges[head as usize].prev[side] = e;
            }
        }
        self.edges[e as usize].attached = true;
    }

    /// Unlink `e` from the lists of all its vertices.
    /// Returns `false` (and changes nothing) if `e` was already detached.
    pub fn remove_edge(&mut self, e: u32) -> bool {
        let edge = &self.edges[e as usize];
        if !edge.attached {
            return false;
        }
        let (vertices, prev, next) = (edge.vertices, edge.prev, edge.next);
        for side in 0..R {
            let x = vertices[side] as usize;
            if prev[side] == NONE {
                self.verts[x].head[side] = next[side];
            } else {
                self.edges[prev[side] as usize].next[side] = next[side];
            }
            if next[side] != NONE {
                self.edges[next[side] as usize].prev[side] = prev[side];
            }
            self.verts[x].degree -= 1;
        }
        let edge = &mut self.edges[e as usize];
        edge.prev = [NONE; R];
        edge.next = [NONE; R];
        edge.attached = false;
        true
    }

    /// Number of attached edges touching `x`, summed over all sides.
    #[inline]
    pub fn degree(&self, x: u32) -> u32 {
        self.verts[x as usize].degree
    }

    /// The only attached edge at `x`, if its degree is exactly one.
    pub(crate) fn sole_edge(&self, x: u32) -> Option<u32> {
        let vert = &self.verts[x as usize];
        if vert.degree != 1 {
            return None;
        }
        vert.head.iter().copied().find(|&e| e != NONE)
    }

    /// Attached edges occupying side `side` of vertex `x`.
    pub fn incident(&self, x: u32, side: usize) -> impl Iterator<Item = u32> + '_ {
        let mut cur = self.verts[x as usize].head[side];
        std::iter::from_fn(move || {
            if cur == NONE {
                return None;
            }
            let e = cur;
            cur = self.edges[e as usize].next[side];
            Some(e)
        })
    }

    #[inline]
    pub fn edge(&self, e: u32) -> &Edge<R> {
        &self.edges[e as usize]
    }
    #[inline]
    pub fn is_attached(&self, e: u32) -> bool {
        self.edges[e as usize].attached
    }
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Scan each edge's first-side list for an earlier edge with the same vertices
    /// and the same key bytes.
    fn find_duplicate<K: AsRef<[u8]>>(&self, keys: &[K]) -> Option<(usize, usize)> {
        for (i, edge) in self.edges.iter().enumerate() {
            for j in self.incident(edge.vertices[0], 0) {
                let j = j as usize;
                if j < i
                    && self.edges[j].vertices == edge.vertices
                    && keys[j].as_ref() == keys[i].as_ref()
                {
                    return Some((j, i));
                }
            }
        }
        None
    }
}

#[inline]
fn pairwise_distinct<const R: usize>(vs: &[u32; R]) -> bool {
    (0..R).all(|a| (a + 1..R).all(|b| vs[a] != vs[b]))
}

#[inline]
fn reduce<H: KeyHasher, const R: usize>(
    hasher: &H,
    key: &[u8],
    hash_size: usize,
    seed: u32,
    v: u32,
) -> [u32; R] {
    let mut buf = [0u32; MAX_HASH_SIZE];
    hasher.hash(seed, key, &mut buf[..hash_size]);
    std::array::from_fn(|side| buf[side] % v)
}

/// Derive the r vertices of every edge (in parallel with the "parallel" feature).
fn edge_vertices<K, H, const R: usize>(
    keys: &[K],
    hasher: &H,
    hash_size: usize,
    seed: u32,
    v: u32,
) -> Vec<[u32; R]>
where
    K: AsRef<[u8]> + Sync,
    H: KeyHasher,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        keys.par_iter()
            .map(|k| reduce::<H, R>(hasher, k.as_ref(), hash_size, seed, v))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        keys.iter()
            .map(|k| reduce::<H, R>(hasher, k.as_ref(), hash_size, seed, v))
            .collect()
    }
}
