use log::trace;

use crate::error::AttemptError;
use crate::graph::Hypergraph;

/// Edge indices in assignment order: reading front to back, every edge has at
/// least one vertex that no earlier edge touches.
///
/// Produced only by a successful [`Hypergraph::peel`], so it is always a
/// permutation of `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOrder(Vec<u32>);

impl OutputOrder {
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn into_inner(self) -> Vec<u32> {
        self.0
    }
}

impl<const R: usize> Hypergraph<R> {
    /// Strip degree-1 vertices until none are left.
    ///
    /// Each stripped edge is written to the back of the order, so the last edge
    /// removed comes first. Consumes the adjacency lists; the edge vertex tuples
    /// stay readable for assignment.
    pub fn peel(&mut self) -> Result<OutputOrder, AttemptError> {
        let n = self.edge_count();
        let mut order = vec![0u32; n];
        let mut index = n;

        let mut worklist: Vec<u32> = (0..self.vertex_count() as u32)
            .filter(|&x| self.degree(x) == 1)
            .collect();
        trace!("peeling {n} edges, {} initial degree-1 vertices", worklist.len());

        // A vertex enters the worklist at most once: degrees only fall, so
        // "became 1" happens once. It may have dropped to 0 by the time it is popped.
        while let Some(x) = worklist.pop() {
            let Some(e) = self.sole_edge(x) else {
                continue;
            };
            self.remove_edge(e);
            index -= 1;
            order[index] = e;
            for &u in &self.edge(e).vertices {
                if u != x && self.degree(u) == 1 {
                    worklist.push(u);
                }
            }
        }

        if index != 0 {
            return Err(AttemptError::CycleDetected {
                remaining: index as u32,
            });
        }
        Ok(OutputOrder(order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(order: &OutputOrder, n: usize) -> bool {
        let mut seen = vec![false; n];
        order.as_slice().iter().all(|&e| !std::mem::replace(&mut seen[e as usize], true))
            && order.len() == n
    }

    #[test]
    fn path_graph_peels() {
        let mut g = Hypergraph::<2>::from_edges(5, &[[0, 1], [1, 2], [2, 3], [3, 4]]).unwrap();
        let order = g.peel().unwrap();
        assert!(is_permutation(&order, 4));
        assert!((0..4).all(|e| !g.is_attached(e)));
    }

    #[test]
    fn two_cycle_is_detected() {
        let mut g = Hypergraph::<2>::from_edges(3, &[[0, 1], [1, 0], [1, 2]]).unwrap();
        assert_eq!(g.peel(), Err(AttemptError::CycleDetected { remaining: 2 }));
    }

    #[test]
    fn three_uniform_cascade() {
        // Vertex 5 is free from the start; removing edge 2 frees vertex 4, and so on.
        let edges = [[0, 1, 2], [1, 3, 4], [3, 4, 5]];
        let mut g = Hypergraph::<3>::from_edges(6, &edges).unwrap();
        let order = g.peel().unwrap();
        assert!(is_permutation(&order, 3));
    }

    #[test]
    fn front_to_back_each_edge_has_fresh_vertex() {
        let edges = [[0, 1, 2], [2, 3, 4], [4, 5, 6], [6, 7, 0]];
        let mut g = Hypergraph::<3>::from_edges(8, &edges).unwrap();
        let order = g.peel().unwrap();
        let mut visited = [false; 8];
        for &e in order.as_slice() {
            let vs = edges[e as usize];
            assert!(vs.iter().any(|&x| !visited[x as usize]));
            for x in vs {
                visited[x as usize] = true;
            }
        }
    }

    #[test]
    fn empty_graph_peels_trivially() {
        let mut g = Hypergraph::<3>::from_edges(3, &[]).unwrap();
        assert!(g.peel().unwrap().is_empty());
    }
}
