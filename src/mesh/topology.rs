//! Edge bookkeeping for linear triangle meshes
//!
//! Local edge `k` of a triangle `[v0, v1, v2]` joins `v[k]` and `v[(k + 1) % 3]`;
//! the vertex opposite it is `v[(k + 2) % 3]`.

use std::collections::HashMap;

/// Undirected edge, stored with the smaller node index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(pub usize, pub usize);

impl Edge {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Edge(a, b)
        } else {
            Edge(b, a)
        }
    }

    /// Local edge `k` of a triangle
    pub fn of_cell(cell: &[usize; 3], k: usize) -> Self {
        Edge::new(cell[k], cell[(k + 1) % 3])
    }
}

/// Map from each edge to the cells that own it
#[derive(Debug, Clone, Default)]
pub struct EdgeMap {
    owners: HashMap<Edge, Vec<usize>>,
}

impl EdgeMap {
    pub fn build(cells: &[[usize; 3]]) -> Self {
        let mut owners: HashMap<Edge, Vec<usize>> = HashMap::with_capacity(cells.len() * 2);
        for (c, cell) in cells.iter().enumerate() {
            for k in 0..3 {
                owners.entry(Edge::of_cell(cell, k)).or_default().push(c);
            }
        }
        Self { owners }
    }

    /// Cells sharing an edge (one for boundary edges, two for interior ones)
    pub fn owners(&self, edge: &Edge) -> &[usize] {
        self.owners.get(edge).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_boundary(&self, edge: &Edge) -> bool {
        self.owners(edge).len() == 1
    }

    pub fn num_edges(&self) -> usize {
        self.owners.len()
    }

    /// Edges owned by more than two cells (non-manifold)
    pub fn num_overshared(&self) -> usize {
        self.owners.values().filter(|o| o.len() > 2).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_is_undirected() {
        assert_eq!(Edge::new(3, 1), Edge::new(1, 3));
        assert_eq!(Edge::of_cell(&[4, 7, 2], 2), Edge(2, 4));
    }

    #[test]
    fn test_two_triangle_square() {
        // 3---2
        // | / |
        // 0---1
        let cells = [[0, 1, 2], [0, 2, 3]];
        let map = EdgeMap::build(&cells);

        assert_eq!(map.num_edges(), 5);
        assert_eq!(map.owners(&Edge::new(0, 2)), &[0, 1]);
        assert!(map.is_boundary(&Edge::new(0, 1)));
        assert!(!map.is_boundary(&Edge::new(2, 0)));
        assert_eq!(map.num_overshared(), 0);
    }
}
