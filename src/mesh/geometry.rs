use std::collections::{BTreeMap, BTreeSet};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use super::fields::CellTags;
use super::topology::{Edge, EdgeMap};
use crate::fem::Tri3Basis;
use crate::geometry::BoundingBox;

/// Linear triangle mesh
///
/// Cells are stored counter-clockwise. Node and cell order is stable across
/// serialization, so a persisted `CellTags` stays aligned with the cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Node coordinates
    pub nodes: Vec<Point2<f64>>,
    /// Triangle connectivity
    pub cells: Vec<[usize; 3]>,
}

/// Summary numbers for logging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStats {
    pub num_nodes: usize,
    pub num_cells: usize,
    pub total_area: f64,
    pub min_cell_area: f64,
}

impl Mesh {
    pub fn new(nodes: Vec<Point2<f64>>, cells: Vec<[usize; 3]>) -> Self {
        Self { nodes, cells }
    }

    pub fn add_node(&mut self, x: f64, y: f64) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Point2::new(x, y));
        idx
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_vertices(&self, cell: usize) -> [Point2<f64>; 3] {
        let [a, b, c] = self.cells[cell];
        [self.nodes[a], self.nodes[b], self.nodes[c]]
    }

    pub fn cell_area(&self, cell: usize) -> f64 {
        Tri3Basis::area(&self.cell_vertices(cell))
    }

    pub fn cell_centroid(&self, cell: usize) -> Point2<f64> {
        Tri3Basis::centroid(&self.cell_vertices(cell))
    }

    pub fn total_area(&self) -> f64 {
        (0..self.num_cells()).map(|c| self.cell_area(c)).sum()
    }

    /// Area covered by each tag
    pub fn area_by_tag(&self, tags: &CellTags) -> BTreeMap<u32, f64> {
        let mut areas = BTreeMap::new();
        for (c, tag) in tags.iter().enumerate() {
            *areas.entry(tag).or_insert(0.0) += self.cell_area(c);
        }
        areas
    }

    pub fn edge_map(&self) -> EdgeMap {
        EdgeMap::build(&self.cells)
    }

    /// Edges owned by exactly one cell
    ///
    /// Returned in cell order, each oriented as in its owning cell so that the
    /// domain lies to the left.
    pub fn boundary_edges(&self) -> Vec<[usize; 2]> {
        let map = self.edge_map();
        let mut edges = Vec::new();
        for cell in &self.cells {
            for k in 0..3 {
                if map.is_boundary(&Edge::of_cell(cell, k)) {
                    edges.push([cell[k], cell[(k + 1) % 3]]);
                }
            }
        }
        edges
    }

    /// Nodes on the boundary, ascending
    pub fn boundary_nodes(&self) -> Vec<usize> {
        let nodes: BTreeSet<usize> = self.boundary_edges().into_iter().flatten().collect();
        nodes.into_iter().collect()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.nodes)
    }

    pub fn stats(&self) -> MeshStats {
        let areas: Vec<f64> = (0..self.num_cells()).map(|c| self.cell_area(c)).collect();
        MeshStats {
            num_nodes: self.num_nodes(),
            num_cells: self.num_cells(),
            total_area: areas.iter().sum(),
            min_cell_area: areas.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Mesh {
        Mesh::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
                Point2::new(0.5, 0.5),
            ],
            vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]],
        )
    }

    #[test]
    fn test_areas() {
        let mesh = unit_square();
        assert_relative_eq!(mesh.total_area(), 1.0);
        assert_relative_eq!(mesh.cell_area(0), 0.25);

        let tags = CellTags::new(vec![0, 2, 2, 0]);
        let areas = mesh.area_by_tag(&tags);
        assert_relative_eq!(areas[&0], 0.5);
        assert_relative_eq!(areas[&2], 0.5);
    }

    #[test]
    fn test_boundary() {
        let mesh = unit_square();
        let edges = mesh.boundary_edges();
        assert_eq!(edges, vec![[0, 1], [1, 2], [2, 3], [3, 0]]);
        assert_eq!(mesh.boundary_nodes(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_serde_layout() {
        let mesh = unit_square();
        let json = serde_json::to_string(&mesh).unwrap();
        let back: Mesh = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mesh);
    }
}
