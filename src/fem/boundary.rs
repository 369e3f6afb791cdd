/// Boundary condition handling for FEM
///
/// Supports Dirichlet (fixed displacement) and Neumann (traction) boundary
/// conditions on the edges of a triangle mesh.

use std::collections::BTreeSet;
use nalgebra::{Point2, Vector2};
use crate::fem::quadrature::EdgeQuadrature;
use crate::mesh::Mesh;

/// Boundary edge, oriented with the domain on its left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryEdge {
    pub nodes: [usize; 2],
}

impl BoundaryEdge {
    pub fn length(&self, coords: &[Point2<f64>]) -> f64 {
        (coords[self.nodes[1]] - coords[self.nodes[0]]).norm()
    }

    /// Integrate a constant traction over the edge
    ///
    /// Returns the nodal forces `f_i = ∫ N_i t ds` for the two end nodes.
    pub fn integrate_traction(&self, coords: &[Point2<f64>], traction: &Vector2<f64>) -> [Vector2<f64>; 2] {
        let length = self.length(coords);
        let quad = EdgeQuadrature::gauss_2point();

        let mut forces = [Vector2::zeros(); 2];
        for (&s, &w) in quad.points.iter().zip(quad.weights.iter()) {
            let n = [1.0 - s, s];
            for i in 0..2 {
                forces[i] += traction * (w * n[i] * length);
            }
        }
        forces
    }
}

/// Traction load on a set of boundary edges
#[derive(Debug, Clone, Copy)]
pub struct TractionBC {
    /// Prescribed traction vector (Pa)
    pub traction: Vector2<f64>,
}

/// Boundary condition manager
#[derive(Debug, Clone, Default)]
pub struct BoundaryConditions {
    /// Nodes with all displacement components prescribed
    dirichlet: Vec<(usize, Vector2<f64>)>,
    /// Edges carrying a traction
    tractions: Vec<(BoundaryEdge, TractionBC)>,
}

impl BoundaryConditions {
    /// Create new boundary condition manager
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dirichlet(&mut self, node: usize, displacement: Vector2<f64>) {
        self.dirichlet.push((node, displacement));
    }

    /// Fix every node of the given edges to `displacement`
    pub fn add_dirichlet_edges(&mut self, edges: &[BoundaryEdge], displacement: Vector2<f64>) {
        let nodes: BTreeSet<usize> = edges.iter().flat_map(|e| e.nodes).collect();
        for node in nodes {
            self.add_dirichlet(node, displacement);
        }
    }

    pub fn add_traction(&mut self, edge: BoundaryEdge, traction: Vector2<f64>) {
        self.tractions.push((edge, TractionBC { traction }));
    }

    pub fn dirichlet(&self) -> &[(usize, Vector2<f64>)] {
        &self.dirichlet
    }

    /// Get all traction boundary edges
    pub fn traction_edges(&self) -> impl Iterator<Item = &(BoundaryEdge, TractionBC)> {
        self.tractions.iter()
    }

    pub fn num_dirichlet_nodes(&self) -> usize {
        self.dirichlet.len()
    }

    pub fn num_traction_edges(&self) -> usize {
        self.tractions.len()
    }
}

/// Boundary edges whose two end nodes satisfy `condition`
///
/// Interior edges are never returned, even when both nodes match.
pub fn find_boundary_edges<F>(mesh: &Mesh, condition: F) -> Vec<BoundaryEdge>
where
    F: Fn(&Point2<f64>) -> bool,
{
    mesh.boundary_edges()
        .into_iter()
        .filter(|[a, b]| condition(&mesh.nodes[*a]) && condition(&mesh.nodes[*b]))
        .map(|nodes| BoundaryEdge { nodes })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Mesh {
        Mesh::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_find_boundary_edges() {
        let mesh = square();
        let top = find_boundary_edges(&mesh, |p| (p.y - 1.0).abs() < 1e-12);
        assert_eq!(top, vec![BoundaryEdge { nodes: [2, 3] }]);

        // The diagonal joins (0,0) and (2,1) but is interior
        let diag = find_boundary_edges(&mesh, |p| (p.y - 0.5 * p.x).abs() < 1e-12);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_traction_resultant() {
        let mesh = square();
        let edge = BoundaryEdge { nodes: [2, 3] };
        let t = Vector2::new(0.0, -1e5);

        let forces = edge.integrate_traction(&mesh.nodes, &t);
        assert_relative_eq!(forces[0].y, -1e5, max_relative = 1e-12);
        assert_relative_eq!(forces[1].y, -1e5, max_relative = 1e-12);
        assert_relative_eq!((forces[0] + forces[1]).y, t.y * edge.length(&mesh.nodes));
    }

    #[test]
    fn test_dirichlet_edges_deduplicate_nodes() {
        let mesh = square();
        let mut bcs = BoundaryConditions::new();
        let edges = find_boundary_edges(&mesh, |p| p.x.abs() < 1e-12 || p.y.abs() < 1e-12);
        assert_eq!(edges.len(), 2);

        bcs.add_dirichlet_edges(&edges, Vector2::zeros());
        assert_eq!(bcs.num_dirichlet_nodes(), 3);
    }
}
