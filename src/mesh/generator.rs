//! Raster triangulation of tagged CSG domains
//!
//! The bounding box of the domain is covered by a structured grid whose
//! squares are split into two triangles along alternating diagonals. A
//! triangle survives if its centroid lies in the domain shape and takes the
//! tag the domain reports at that centroid. Subdomain boundaries are therefore
//! resolved to within one cell, which is enough for the unit-cell and
//! coarse-scale solves it feeds.

use nalgebra::Point2;
use tracing::debug;
use super::fields::CellTags;
use super::geometry::Mesh;
use crate::error::{Error, Result};
use crate::fem::Tri3Basis;
use crate::geometry::Domain;

pub struct MeshGenerator;

impl MeshGenerator {
    /// Mesh a tagged domain
    ///
    /// # Arguments
    /// * `domain` - Shape plus tag overlays
    /// * `resolution` - Number of cells across `sqrt(bbox area)`; the target
    ///   edge length is `sqrt(bbox area) / resolution`
    ///
    /// # Errors
    /// `Meshing` for a non-positive resolution or when no cell survives.
    pub fn generate(domain: &Domain, resolution: f64) -> Result<(Mesh, CellTags)> {
        if !(resolution > 0.0 && resolution.is_finite()) {
            return Err(Error::Meshing(format!(
                "resolution must be positive and finite, got {}",
                resolution
            )));
        }

        let bbox = domain.bounding_box();
        let area = bbox.area();
        if !(area > 0.0) {
            return Err(Error::Meshing("domain has an empty bounding box".to_string()));
        }
        let h = area.sqrt() / resolution;
        let nx = ((bbox.width() / h).ceil() as usize).max(1);
        let ny = ((bbox.height() / h).ceil() as usize).max(1);
        let dx = bbox.width() / nx as f64;
        let dy = bbox.height() / ny as f64;

        // Grid coordinates hit the box bounds exactly
        let grid_x = |i: usize| if i == nx { bbox.max.x } else { bbox.min.x + i as f64 * dx };
        let grid_y = |j: usize| if j == ny { bbox.max.y } else { bbox.min.y + j as f64 * dy };
        let grid_node = |i: usize, j: usize| j * (nx + 1) + i;

        let mut used = vec![usize::MAX; (nx + 1) * (ny + 1)];
        let mut mesh = Mesh::default();
        let mut tags = Vec::new();

        for j in 0..ny {
            for i in 0..nx {
                let n00 = grid_node(i, j);
                let n10 = grid_node(i + 1, j);
                let n11 = grid_node(i + 1, j + 1);
                let n01 = grid_node(i, j + 1);

                let halves = if (i + j) % 2 == 0 {
                    [[n00, n10, n11], [n00, n11, n01]]
                } else {
                    [[n00, n10, n01], [n10, n11, n01]]
                };

                for tri in halves {
                    let vertices = tri.map(|n| {
                        Point2::new(grid_x(n % (nx + 1)), grid_y(n / (nx + 1)))
                    });
                    let centroid = Tri3Basis::centroid(&vertices);
                    let Some(tag) = domain.tag_at(&centroid) else {
                        continue;
                    };

                    let mut cell = [0; 3];
                    for (k, &n) in tri.iter().enumerate() {
                        if used[n] == usize::MAX {
                            used[n] = mesh.add_node(vertices[k].x, vertices[k].y);
                        }
                        cell[k] = used[n];
                    }
                    mesh.cells.push(cell);
                    tags.push(tag);
                }
            }
        }

        if mesh.cells.is_empty() {
            return Err(Error::Meshing(format!(
                "no cell of the {}x{} grid lies inside the domain",
                nx, ny
            )));
        }

        debug!(
            "Raster mesh: {}x{} grid (h = {:.4e}), kept {} cells and {} nodes",
            nx,
            ny,
            h,
            mesh.num_cells(),
            mesh.num_nodes()
        );

        Ok((mesh, CellTags::new(tags)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::geometry::{CsgNode, Primitive};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> CsgNode {
        Primitive::rectangle(Point2::new(x0, y0), Point2::new(x1, y1))
            .unwrap()
            .into()
    }

    #[test]
    fn test_rectangle_is_covered_exactly() {
        let domain = Domain::new(rect(0.0, 0.0, 2.0, 1.0));
        let (mesh, tags) = MeshGenerator::generate(&domain, 8.0).unwrap();

        assert_relative_eq!(mesh.total_area(), 2.0, epsilon = 1e-12);
        assert_eq!(tags.len(), mesh.num_cells());
        assert!(tags.iter().all(|t| t == 0));
        assert_eq!(mesh.edge_map().num_overshared(), 0);
    }

    #[test]
    fn test_cells_are_counter_clockwise() {
        let domain = Domain::new(rect(0.0, 0.0, 1.0, 1.0));
        let (mesh, _) = MeshGenerator::generate(&domain, 5.0).unwrap();
        for c in 0..mesh.num_cells() {
            assert!(Tri3Basis::signed_area(&mesh.cell_vertices(c)) > 0.0);
        }
    }

    #[test]
    fn test_tags_follow_overlays() {
        let mut domain = Domain::new(rect(0.0, 0.0, 1.0, 1.0));
        domain.tag(rect(0.0, 0.0, 0.5, 1.0), 4).unwrap();
        let (mesh, tags) = MeshGenerator::generate(&domain, 10.0).unwrap();

        for c in 0..mesh.num_cells() {
            let expected = if mesh.cell_centroid(c).x < 0.5 { 4 } else { 0 };
            assert_eq!(tags.get(c), expected);
        }
        let areas = mesh.area_by_tag(&tags);
        assert_relative_eq!(areas[&4], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_holes_drop_nodes() {
        let domain = Domain::new(rect(0.0, 0.0, 1.0, 1.0) - rect(0.25, 0.25, 0.75, 0.75));
        let (mesh, _) = MeshGenerator::generate(&domain, 4.0).unwrap();

        assert_relative_eq!(mesh.total_area(), 0.75, epsilon = 1e-12);
        // Center node of the 4x4 grid belongs to no kept cell
        assert!(mesh.nodes.iter().all(|p| (p - Point2::new(0.5, 0.5)).norm() > 1e-9));
        assert_eq!(mesh.num_nodes(), 24);
    }

    #[test]
    fn test_invalid_resolution() {
        let domain = Domain::new(rect(0.0, 0.0, 1.0, 1.0));
        assert!(matches!(MeshGenerator::generate(&domain, 0.0), Err(Error::Meshing(_))));
        assert!(matches!(
            MeshGenerator::generate(&domain, f64::NAN),
            Err(Error::Meshing(_))
        ));
    }
}
