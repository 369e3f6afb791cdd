//! Regular fiber lattices
//!
//! Tiles a rectangular region with equally sized rectangular fibers. Tile
//! `(i, j)` sits at the center of grid cell `(i, j)` and is tagged
//! `i * ny + j + tag_offset`, which keeps tags unique for a fixed offset.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use tracing::debug;
use super::csg::{CsgNode, Domain};
use super::primitives::Primitive;
use crate::error::{Error, Result};

/// Lattice parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeSpec {
    /// Lower-left corner of the tiled region
    pub origin: Point2<f64>,
    /// Region width W
    pub width: f64,
    /// Region height H
    pub height: f64,
    /// Fiber width
    pub tile_width: f64,
    /// Fiber height
    pub tile_height: f64,
    /// Nominal spacing in x (dx)
    pub dx: f64,
    /// Nominal spacing in y (dy)
    pub dy: f64,
    /// Added to every tile tag
    pub tag_offset: u32,
}

/// A tile that made it into the domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeTile {
    pub i: usize,
    pub j: usize,
    pub center: Point2<f64>,
    pub tag: u32,
}

impl LatticeSpec {
    /// Check the parameters without building anything
    ///
    /// # Errors
    /// `InvalidGeometry` for non-positive spacing or tile size, a tile larger
    /// than the spacing, or a non-positive region.
    pub fn validate(&self) -> Result<()> {
        if !(self.dx > 0.0 && self.dy > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "lattice spacing must be positive, got dx={}, dy={}",
                self.dx, self.dy
            )));
        }
        if !(self.tile_width > 0.0 && self.tile_height > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "fiber size must be positive, got {}x{}",
                self.tile_width, self.tile_height
            )));
        }
        if self.tile_width > self.dx || self.tile_height > self.dy {
            return Err(Error::InvalidGeometry(format!(
                "fiber {}x{} does not fit lattice spacing {}x{}",
                self.tile_width, self.tile_height, self.dx, self.dy
            )));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "lattice region must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Grid dimensions `(nx, ny)`
    pub fn grid_dimensions(&self) -> (usize, usize) {
        let nx = (self.width / self.dx).floor() as usize;
        let ny = (self.height / self.dy).floor() as usize;
        (nx, ny)
    }

    /// Center of tile `(i, j)`
    pub fn tile_center(&self, i: usize, j: usize) -> Point2<f64> {
        let (nx, ny) = self.grid_dimensions();
        Point2::new(
            self.origin.x + self.width * (i as f64 + 0.5) / nx as f64,
            self.origin.y + self.height * (j as f64 + 0.5) / ny as f64,
        )
    }

    pub fn tile_tag(&self, i: usize, j: usize) -> u32 {
        let (_, ny) = self.grid_dimensions();
        (i * ny + j) as u32 + self.tag_offset
    }
}

/// Rectangular fiber of size `w × h` centered at `(x, y)`
pub fn fiber(w: f64, h: f64, x: f64, y: f64) -> Result<CsgNode> {
    let half = Vector2::new(w / 2.0, h / 2.0);
    let center = Point2::new(x, y);
    Ok(Primitive::rectangle(center - half, center + half)?.into())
}

/// Axis-separable "near" zone used by sparse lattices
///
/// A point is accepted when `|x - cx| <= half_x` and `|y - cy| <= half_y`.
/// Both bounds are inclusive, so centers exactly on the zone edge are kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InclusionZone {
    pub center: Point2<f64>,
    pub half_x: f64,
    pub half_y: f64,
}

impl InclusionZone {
    pub fn new(center: Point2<f64>, half_x: f64, half_y: f64) -> Self {
        Self { center, half_x, half_y }
    }

    pub fn accepts(&self, x: f64, y: f64) -> bool {
        near(x, self.center.x, self.half_x) && near(y, self.center.y, self.half_y)
    }
}

/// `|a - b| <= tol`
pub fn near(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Tile `spec`'s region into `domain`
///
/// Every accepted tile is unioned into the domain shape and tagged in
/// `(i, j)` lexicographic order. With `inclusion`, only tiles whose center
/// passes the predicate are materialized.
///
/// # Returns
/// The tiles that were added, in insertion order.
///
/// # Errors
/// Parameter errors from [`LatticeSpec::validate`], and `DuplicateTag` if a
/// tile tag collides with one already in `domain`.
pub fn build_lattice(
    domain: &mut Domain,
    spec: &LatticeSpec,
    inclusion: Option<&dyn Fn(f64, f64) -> bool>,
) -> Result<Vec<LatticeTile>> {
    spec.validate()?;
    let (nx, ny) = spec.grid_dimensions();

    let mut tiles = Vec::new();
    for i in 0..nx {
        for j in 0..ny {
            let center = spec.tile_center(i, j);
            if let Some(accept) = inclusion {
                if !accept(center.x, center.y) {
                    continue;
                }
            }

            let tag = spec.tile_tag(i, j);
            let tile = fiber(spec.tile_width, spec.tile_height, center.x, center.y)?;
            domain.union(tile.clone());
            domain.tag(tile, tag)?;
            tiles.push(LatticeTile { i, j, center, tag });
        }
    }

    debug!(nx, ny, accepted = tiles.len(), "lattice built");
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeSet;

    fn spec(width: f64, height: f64, offset: u32) -> LatticeSpec {
        LatticeSpec {
            origin: Point2::origin(),
            width,
            height,
            tile_width: 0.05,
            tile_height: 0.025,
            dx: 0.1,
            dy: 0.1,
            tag_offset: offset,
        }
    }

    fn base(width: f64, height: f64) -> Domain {
        Domain::new(
            Primitive::rectangle(Point2::origin(), Point2::new(width, height))
                .unwrap()
                .into(),
        )
    }

    #[test]
    fn test_single_tile_unit_cell() {
        let mut domain = base(0.1, 0.1);
        let tiles = build_lattice(&mut domain, &spec(0.1, 0.1, 1), None).unwrap();

        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].tag, 1);
        assert_relative_eq!(tiles[0].center.x, 0.05, epsilon = 1e-15);
        assert_relative_eq!(tiles[0].center.y, 0.05, epsilon = 1e-15);
        assert_eq!(domain.tag_at(&Point2::new(0.05, 0.05)), Some(1));
        assert_eq!(domain.tag_at(&Point2::new(0.01, 0.01)), Some(0));
    }

    #[test]
    fn test_tags_are_contiguous_and_unique() {
        let s = spec(0.5, 0.2, 7);
        let mut domain = base(0.5, 0.2);
        let tiles = build_lattice(&mut domain, &s, None).unwrap();

        let (nx, ny) = s.grid_dimensions();
        assert_eq!((nx, ny), (5, 2));

        let tags: BTreeSet<u32> = tiles.iter().map(|t| t.tag).collect();
        let expected: BTreeSet<u32> = (7..7 + (nx * ny) as u32).collect();
        assert_eq!(tags, expected);

        for t in &tiles {
            assert_eq!(domain.tag_at(&t.center), Some(t.tag));
        }
    }

    #[test]
    fn test_invalid_spacing_rejected() {
        let mut s = spec(1.0, 1.0, 1);
        s.dx = 0.0;
        assert!(matches!(s.validate(), Err(Error::InvalidGeometry(_))));

        let mut s = spec(1.0, 1.0, 1);
        s.tile_width = 0.2;
        let mut domain = base(1.0, 1.0);
        assert!(build_lattice(&mut domain, &s, None).is_err());
    }

    #[test]
    fn test_inclusion_predicate_filters_tiles() {
        let s = spec(1.0, 0.5, 2);
        let mut domain = base(1.0, 0.5);
        let zone = InclusionZone::new(Point2::new(0.2, 0.0), 0.2, 0.1);
        let accept = |x: f64, y: f64| zone.accepts(x, y);
        let tiles = build_lattice(&mut domain, &s, Some(&accept)).unwrap();

        // Centers x = 0.05, 0.15, 0.25, 0.35 within 0.2 of 0.2, y = 0.05 only
        let columns: Vec<usize> = tiles.iter().map(|t| t.i).collect();
        assert_eq!(columns, vec![0, 1, 2, 3]);
        assert!(tiles.iter().all(|t| t.j == 0));
        assert_eq!(tiles[0].tag, 2);
        assert_eq!(tiles[3].tag, 17);
    }

    #[test]
    fn test_near_is_inclusive() {
        let zone = InclusionZone::new(Point2::new(0.0, 0.0), 0.5, 0.5);
        assert!(zone.accepts(0.5, -0.5));
        assert!(!zone.accepts(0.5000001, 0.0));
    }
}
