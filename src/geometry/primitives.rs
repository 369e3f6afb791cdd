/// Parametric 2D primitives
///
/// Rectangles are axis-aligned and stored by their corners. Ellipses carry a
/// segment count and are resolved as the inscribed polygon with that many
/// vertices, so a coarse ellipse behaves exactly like its polygonal outline.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl BoundingBox {
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all `points`
    pub fn from_points(points: &[Point2<f64>]) -> Self {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { min, max }
    }

    pub fn merge(&self, other: &BoundingBox) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// A parametric shape
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Axis-aligned rectangle `[min.x, max.x] × [min.y, max.y]`
    Rectangle { min: Point2<f64>, max: Point2<f64> },

    /// Ellipse approximated by a polygon with `segments` vertices
    Ellipse {
        center: Point2<f64>,
        rx: f64,
        ry: f64,
        segments: usize,
        /// Cached polygon outline, counter-clockwise
        outline: Vec<Point2<f64>>,
    },
}

impl Primitive {
    /// Rectangle spanned by two opposite corners (in any order)
    ///
    /// # Errors
    /// `InvalidGeometry` if the rectangle has zero width or height.
    pub fn rectangle(a: Point2<f64>, b: Point2<f64>) -> Result<Self> {
        let min = Point2::new(a.x.min(b.x), a.y.min(b.y));
        let max = Point2::new(a.x.max(b.x), a.y.max(b.y));
        if !(max.x - min.x > 0.0 && max.y - min.y > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "rectangle ({}, {})-({}, {}) is degenerate",
                a.x, a.y, b.x, b.y
            )));
        }
        Ok(Primitive::Rectangle { min, max })
    }

    /// Ellipse with the given center, radii and polygon segment count
    ///
    /// # Errors
    /// `InvalidGeometry` if a radius is not positive or `segments < 3`.
    pub fn ellipse(center: Point2<f64>, rx: f64, ry: f64, segments: usize) -> Result<Self> {
        if !(rx > 0.0 && ry > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "ellipse radii must be positive, got ({}, {})",
                rx, ry
            )));
        }
        if segments < 3 {
            return Err(Error::InvalidGeometry(format!(
                "ellipse needs at least 3 segments, got {}",
                segments
            )));
        }

        let outline = (0..segments)
            .map(|k| {
                let t = 2.0 * std::f64::consts::PI * k as f64 / segments as f64;
                center + Vector2::new(rx * t.cos(), ry * t.sin())
            })
            .collect();

        Ok(Primitive::Ellipse { center, rx, ry, segments, outline })
    }

    /// Point membership (closed set)
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        match self {
            Primitive::Rectangle { min, max } => {
                p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
            }
            Primitive::Ellipse { outline, .. } => polygon_contains(outline, p),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Primitive::Rectangle { min, max } => BoundingBox::new(*min, *max),
            Primitive::Ellipse { outline, .. } => BoundingBox::from_points(outline),
        }
    }
}

/// Point-in-convex-polygon test for a counter-clockwise outline
///
/// Points on an edge count as inside.
fn polygon_contains(outline: &[Point2<f64>], p: &Point2<f64>) -> bool {
    let n = outline.len();
    (0..n).all(|i| {
        let a = outline[i];
        let b = outline[(i + 1) % n];
        let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        cross >= -1e-14
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_corners_any_order() {
        let r = Primitive::rectangle(Point2::new(1.0, 2.0), Point2::new(0.0, 0.0)).unwrap();
        let bb = r.bounding_box();
        assert_eq!(bb.min, Point2::new(0.0, 0.0));
        assert_eq!(bb.max, Point2::new(1.0, 2.0));
        assert!(r.contains(&Point2::new(0.5, 1.0)));
        assert!(r.contains(&Point2::new(1.0, 2.0)));
        assert!(!r.contains(&Point2::new(1.1, 1.0)));
    }

    #[test]
    fn test_degenerate_rectangle_rejected() {
        let r = Primitive::rectangle(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        assert!(matches!(r, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_ellipse_segment_count() {
        assert!(Primitive::ellipse(Point2::origin(), 1.0, 1.0, 2).is_err());
        assert!(Primitive::ellipse(Point2::origin(), 0.0, 1.0, 8).is_err());

        let e = Primitive::ellipse(Point2::origin(), 2.0, 1.0, 8).unwrap();
        assert!(e.contains(&Point2::new(0.0, 0.0)));
        assert!(e.contains(&Point2::new(1.5, 0.0)));
        assert!(!e.contains(&Point2::new(1.5, 0.9)));

        let bb = e.bounding_box();
        assert_relative_eq!(bb.max.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(bb.max.y, 1.0, epsilon = 1e-12);
    }
}
