//! Symbolic constructive solid geometry and subdomain tagging
//!
//! A [`CsgNode`] is an immutable expression tree over primitives. It answers
//! point-membership queries by walking the tree and inverse-transforming the
//! query point; no boolean clipping is ever computed.
//!
//! A [`Domain`] pairs the overall shape with an ordered list of tag overlays.
//! The tag of a point is the tag of the **last** overlay whose region contains
//! it, or 0 when no overlay does. Later overlays therefore always win on
//! overlap, and the precedence is fully determined by insertion order.

use std::collections::BTreeSet;
use std::ops::{Add, Sub};
use std::sync::Arc;

use nalgebra::{Point2, Rotation2, Vector2};
use super::primitives::{BoundingBox, Primitive};
use crate::error::{Error, Result};

/// Node of a CSG expression tree
///
/// Children are shared through `Arc`, so composing the same sub-tree several
/// times (e.g. three copies of one press) does not copy it.
#[derive(Debug, Clone)]
pub enum CsgNode {
    Primitive(Arc<Primitive>),
    Union(Arc<CsgNode>, Arc<CsgNode>),
    Difference(Arc<CsgNode>, Arc<CsgNode>),
    Translate(Arc<CsgNode>, Vector2<f64>),
    /// Counter-clockwise rotation about the origin (radians)
    Rotate(Arc<CsgNode>, f64),
}

impl From<Primitive> for CsgNode {
    fn from(p: Primitive) -> Self {
        CsgNode::Primitive(Arc::new(p))
    }
}

impl CsgNode {
    pub fn union(a: CsgNode, b: CsgNode) -> CsgNode {
        CsgNode::Union(Arc::new(a), Arc::new(b))
    }

    pub fn difference(a: CsgNode, b: CsgNode) -> CsgNode {
        CsgNode::Difference(Arc::new(a), Arc::new(b))
    }

    pub fn translate(&self, delta: Vector2<f64>) -> CsgNode {
        CsgNode::Translate(Arc::new(self.clone()), delta)
    }

    pub fn rotate(&self, angle: f64) -> CsgNode {
        CsgNode::Rotate(Arc::new(self.clone()), angle)
    }

    /// Point membership
    ///
    /// Primitives are closed sets; a difference removes the closed subtrahend,
    /// so shared boundaries belong to the subtracted part.
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        match self {
            CsgNode::Primitive(prim) => prim.contains(p),
            CsgNode::Union(a, b) => a.contains(p) || b.contains(p),
            CsgNode::Difference(a, b) => a.contains(p) && !b.contains(p),
            CsgNode::Translate(node, delta) => node.contains(&(p - delta)),
            CsgNode::Rotate(node, angle) => {
                let inverse = Rotation2::new(-angle);
                node.contains(&(inverse * p))
            }
        }
    }

    /// Conservative axis-aligned bounding box
    ///
    /// Differences keep the box of the minuend; rotations bound the rotated
    /// corners of the child box.
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            CsgNode::Primitive(prim) => prim.bounding_box(),
            CsgNode::Union(a, b) => a.bounding_box().merge(&b.bounding_box()),
            CsgNode::Difference(a, _) => a.bounding_box(),
            CsgNode::Translate(node, delta) => {
                let bb = node.bounding_box();
                BoundingBox::new(bb.min + delta, bb.max + delta)
            }
            CsgNode::Rotate(node, angle) => {
                let rot = Rotation2::new(*angle);
                let corners: Vec<Point2<f64>> = node
                    .bounding_box()
                    .corners()
                    .iter()
                    .map(|c| snap(rot * c))
                    .collect();
                BoundingBox::from_points(&corners)
            }
        }
    }
}

/// Remove round-off from rotated coordinates (e.g. `sin(π)` ≈ 1.2e-16)
fn snap(p: Point2<f64>) -> Point2<f64> {
    let clean = |v: f64| if v.abs() < 1e-12 { 0.0 } else { v };
    Point2::new(clean(p.x), clean(p.y))
}

impl Add for CsgNode {
    type Output = CsgNode;

    fn add(self, rhs: CsgNode) -> CsgNode {
        CsgNode::union(self, rhs)
    }
}

impl Sub for CsgNode {
    type Output = CsgNode;

    fn sub(self, rhs: CsgNode) -> CsgNode {
        CsgNode::difference(self, rhs)
    }
}

/// One tagged region, applied in insertion order
#[derive(Debug, Clone)]
pub struct Overlay {
    pub region: CsgNode,
    pub tag: u32,
}

/// A shape plus its ordered subdomain tag overlays
#[derive(Debug, Clone)]
pub struct Domain {
    shape: CsgNode,
    overlays: Vec<Overlay>,
    assigned: BTreeSet<u32>,
}

impl Domain {
    pub fn new(shape: CsgNode) -> Self {
        Self {
            shape,
            overlays: Vec::new(),
            assigned: BTreeSet::new(),
        }
    }

    /// Grow the shape by `extra` (tags are unaffected)
    pub fn union(&mut self, extra: CsgNode) {
        self.shape = CsgNode::union(self.shape.clone(), extra);
    }

    /// Tag `region` with `id`; overrides earlier tags where they overlap
    ///
    /// # Errors
    /// - `ReservedTag` for `id == 0`
    /// - `DuplicateTag` if `id` was already assigned in this domain
    pub fn tag(&mut self, region: CsgNode, id: u32) -> Result<()> {
        if id == 0 {
            return Err(Error::ReservedTag);
        }
        if self.assigned.contains(&id) {
            return Err(Error::DuplicateTag(id));
        }
        self.push_overlay(region, id);
        Ok(())
    }

    /// Tag `region` with `id`, explicitly allowing `id` to be reused
    pub fn retag(&mut self, region: CsgNode, id: u32) -> Result<()> {
        if id == 0 {
            return Err(Error::ReservedTag);
        }
        self.push_overlay(region, id);
        Ok(())
    }

    fn push_overlay(&mut self, region: CsgNode, tag: u32) {
        self.assigned.insert(tag);
        self.overlays.push(Overlay { region, tag });
    }

    pub fn shape(&self) -> &CsgNode {
        &self.shape
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// All explicitly assigned tags, ascending (0 excluded)
    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.assigned.iter().copied()
    }

    pub fn contains(&self, p: &Point2<f64>) -> bool {
        self.shape.contains(p)
    }

    /// Tag at `p`: `None` outside the shape, else the last covering overlay or 0
    pub fn tag_at(&self, p: &Point2<f64>) -> Option<u32> {
        if !self.shape.contains(p) {
            return None;
        }
        let tag = self
            .overlays
            .iter()
            .rev()
            .find(|o| o.region.contains(p))
            .map_or(0, |o| o.tag);
        Some(tag)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.shape.bounding_box()
    }
}
