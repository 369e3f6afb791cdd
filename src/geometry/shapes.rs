//! Scenario geometries: unit cell, press insert and pressed blocks
//!
//! Block coordinates: the block occupies `[0, w] × [0, h]`. Two presses sit
//! below it, centered at `x = pw/2` and `x = w - pw/2`, spanning
//! `y ∈ [-ph, 0]`; a third press is flipped on top, centered at `x = w/2`,
//! spanning `y ∈ [h, h + ph]`.

use nalgebra::{Point2, Vector2};
use super::csg::{CsgNode, Domain};
use super::lattice::{build_lattice, InclusionZone, LatticeSpec};
use super::primitives::Primitive;
use crate::config::GeometryConfig;
use crate::error::Result;

/// Subdomain tag given to the presses in coarse and sparse blocks
pub const PRESS_TAG: u32 = 1;

/// First fiber tag in dense composites (unit cell, resolved block)
pub const COMPOSITE_FIBER_OFFSET: u32 = 1;

/// First fiber tag in sparse blocks (after [`PRESS_TAG`])
pub const SPARSE_FIBER_OFFSET: u32 = 2;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<CsgNode> {
    Ok(Primitive::rectangle(Point2::new(x0, y0), Point2::new(x1, y1))?.into())
}

/// Rectangle `[0, w] × [0, h]` (optionally grown by `add`) filled with a fiber
/// lattice tagged from [`COMPOSITE_FIBER_OFFSET`]
pub fn composite(
    w: f64,
    h: f64,
    fw: f64,
    fh: f64,
    dx: f64,
    dy: f64,
    add: Option<CsgNode>,
) -> Result<Domain> {
    let mut domain = Domain::new(rect(0.0, 0.0, w, h)?);
    if let Some(extra) = add {
        domain.union(extra);
    }

    let spec = LatticeSpec {
        origin: Point2::origin(),
        width: w,
        height: h,
        tile_width: fw,
        tile_height: fh,
        dx,
        dy,
        tag_offset: COMPOSITE_FIBER_OFFSET,
    };
    build_lattice(&mut domain, &spec, None)?;
    Ok(domain)
}

/// Press insert: a `pw × ph` slab hanging below `y = 0`
///
/// Both sides are cut back by an ellipse of radii `(rx, ry)` centered at
/// `(±pw/2, -ry)` and by the strip below it, leaving a filleted flange where
/// the press meets the block.
pub fn press(pw: f64, ph: f64, rx: f64, ry: f64, segments: usize) -> Result<CsgNode> {
    let left = Primitive::ellipse(Point2::new(-pw / 2.0, -ry), rx, ry, segments)?;
    let right = Primitive::ellipse(Point2::new(pw / 2.0, -ry), rx, ry, segments)?;

    let shape = rect(-pw / 2.0, -ph, pw / 2.0, 0.0)?
        - CsgNode::from(left)
        - CsgNode::from(right)
        - rect(-pw / 2.0, -ph, -pw / 2.0 + rx, -ry)?
        - rect(pw / 2.0 - rx, -ph, pw / 2.0, -ry)?;
    Ok(shape)
}

/// Two presses under the block and one flipped press on top
pub fn press_layout(press: &CsgNode, w: f64, h: f64, pw: f64) -> CsgNode {
    press.translate(Vector2::new(pw / 2.0, 0.0))
        + press.translate(Vector2::new(w - pw / 2.0, 0.0))
        + press
            .rotate(std::f64::consts::PI)
            .translate(Vector2::new(w / 2.0, h))
}

/// Fully resolved block: composite with presses attached (presses untagged)
pub fn block(g: &GeometryConfig) -> Result<Domain> {
    let p = press_from(g)?;
    let presses = press_layout(&p, g.block_width, g.block_height, g.press_width);
    composite(
        g.block_width,
        g.block_height,
        g.fiber_width,
        g.fiber_height,
        g.spacing_x,
        g.spacing_y,
        Some(presses),
    )
}

/// Homogeneous block with presses tagged [`PRESS_TAG`]
pub fn coarse_block(g: &GeometryConfig) -> Result<Domain> {
    let p = press_from(g)?;
    let presses = press_layout(&p, g.block_width, g.block_height, g.press_width);

    let mut domain = Domain::new(rect(0.0, 0.0, g.block_width, g.block_height)?);
    domain.union(presses.clone());
    domain.tag(presses, PRESS_TAG)?;
    Ok(domain)
}

/// Homogeneous block with resolved fibers only near the press footprints
///
/// Each press is extended by an RVE-high strip into the block; the extended
/// presses are tagged [`PRESS_TAG`], then fibers whose centers fall within
/// half a press width and one RVE height of a footprint are overlaid.
pub fn sparse_block(g: &GeometryConfig) -> Result<Domain> {
    let (w, h, pw) = (g.block_width, g.block_height, g.press_width);

    let strip = rect(-pw / 2.0, 0.0, pw / 2.0, g.rve_height)?;
    let p = press_from(g)? + strip;
    let presses = press_layout(&p, w, h, pw);

    let mut domain = Domain::new(rect(0.0, 0.0, w, h)?);
    domain.union(presses.clone());
    domain.tag(presses, PRESS_TAG)?;

    let zones = [
        InclusionZone::new(Point2::new(pw / 2.0, 0.0), pw / 2.0, g.rve_height),
        InclusionZone::new(Point2::new(w - pw / 2.0, 0.0), pw / 2.0, g.rve_height),
        InclusionZone::new(Point2::new(w / 2.0, h), pw / 2.0, g.rve_height),
    ];
    let accept = |x: f64, y: f64| zones.iter().any(|z| z.accepts(x, y));

    let spec = LatticeSpec {
        origin: Point2::origin(),
        width: w,
        height: h,
        tile_width: g.fiber_width,
        tile_height: g.fiber_height,
        dx: g.spacing_x,
        dy: g.spacing_y,
        tag_offset: SPARSE_FIBER_OFFSET,
    };
    build_lattice(&mut domain, &spec, Some(&accept))?;
    Ok(domain)
}

/// Unit cell of the composite
pub fn rve(g: &GeometryConfig) -> Result<Domain> {
    composite(
        g.rve_width,
        g.rve_height,
        g.fiber_width,
        g.fiber_height,
        g.spacing_x,
        g.spacing_y,
        None,
    )
}

/// A single press as its own domain
pub fn press_domain(g: &GeometryConfig) -> Result<Domain> {
    Ok(Domain::new(press_from(g)?))
}

fn press_from(g: &GeometryConfig) -> Result<CsgNode> {
    press(
        g.press_width,
        g.press_height,
        g.round_x,
        g.round_y,
        g.segments,
    )
}
