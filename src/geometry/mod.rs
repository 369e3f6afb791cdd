/// Geometry: primitives, symbolic CSG with ordered tag overlays, fiber
/// lattices and the scenario shapes built from them.

pub mod primitives;
pub mod csg;
pub mod lattice;
pub mod shapes;

pub use primitives::{BoundingBox, Primitive};
pub use csg::{CsgNode, Domain, Overlay};
pub use lattice::{build_lattice, fiber, near, InclusionZone, LatticeSpec, LatticeTile};
pub use shapes::{
    block, coarse_block, composite, press, press_domain, press_layout, rve, sparse_block,
    COMPOSITE_FIBER_OFFSET, PRESS_TAG, SPARSE_FIBER_OFFSET,
};
