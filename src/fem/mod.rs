pub mod basis;
pub mod quadrature;
pub mod dof;
pub mod assembly;
pub mod boundary;

pub use basis::Tri3Basis;
pub use quadrature::EdgeQuadrature;
pub use dof::DofManager;
pub use assembly::Assembler;
pub use boundary::{find_boundary_edges, BoundaryConditions, BoundaryEdge, TractionBC};
