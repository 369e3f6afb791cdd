pub mod topology;
pub mod geometry;
pub mod fields;
pub mod generator;
pub mod refine;

pub use topology::{Edge, EdgeMap};
pub use geometry::{Mesh, MeshStats};
pub use fields::{CellTags, VectorField};
pub use generator::MeshGenerator;
pub use refine::{refine, refine_n};
