pub mod error;
pub mod config;
pub mod geometry;
pub mod mesh;
pub mod fem;
pub mod linalg;
pub mod mechanics;
pub mod homogenization;
pub mod io;
pub mod pipeline;

pub use error::{Error, Result};
pub use config::{GeometryConfig, LinearSolverKind, MaterialsConfig, MeshConfig, PipelineConfig, SolverConfig};
pub use geometry::{build_lattice, BoundingBox, CsgNode, Domain, InclusionZone, LatticeSpec, Primitive, PRESS_TAG};
pub use mesh::{refine, refine_n, CellTags, Mesh, MeshGenerator, MeshStats, VectorField};
pub use fem::{find_boundary_edges, Assembler, BoundaryConditions, BoundaryEdge, DofManager};
pub use linalg::{ConjugateGradient, DirectSolver, Solver, SolverStats};
pub use mechanics::{build_anisotropic_field, build_isotropic_field, IsotropicElasticity, LameField, Material, MaterialLaw, StiffnessField, StiffnessTensor};
pub use homogenization::{homogenize, EffectiveStiffness, Homogenization, UnitStrain};
pub use io::ArtifactStore;
pub use pipeline::{MacroSolution, Pipeline, Scenario, ScenarioOutcome, ScenarioReport};
