pub mod solver;
pub mod direct;
pub mod iterative;
pub mod preconditioner;

pub use solver::{from_config, LinearOperator, Solver, SolverStats};
pub use direct::DirectSolver;
pub use iterative::ConjugateGradient;
pub use preconditioner::{IdentityPreconditioner, JacobiPreconditioner, Preconditioner};
