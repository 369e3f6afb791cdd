//! Error types for the composite press pipeline.
//!
//! Every fallible operation returns `Result<T>`. All failures are structural
//! (bad parameters, degenerate geometry, singular systems), so nothing here is
//! ever retried.

use thiserror::Error;

/// Unified error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Geometry parameter out of range (spacing, tile size, segment count, ...).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Elastic constants outside the physically admissible range.
    #[error("Invalid material parameter: {0}")]
    InvalidMaterial(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tag 0 names the background and cannot be assigned explicitly.
    #[error("Tag 0 is reserved for the background region")]
    ReservedTag,

    /// A tag id was assigned twice within one domain without `retag`.
    #[error("Tag {0} is already assigned in this domain")]
    DuplicateTag(u32),

    /// The coefficient field builder met a cell tag with no material.
    #[error("No material assigned to subdomain tag {tag}")]
    MissingMaterial { tag: u32 },

    /// The mesher could not discretize the domain.
    #[error("Meshing failed: {0}")]
    Meshing(String),

    /// The assembled system has no unique solution.
    #[error("Singular system: {0}")]
    SingularSystem(String),

    /// Iterative solver stopped before reaching the tolerance.
    #[error("Solver did not converge after {iterations} iterations (residual: {residual:.2e})")]
    SolverDivergence { iterations: usize, residual: f64 },

    /// Averaging produced an unusable effective tensor.
    #[error("Homogenization failed: {0}")]
    Homogenization(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
