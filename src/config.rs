//! Configuration management for composite press runs
//!
//! Reads TOML configuration files and provides structured, immutable data for
//! geometry construction, meshing, material constants, loading and the linear
//! solver. Every section falls back to the reference press setup, so a file
//! only needs to list the values it changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};
use crate::mechanics::IsotropicElasticity;

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub geometry: GeometryConfig,
    pub mesh: MeshConfig,
    pub materials: MaterialsConfig,
    pub load: LoadConfig,
    pub solver: SolverConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Fiber width
    pub fiber_width: f64,
    /// Fiber height
    pub fiber_height: f64,
    /// Lattice spacing in x
    pub spacing_x: f64,
    /// Lattice spacing in y
    pub spacing_y: f64,
    /// Unit cell width
    pub rve_width: f64,
    /// Unit cell height
    pub rve_height: f64,
    pub block_width: f64,
    pub block_height: f64,
    pub press_width: f64,
    pub press_height: f64,
    /// Press fillet radius in x
    pub round_x: f64,
    /// Press fillet radius in y
    pub round_y: f64,
    /// Polygon segments per fillet ellipse
    pub segments: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            fiber_width: 0.05,
            fiber_height: 0.025,
            spacing_x: 0.1,
            spacing_y: 0.1,
            rve_width: 0.1,
            rve_height: 0.1,
            block_width: 2.0,
            block_height: 0.5,
            press_width: 0.4,
            press_height: 0.1,
            round_x: 0.05,
            round_y: 0.05,
            segments: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Cells per unit length for resolved scenarios (rve, press, block)
    pub base_resolution: f64,
    /// Cells per unit length for coarse and sparse blocks
    pub coarse_resolution: f64,
    /// Uniform refinements of tagged (non-background) cells
    pub refinements: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            base_resolution: 40.0,
            coarse_resolution: 20.0,
            refinements: 0,
        }
    }
}

/// Elastic constants of the two phases
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MaterialsConfig {
    /// Matrix Young's modulus E1 (Pa)
    pub matrix_youngs_modulus: f64,
    /// Matrix Poisson's ratio ν1
    pub matrix_poisson_ratio: f64,
    /// Fiber Young's modulus E2 (Pa)
    pub fiber_youngs_modulus: f64,
    /// Fiber Poisson's ratio ν2
    pub fiber_poisson_ratio: f64,
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        Self {
            matrix_youngs_modulus: 4e10,
            matrix_poisson_ratio: 0.15,
            fiber_youngs_modulus: 2e11,
            fiber_poisson_ratio: 0.3,
        }
    }
}

impl MaterialsConfig {
    /// Phase 1 (matrix, tag 0)
    pub fn matrix(&self) -> Result<IsotropicElasticity> {
        IsotropicElasticity::new(self.matrix_youngs_modulus, self.matrix_poisson_ratio)
    }

    /// Phase 2 (fibers, tags ≥ 1)
    pub fn fiber(&self) -> Result<IsotropicElasticity> {
        IsotropicElasticity::new(self.fiber_youngs_modulus, self.fiber_poisson_ratio)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Traction applied on the top press face (Pa)
    pub traction: [f64; 2],
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self { traction: [0.0, -1e5] }
    }
}

/// Linear solver choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolverKind {
    /// Jacobi-preconditioned conjugate gradient
    Cg,
    /// Dense LU (small systems only)
    Direct,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    pub linear_solver: LinearSolverKind,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            linear_solver: LinearSolverKind::Cg,
            tolerance: 1e-10,
            max_iterations: 20_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for meshes and solution fields
    pub directory: String,
    /// Write meshes and displacement fields to disk
    pub persist: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            persist: true,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(contents)
            .map_err(|e| Error::InvalidConfig(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Check every value eagerly
    ///
    /// Lattice parameters themselves are validated when the lattice is built,
    /// so this only covers values that are not checked anywhere downstream.
    pub fn validate(&self) -> Result<()> {
        self.materials.matrix()?;
        self.materials.fiber()?;

        let m = &self.mesh;
        if !(m.base_resolution > 0.0 && m.coarse_resolution > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "resolutions must be positive, got base={}, coarse={}",
                m.base_resolution, m.coarse_resolution
            )));
        }

        let g = &self.geometry;
        let sizes = [
            ("rve_width", g.rve_width),
            ("rve_height", g.rve_height),
            ("block_width", g.block_width),
            ("block_height", g.block_height),
            ("press_width", g.press_width),
            ("press_height", g.press_height),
        ];
        for (name, value) in sizes {
            if !(value > 0.0) {
                return Err(Error::InvalidGeometry(format!("{} must be positive, got {}", name, value)));
            }
        }
        if g.round_x * 2.0 >= g.press_width || g.round_y >= g.press_height {
            return Err(Error::InvalidGeometry(format!(
                "press fillet ({}, {}) does not fit a {}x{} press",
                g.round_x, g.round_y, g.press_width, g.press_height
            )));
        }
        if g.segments < 3 {
            return Err(Error::InvalidGeometry(format!(
                "fillet needs at least 3 segments, got {}",
                g.segments
            )));
        }

        if !(self.solver.tolerance > 0.0) || self.solver.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "solver tolerance and iteration limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        let g = &self.geometry;
        let m = &self.materials;
        info!(
            "block {:.2} x {:.2}, press {:.2} x {:.2}, fiber {:.3} x {:.3} every {:.2} x {:.2}",
            g.block_width, g.block_height, g.press_width, g.press_height,
            g.fiber_width, g.fiber_height, g.spacing_x, g.spacing_y
        );
        info!(
            "matrix E={:.2e} nu={:.2}, fiber E={:.2e} nu={:.2}",
            m.matrix_youngs_modulus, m.matrix_poisson_ratio,
            m.fiber_youngs_modulus, m.fiber_poisson_ratio
        );
        info!(
            "resolution {} (coarse {}), {} refinement(s), solver {:?}",
            self.mesh.base_resolution, self.mesh.coarse_resolution,
            self.mesh.refinements, self.solver.linear_solver
        );
    }
}
