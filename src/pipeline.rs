//! Scenario orchestration
//!
//! A scenario is one named geometry (unit cell, press, resolved block, coarse
//! block, sparse block). Meshing a scenario builds its domain, triangulates it
//! at `sqrt(w·h) × resolution`, refines the tagged cells and persists the
//! result. The solve stages chain on top of that:
//!
//! 1. `homogenize` on the unit cell gives the effective stiffness,
//! 2. `solve_coarse` injects it into a coarse or sparse block,
//! 3. `solve_direct` is the fully resolved two-phase reference.
//!
//! Both macro solves clamp the press bottom (`y = -press_height`) and load the
//! press top (`y = block_height + press_height`) with the configured traction.

use nalgebra::Vector2;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::fem::{find_boundary_edges, Assembler, BoundaryConditions, DofManager};
use crate::geometry::{self, Domain, PRESS_TAG};
use crate::homogenization::{self, EffectiveStiffness, Homogenization, UnitStrain};
use crate::io::ArtifactStore;
use crate::linalg;
use crate::mechanics::{build_anisotropic_field, MaterialLaw, StiffnessField};
use crate::mesh::{refine_n, CellTags, Mesh, MeshGenerator, MeshStats, VectorField};

/// Named geometry of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Unit cell with one fiber
    Rve,
    /// A single press insert
    Press,
    /// Fully resolved composite block with presses
    Block,
    /// Homogeneous block, presses tagged
    Coarse,
    /// Homogeneous block with fibers only under the presses
    Sparse,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Rve,
        Scenario::Press,
        Scenario::Block,
        Scenario::Coarse,
        Scenario::Sparse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Rve => "rve",
            Scenario::Press => "press",
            Scenario::Block => "block",
            Scenario::Coarse => "coarse",
            Scenario::Sparse => "sparse",
        }
    }

    /// Build the tagged domain of this scenario
    pub fn domain(self, config: &PipelineConfig) -> Result<Domain> {
        let g = &config.geometry;
        match self {
            Scenario::Rve => geometry::rve(g),
            Scenario::Press => geometry::press_domain(g),
            Scenario::Block => geometry::block(g),
            Scenario::Coarse => geometry::coarse_block(g),
            Scenario::Sparse => geometry::sparse_block(g),
        }
    }

    /// Mesh resolution: `sqrt(w·h)` of the characteristic rectangle times the
    /// base (or coarse) resolution
    pub fn resolution(self, config: &PipelineConfig) -> f64 {
        let g = &config.geometry;
        let m = &config.mesh;
        match self {
            Scenario::Rve => (g.rve_width * g.rve_height).sqrt() * m.base_resolution,
            Scenario::Press => (g.press_width * g.press_height).sqrt() * m.base_resolution,
            Scenario::Block => (g.block_width * g.block_height).sqrt() * m.base_resolution,
            Scenario::Coarse | Scenario::Sparse => {
                (g.block_width * g.block_height).sqrt() * m.coarse_resolution
            }
        }
    }

    /// Whether the homogenized tensor replaces the background of this scenario
    pub fn is_homogenized(self) -> bool {
        matches!(self, Scenario::Coarse | Scenario::Sparse)
    }

    /// Whether the scenario carries the press layout the macro solves load
    pub fn has_presses(self) -> bool {
        matches!(self, Scenario::Block | Scenario::Coarse | Scenario::Sparse)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.name() == s)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown scenario '{}'", s)))
    }
}

/// Summary of one meshed scenario
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub resolution: f64,
    pub stats: MeshStats,
    pub area_by_tag: BTreeMap<u32, f64>,
}

impl ScenarioReport {
    /// Number of distinct subdomain tags present in the mesh
    pub fn num_subdomains(&self) -> usize {
        self.area_by_tag.len()
    }
}

/// Result of one scenario in a batch
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub result: Result<ScenarioReport>,
}

/// Displacement of a pressed block
#[derive(Debug, Clone)]
pub struct MacroSolution {
    pub scenario: Scenario,
    pub mesh: Mesh,
    pub tags: CellTags,
    /// Interleaved nodal displacement
    pub displacement: Vec<f64>,
    /// Total traction force applied on the press top
    pub applied_force: Vector2<f64>,
    /// Resultant of the nodal forces on the clamped press bottom
    pub support_force: Vector2<f64>,
    pub iterations: usize,
}

impl MacroSolution {
    pub fn max_displacement(&self) -> f64 {
        self.displacement
            .chunks(2)
            .map(|u| u[0].hypot(u[1]))
            .fold(0.0, f64::max)
    }

    /// `|applied + support| / |applied|`
    pub fn equilibrium_defect(&self) -> f64 {
        let applied = self.applied_force.norm();
        if applied == 0.0 {
            return self.support_force.norm();
        }
        (self.applied_force + self.support_force).norm() / applied
    }

    pub fn displacement_field(&self) -> Result<VectorField> {
        VectorField::from_dof_vector("u", &self.displacement)
    }
}

/// Sequential driver over the scenarios of one configuration
pub struct Pipeline {
    config: PipelineConfig,
    store: Option<ArtifactStore>,
}

impl Pipeline {
    /// Validate `config` and set up the artifact store
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let store = config
            .output
            .persist
            .then(|| ArtifactStore::new(&config.output.directory));
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&ArtifactStore> {
        self.store.as_ref()
    }

    /// Build, triangulate and refine a scenario
    ///
    /// Cells with a non-zero tag are refined `mesh.refinements` times. The mesh
    /// and its tags are persisted when output is enabled.
    pub fn mesh(&self, scenario: Scenario) -> Result<(Mesh, CellTags)> {
        let domain = scenario.domain(&self.config)?;
        let resolution = scenario.resolution(&self.config);
        let (mesh, tags) = MeshGenerator::generate(&domain, resolution)?;
        let (mesh, tags) = refine_n(&mesh, &tags, |tag| tag != 0, self.config.mesh.refinements);

        if let Some(store) = &self.store {
            store.save_mesh(scenario.name(), &mesh, &tags)?;
        }
        Ok((mesh, tags))
    }

    /// Mesh one scenario and summarize it
    pub fn run_scenario(&self, scenario: Scenario) -> Result<ScenarioReport> {
        let resolution = scenario.resolution(&self.config);
        let (mesh, tags) = self.mesh(scenario)?;
        let stats = mesh.stats();
        let area_by_tag = mesh.area_by_tag(&tags);

        info!(
            "{}: {} nodes, {} cells, {} subdomain(s), area {:.4} (resolution {:.2})",
            scenario,
            stats.num_nodes,
            stats.num_cells,
            area_by_tag.len(),
            stats.total_area,
            resolution
        );
        if stats.min_cell_area <= 0.0 {
            warn!("{}: degenerate cell (area {:e})", scenario, stats.min_cell_area);
        }

        Ok(ScenarioReport {
            scenario,
            resolution,
            stats,
            area_by_tag,
        })
    }

    /// Mesh every scenario in order; a failure does not stop the batch
    pub fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioOutcome> {
        scenarios
            .iter()
            .map(|&scenario| {
                let result = self.run_scenario(scenario);
                if let Err(e) = &result {
                    error!("{} failed: {}", scenario, e);
                }
                ScenarioOutcome { scenario, result }
            })
            .collect()
    }

    /// Homogenize the unit cell
    ///
    /// Persists the three unit state displacements as `rve/u<i>.json` and the
    /// tensor as `rve/effective_stiffness.json`.
    pub fn homogenize(&self) -> Result<Homogenization> {
        let (mesh, tags) = self.mesh(Scenario::Rve)?;
        let field = self.two_phase_field(&tags)?;
        let result = homogenization::homogenize(&mesh, &field, &self.config.solver)?;

        if let Some(store) = &self.store {
            let name = Scenario::Rve.name();
            for (state, u) in UnitStrain::ALL.iter().zip(&result.displacements) {
                store.save_displacement(name, Some(state.index()), u)?;
            }
            store.save_effective_stiffness(name, &result.effective)?;
        }
        Ok(result)
    }

    /// Fully resolved two-phase solve (tag 0 matrix, every other tag fiber)
    pub fn solve_direct(&self, scenario: Scenario) -> Result<MacroSolution> {
        self.require_presses(scenario)?;
        let (mesh, tags) = self.mesh(scenario)?;
        let field = self.two_phase_field(&tags)?;
        self.solve_macro(scenario, mesh, tags, &field)
    }

    /// Coarse solve with the homogenized tensor on the background
    ///
    /// Tag 0 takes `effective`, the press tag the matrix phase and the
    /// resolved fibers the fiber phase.
    pub fn solve_coarse(
        &self,
        scenario: Scenario,
        effective: &EffectiveStiffness,
    ) -> Result<MacroSolution> {
        if !scenario.is_homogenized() {
            return Err(Error::InvalidConfig(format!(
                "coarse solve needs the coarse or sparse block, got '{}'",
                scenario
            )));
        }
        let (mesh, tags) = self.mesh(scenario)?;

        let matrix = self.config.materials.matrix()?;
        let fiber = self.config.materials.fiber()?;
        let mut isotropic = BTreeMap::from([(PRESS_TAG, matrix)]);
        for tag in tags.distinct() {
            if tag != 0 && tag != PRESS_TAG {
                isotropic.insert(tag, fiber);
            }
        }
        let field = build_anisotropic_field(&tags, 0, effective, &isotropic)?;
        self.solve_macro(scenario, mesh, tags, &field)
    }

    /// Homogenize, then run the coarse solve on `scenario`
    pub fn run_two_scale(&self, scenario: Scenario) -> Result<(Homogenization, MacroSolution)> {
        let homogenized = self.homogenize()?;
        let solution = self.solve_coarse(scenario, &homogenized.effective)?;
        Ok((homogenized, solution))
    }

    fn two_phase_field(&self, tags: &CellTags) -> Result<StiffnessField> {
        let law = MaterialLaw::two_phase(
            self.config.materials.matrix()?,
            self.config.materials.fiber()?,
            tags.distinct(),
        );
        law.build_field(tags)
    }

    fn require_presses(&self, scenario: Scenario) -> Result<()> {
        if scenario.has_presses() {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!(
                "scenario '{}' has no press layout to clamp and load",
                scenario
            )))
        }
    }

    #[allow(non_snake_case)]
    fn solve_macro(
        &self,
        scenario: Scenario,
        mesh: Mesh,
        tags: CellTags,
        field: &StiffnessField,
    ) -> Result<MacroSolution> {
        let g = &self.config.geometry;
        let bottom_y = -g.press_height;
        let top_y = g.block_height + g.press_height;
        let eps = 1e-9 * (top_y - bottom_y);

        let bottom = find_boundary_edges(&mesh, |p| (p.y - bottom_y).abs() <= eps);
        let top = find_boundary_edges(&mesh, |p| (p.y - top_y).abs() <= eps);
        if bottom.is_empty() || top.is_empty() {
            return Err(Error::Meshing(format!(
                "{}: press faces not resolved ({} bottom, {} top edges)",
                scenario,
                bottom.len(),
                top.len()
            )));
        }

        let traction = Vector2::from(self.config.load.traction);
        let mut bcs = BoundaryConditions::new();
        bcs.add_dirichlet_edges(&bottom, Vector2::zeros());
        for edge in top {
            bcs.add_traction(edge, traction);
        }

        let mut dof_mgr = DofManager::new(mesh.num_nodes(), 2);
        let K = Assembler::assemble_elasticity_stiffness(&mesh, &dof_mgr, field)?;
        Assembler::constrain(&mut dof_mgr, &bcs);
        let f = Assembler::assemble_traction_load(&mesh, &dof_mgr, &bcs);

        let mut solver = linalg::from_config(&self.config.solver);
        let (u, stats) = Assembler::solve_constrained(&K, &f, &dof_mgr, solver.as_mut())?;

        let applied_force = f
            .chunks(2)
            .fold(Vector2::zeros(), |acc, c| acc + Vector2::new(c[0], c[1]));
        let clamped: Vec<usize> = bcs.dirichlet().iter().map(|&(node, _)| node).collect();
        let support_force = Assembler::resultant(&K, &u, &clamped, &dof_mgr);

        let solution = MacroSolution {
            scenario,
            mesh,
            tags,
            displacement: u,
            applied_force,
            support_force,
            iterations: stats.iterations,
        };
        info!(
            "{}: {} free DOFs, {} in {} iterations, max |u| = {:.3e}, equilibrium defect {:.2e}",
            scenario,
            dof_mgr.num_free_dofs(),
            solver.name(),
            stats.iterations,
            solution.max_displacement(),
            solution.equilibrium_defect()
        );

        if let Some(store) = &self.store {
            store.save_displacement(scenario.name(), None, &solution.displacement)?;
        }
        Ok(solution)
    }
}
