//! Unit-cell homogenization by kinematically uniform boundary conditions
//!
//! Each of the three unit strain states prescribes an affine displacement on
//! every boundary node of the cell mesh. Volume averages of the resulting
//! stress, divided by the averaged driving strain, give one column of the
//! effective plane stiffness (Voigt order `[xx, xy, yy]`, engineering shear).

use nalgebra::{Matrix3, Point2, SVector, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::fem::{Assembler, DofManager};
use crate::linalg::{self, Solver};
use crate::mechanics::{ElasticityElement, StiffnessField, StiffnessTensor};
use crate::mesh::Mesh;

/// Macroscopic strain states, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStrain {
    /// u = (x, 0)
    NormalX,
    /// u = (y/2, x/2)
    Shear,
    /// u = (0, y)
    NormalY,
}

impl UnitStrain {
    pub const ALL: [UnitStrain; 3] = [UnitStrain::NormalX, UnitStrain::Shear, UnitStrain::NormalY];

    /// Column of the effective tensor, equal to the Voigt index of the driving strain
    pub fn index(self) -> usize {
        match self {
            UnitStrain::NormalX => 0,
            UnitStrain::Shear => 1,
            UnitStrain::NormalY => 2,
        }
    }

    /// Prescribed boundary displacement at `p`
    pub fn displacement(self, p: &Point2<f64>) -> [f64; 2] {
        match self {
            UnitStrain::NormalX => [p.x, 0.0],
            UnitStrain::Shear => [0.5 * p.y, 0.5 * p.x],
            UnitStrain::NormalY => [0.0, p.y],
        }
    }
}

/// Integrals of strain and stress over the cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateIntegrals {
    pub area: f64,
    pub strain: Vector3<f64>,
    pub stress: Vector3<f64>,
}

impl StateIntegrals {
    pub fn averaged_strain(&self) -> Vector3<f64> {
        self.strain / self.area
    }

    pub fn averaged_stress(&self) -> Vector3<f64> {
        self.stress / self.area
    }
}

/// Effective stiffness with the per-state diagnostics it was built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveStiffness {
    tensor: StiffnessTensor,
    /// Volume-averaged strain of each unit state (indexed like the columns)
    averaged_strains: Vec<Vector3<f64>>,
}

impl EffectiveStiffness {
    /// Wrap a known tensor (no diagnostics)
    pub fn from_tensor(tensor: StiffnessTensor) -> Self {
        Self {
            tensor,
            averaged_strains: Vec::new(),
        }
    }

    /// Assemble the tensor from the integrals of the three unit states
    ///
    /// # Errors
    /// `Homogenization` if a driving strain integral vanishes or a column is not finite.
    pub fn from_integrals(states: &[(UnitStrain, StateIntegrals)]) -> Result<Self> {
        let mut matrix = Matrix3::zeros();
        let mut averaged_strains = vec![Vector3::zeros(); 3];

        for &(state, integrals) in states {
            let i = state.index();
            let driving = integrals.strain[i];
            if !(driving.abs() > f64::EPSILON * integrals.area) {
                return Err(Error::Homogenization(format!(
                    "driving strain of state {:?} vanishes ({:e})",
                    state, driving
                )));
            }

            let column = integrals.stress / driving;
            if column.iter().any(|v| !v.is_finite()) {
                return Err(Error::Homogenization(format!(
                    "non-finite stiffness column for state {:?}",
                    state
                )));
            }
            matrix.set_column(i, &column);
            averaged_strains[i] = integrals.averaged_strain();
        }

        Ok(Self {
            tensor: StiffnessTensor(matrix),
            averaged_strains,
        })
    }

    pub fn tensor(&self) -> StiffnessTensor {
        self.tensor
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        self.tensor.matrix()
    }

    pub fn averaged_strain(&self, state: UnitStrain) -> Option<Vector3<f64>> {
        self.averaged_strains.get(state.index()).copied()
    }

    /// `max |C_ij - C_ji| / max |C_ij|`
    pub fn symmetry_defect(&self) -> f64 {
        let m = self.matrix();
        let scale = m.amax();
        if scale == 0.0 {
            return 0.0;
        }
        (m - m.transpose()).amax() / scale
    }
}

/// Solve one unit strain state on the cell mesh
///
/// Returns the interleaved nodal displacement vector.
#[allow(non_snake_case)]
pub fn solve_unit_strain(
    mesh: &Mesh,
    field: &StiffnessField,
    state: UnitStrain,
    solver: &mut dyn Solver,
) -> Result<Vec<f64>> {
    let mut dof_mgr = DofManager::new(mesh.num_nodes(), 2);
    let K = Assembler::assemble_elasticity_stiffness(mesh, &dof_mgr, field)?;

    for node in mesh.boundary_nodes() {
        dof_mgr.set_dirichlet_node(node, &state.displacement(&mesh.nodes[node]));
    }

    let f = vec![0.0; dof_mgr.total_dofs()];
    let (u, stats) = Assembler::solve_constrained(&K, &f, &dof_mgr, solver)?;

    debug!(
        "{:?}: {} free DOFs, {} ({} iterations, residual {:.2e})",
        state,
        dof_mgr.num_free_dofs(),
        solver.name(),
        stats.iterations,
        stats.relative_residual
    );
    Ok(u)
}

/// Integrate strain and stress of a displacement field over the mesh
pub fn integrate_response(mesh: &Mesh, field: &StiffnessField, u: &[f64]) -> Result<StateIntegrals> {
    let mut total = StateIntegrals {
        area: 0.0,
        strain: Vector3::zeros(),
        stress: Vector3::zeros(),
    };

    for (c, cell) in mesh.cells.iter().enumerate() {
        let mut u_elem = SVector::<f64, 6>::zeros();
        for (k, &node) in cell.iter().enumerate() {
            u_elem[2 * k] = u[2 * node];
            u_elem[2 * k + 1] = u[2 * node + 1];
        }
        let r = ElasticityElement::response(&mesh.cell_vertices(c), field.get(c), &u_elem)?;
        total.area += r.area;
        total.strain += r.strain * r.area;
        total.stress += r.stress * r.area;
    }

    Ok(total)
}

/// Effective stiffness plus the displacement of each unit state
#[derive(Debug, Clone)]
pub struct Homogenization {
    pub effective: EffectiveStiffness,
    /// Displacements indexed like [`UnitStrain::ALL`]
    pub displacements: Vec<Vec<f64>>,
}

/// Homogenize a unit cell
///
/// The three states are independent and run on the Rayon pool, each with its
/// own solver built from `solver_config`.
pub fn homogenize(
    mesh: &Mesh,
    field: &StiffnessField,
    solver_config: &SolverConfig,
) -> Result<Homogenization> {
    let solved: Vec<(UnitStrain, Vec<f64>, StateIntegrals)> = UnitStrain::ALL
        .par_iter()
        .map(|&state| -> Result<(UnitStrain, Vec<f64>, StateIntegrals)> {
            let mut solver = linalg::from_config(solver_config);
            let u = solve_unit_strain(mesh, field, state, solver.as_mut())?;
            let integrals = integrate_response(mesh, field, &u)?;
            Ok((state, u, integrals))
        })
        .collect::<Result<_>>()?;

    let integrals: Vec<(UnitStrain, StateIntegrals)> =
        solved.iter().map(|(state, _, i)| (*state, *i)).collect();
    let effective = EffectiveStiffness::from_integrals(&integrals)?;

    for (state, _, i) in &solved {
        debug!("{:?}: averaged strain {:?}", state, i.averaged_strain().as_slice());
    }
    info!(
        "Effective stiffness {:?} (symmetry defect {:.2e})",
        effective.tensor().to_row_major(),
        effective.symmetry_defect()
    );

    Ok(Homogenization {
        effective,
        displacements: solved.into_iter().map(|(_, u, _)| u).collect(),
    })
}
