use nalgebra::{SMatrix, Vector2};
use sprs::{CsMat, TriMat};
use rayon::prelude::*;
use crate::error::{Error, Result};
use crate::fem::{BoundaryConditions, DofManager};
use crate::linalg::{Solver, SolverStats};
use crate::mechanics::{ElasticityElement, StiffnessField};
use crate::mesh::Mesh;

/// Builds the global plane-strain system from per-cell stiffness tensors
pub struct Assembler;

impl Assembler {
    /// Sum of the 6×6 element matrices into a CSR matrix
    ///
    /// Element matrices are computed in parallel and scattered in cell order,
    /// so the result does not depend on the thread count.
    #[allow(non_snake_case)]
    pub fn assemble_elasticity_stiffness(
        mesh: &Mesh,
        dof_mgr: &DofManager,
        field: &StiffnessField,
    ) -> Result<CsMat<f64>> {
        if dof_mgr.dofs_per_node() != 2 {
            return Err(Error::InvalidConfig(format!(
                "plane elasticity needs 2 DOF per node, got {}",
                dof_mgr.dofs_per_node()
            )));
        }
        if field.len() != mesh.num_cells() {
            return Err(Error::InvalidConfig(format!(
                "coefficient field has {} entries for {} cells",
                field.len(),
                mesh.num_cells()
            )));
        }

        let local: Vec<SMatrix<f64, 6, 6>> = (0..mesh.num_cells())
            .into_par_iter()
            .map(|c| ElasticityElement::stiffness_matrix(&mesh.cell_vertices(c), field.get(c)))
            .collect::<Result<_>>()?;

        let size = dof_mgr.total_dofs();
        let mut K = TriMat::with_capacity((size, size), 36 * mesh.num_cells());
        for (cell, Ke) in mesh.cells.iter().zip(&local) {
            // Element DOF 2a + c belongs to vertex a, component c
            let dofs: [usize; 6] = std::array::from_fn(|k| dof_mgr.global_dof(cell[k / 2], k % 2));
            for (r, &row) in dofs.iter().enumerate() {
                for (c, &col) in dofs.iter().enumerate() {
                    K.add_triplet(row, col, Ke[(r, c)]);
                }
            }
        }

        Ok(K.to_csr())
    }

    /// Assemble the load vector of the traction boundary conditions
    ///
    /// f_i = Σ_edges ∫ N_i t ds
    pub fn assemble_traction_load(
        mesh: &Mesh,
        dof_mgr: &DofManager,
        bcs: &BoundaryConditions,
    ) -> Vec<f64> {
        let mut f = vec![0.0; dof_mgr.total_dofs()];

        for (edge, bc) in bcs.traction_edges() {
            let forces = edge.integrate_traction(&mesh.nodes, &bc.traction);
            for (k, &node) in edge.nodes.iter().enumerate() {
                f[dof_mgr.global_dof(node, 0)] += forces[k].x;
                f[dof_mgr.global_dof(node, 1)] += forces[k].y;
            }
        }

        f
    }

    /// Register the Dirichlet nodes of `bcs` with the DOF manager
    pub fn constrain(dof_mgr: &mut DofManager, bcs: &BoundaryConditions) {
        for &(node, value) in bcs.dirichlet() {
            dof_mgr.set_dirichlet_node(node, value.as_slice());
        }
    }

    /// Solve `K u = f` with the prescribed DOFs of `dof_mgr` held fixed
    ///
    /// Only the free block `K_ff u_f = f_f - K_fc g` reaches the solver, so an
    /// iterative tolerance never applies to prescribed values. Constrained
    /// entries of the returned vector are exactly their prescribed values.
    #[allow(non_snake_case)]
    pub fn solve_constrained(
        K: &CsMat<f64>,
        f: &[f64],
        dof_mgr: &DofManager,
        solver: &mut dyn Solver,
    ) -> Result<(Vec<f64>, SolverStats)> {
        let size = dof_mgr.total_dofs();
        let mut free = Vec::with_capacity(dof_mgr.num_free_dofs());
        // Position of each free DOF in the reduced system
        let slots: Vec<Option<usize>> = (0..size)
            .map(|d| {
                if dof_mgr.is_dirichlet(d) {
                    None
                } else {
                    free.push(d);
                    Some(free.len() - 1)
                }
            })
            .collect();

        let mut u: Vec<f64> = (0..size).map(|d| dof_mgr.get_dirichlet_value(d)).collect();
        if free.is_empty() {
            return Ok((u, SolverStats { converged: true, ..SolverStats::default() }));
        }

        let mut rhs: Vec<f64> = free.iter().map(|&d| f[d]).collect();
        let mut K_ff = TriMat::with_capacity((free.len(), free.len()), K.nnz());
        for (i, row) in K.outer_iterator().enumerate() {
            let Some(ri) = slots[i] else { continue };
            for (j, &k_ij) in row.iter() {
                match slots[j] {
                    Some(rj) => K_ff.add_triplet(ri, rj, k_ij),
                    None => rhs[ri] -= k_ij * u[j],
                }
            }
        }

        let (u_free, stats) = solver.solve(&K_ff.to_csr(), &rhs)?;
        for (&d, value) in free.iter().zip(u_free) {
            u[d] = value;
        }
        Ok((u, stats))
    }

    /// Nodal reaction forces `K u` summed over a node set
    #[allow(non_snake_case)]
    pub fn resultant(K: &CsMat<f64>, u: &[f64], nodes: &[usize], dof_mgr: &DofManager) -> Vector2<f64> {
        let ku = crate::linalg::LinearOperator::apply(K, u);
        nodes.iter().fold(Vector2::zeros(), |acc, &n| {
            acc + Vector2::new(ku[dof_mgr.global_dof(n, 0)], ku[dof_mgr.global_dof(n, 1)])
        })
    }
}
