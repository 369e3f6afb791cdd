use nalgebra::{DMatrix, DVector};
use sprs::CsMat;
use std::time::Instant;

use super::solver::{residual_norms, Solver, SolverStats};
use crate::error::{Error, Result};

/// Dense LU fallback
///
/// Densifies the system, so memory grows with the square of the DOF count.
/// Meant for unit cells and reference solves in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSolver;

impl DirectSolver {
    pub fn new() -> Self {
        Self
    }

    #[allow(non_snake_case)]
    fn densify(A: &CsMat<f64>) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(A.rows(), A.cols());
        for (&value, (i, j)) in A.iter() {
            dense[(i, j)] += value;
        }
        dense
    }
}

impl Solver for DirectSolver {
    #[allow(non_snake_case)]
    fn solve(&mut self, A: &CsMat<f64>, b: &[f64]) -> Result<(Vec<f64>, SolverStats)> {
        let start = Instant::now();
        let n = b.len();

        let x = Self::densify(A)
            .lu()
            .solve(&DVector::from_column_slice(b))
            .ok_or_else(|| Error::SingularSystem(format!("{}x{} stiffness matrix has no LU solution", n, n)))?;
        if !x.iter().all(|v| v.is_finite()) {
            return Err(Error::SingularSystem("LU solve produced non-finite values".to_string()));
        }
        let x = x.as_slice().to_vec();

        let (residual_norm, relative_residual) = residual_norms(A, &x, b);
        let stats = SolverStats {
            iterations: 0,
            residual_norm,
            relative_residual,
            converged: relative_residual < 1e-8,
            solve_time: start.elapsed().as_secs_f64(),
        };
        Ok((x, stats))
    }

    fn name(&self) -> &str {
        "dense LU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;
    use approx::assert_relative_eq;

    #[test]
    #[allow(non_snake_case)]
    fn test_direct_solver_simple() {
        // Solve [2 1; 1 2] x = [3; 3]
        // Solution: x = [1; 1]
        let mut triplets = TriMat::new((2, 2));
        triplets.add_triplet(0, 0, 2.0);
        triplets.add_triplet(0, 1, 1.0);
        triplets.add_triplet(1, 0, 1.0);
        triplets.add_triplet(1, 1, 2.0);
        let A = triplets.to_csr();

        let b = vec![3.0, 3.0];

        let mut solver = DirectSolver::new();
        let (x, stats) = solver.solve(&A, &b).unwrap();

        assert_relative_eq!(x[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-10);
        assert!(stats.converged);
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_singular_matrix_is_error() {
        // Rank-one matrix [1 1; 1 1]
        let mut triplets = TriMat::new((2, 2));
        for i in 0..2 {
            for j in 0..2 {
                triplets.add_triplet(i, j, 1.0);
            }
        }
        let A = triplets.to_csr();

        let mut solver = DirectSolver::new();
        let result = solver.solve(&A, &[1.0, 2.0]);
        assert!(matches!(result, Err(Error::SingularSystem(_))));
    }
}
