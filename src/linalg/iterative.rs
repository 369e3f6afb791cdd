use sprs::CsMat;
use std::time::Instant;
use tracing::debug;

use super::preconditioner::{IdentityPreconditioner, JacobiPreconditioner, Preconditioner};
use super::solver::{dot, norm, LinearOperator, Solver, SolverStats};
use crate::error::{Error, Result};

/// Preconditioned conjugate gradient
///
/// Requires a symmetric positive definite operator, which the constrained
/// elasticity systems are once every rigid mode is clamped. Starts from zero
/// and stops when `||r|| <= tolerance * ||b||`.
pub struct ConjugateGradient {
    max_iterations: usize,
    tolerance: f64,
    jacobi: bool,
}

impl ConjugateGradient {
    pub fn new() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-8,
            jacobi: true,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Toggle diagonal scaling (on by default)
    pub fn with_jacobi(mut self, jacobi: bool) -> Self {
        self.jacobi = jacobi;
        self
    }

    pub fn solve_with_operator<O, P>(&self, a: &O, b: &[f64], precond: &P) -> Result<(Vec<f64>, SolverStats)>
    where
        O: LinearOperator,
        P: Preconditioner,
    {
        let start = Instant::now();
        let b_norm = norm(b);
        let mut x = vec![0.0; b.len()];

        if b_norm == 0.0 {
            return Ok((x, SolverStats { converged: true, ..SolverStats::default() }));
        }

        let target = self.tolerance * b_norm;
        let mut r = b.to_vec();
        let mut z = precond.apply(&r);
        let mut p = z.clone();
        let mut rz = dot(&r, &z);
        let mut r_norm = b_norm;
        let mut iterations = 0;

        while iterations < self.max_iterations && r_norm > target {
            let ap = a.apply(&p);
            let curvature = dot(&p, &ap);
            if !(curvature > 0.0) {
                // Operator is not positive definite along p
                break;
            }
            let alpha = rz / curvature;
            for ((xi, ri), (pi, api)) in x.iter_mut().zip(r.iter_mut()).zip(p.iter().zip(&ap)) {
                *xi += alpha * pi;
                *ri -= alpha * api;
            }
            iterations += 1;
            r_norm = norm(&r);

            z = precond.apply(&r);
            let rz_next = dot(&r, &z);
            let beta = rz_next / rz;
            rz = rz_next;
            for (pi, zi) in p.iter_mut().zip(&z) {
                *pi = zi + beta * *pi;
            }
        }

        let stats = SolverStats {
            iterations,
            residual_norm: r_norm,
            relative_residual: r_norm / b_norm,
            converged: r_norm <= target,
            solve_time: start.elapsed().as_secs_f64(),
        };
        if !stats.converged {
            return Err(Error::SolverDivergence {
                iterations,
                residual: stats.relative_residual,
            });
        }

        debug!(
            "CG converged in {} iterations (relative residual {:.2e}, {:.3}s)",
            iterations, stats.relative_residual, stats.solve_time
        );
        Ok((x, stats))
    }
}

impl Default for ConjugateGradient {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for ConjugateGradient {
    fn solve(&mut self, a: &CsMat<f64>, b: &[f64]) -> Result<(Vec<f64>, SolverStats)> {
        if self.jacobi {
            self.solve_with_operator(a, b, &JacobiPreconditioner::new(a))
        } else {
            self.solve_with_operator(a, b, &IdentityPreconditioner)
        }
    }

    fn name(&self) -> &str {
        "ConjugateGradient"
    }
}
