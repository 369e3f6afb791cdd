use sprs::CsMat;
use crate::config::{LinearSolverKind, SolverConfig};
use crate::error::Result;

/// Outcome of one linear solve
#[derive(Debug, Clone, Default)]
pub struct SolverStats {
    /// Iterations taken (0 for direct solvers)
    pub iterations: usize,
    /// ||b - Ax||
    pub residual_norm: f64,
    /// ||b - Ax|| / ||b||
    pub relative_residual: f64,
    pub converged: bool,
    /// Wall time in seconds
    pub solve_time: f64,
}

/// Matrix-free action `v -> A v`
pub trait LinearOperator {
    fn apply(&self, v: &[f64]) -> Vec<f64>;
}

impl LinearOperator for CsMat<f64> {
    fn apply(&self, v: &[f64]) -> Vec<f64> {
        self.outer_iterator()
            .map(|row| row.iter().map(|(col, &val)| val * v[col]).sum())
            .collect()
    }
}

/// A linear solver for the assembled stiffness system
///
/// A solver that cannot reach its tolerance returns an error rather than a
/// partial solution.
pub trait Solver: Send {
    /// Solve `A x = b` from a zero initial guess
    #[allow(non_snake_case)]
    fn solve(&mut self, A: &CsMat<f64>, b: &[f64]) -> Result<(Vec<f64>, SolverStats)>;

    fn name(&self) -> &str;
}

/// Build the solver selected in the configuration
pub fn from_config(config: &SolverConfig) -> Box<dyn Solver> {
    match config.linear_solver {
        LinearSolverKind::Cg => Box::new(
            super::ConjugateGradient::new()
                .with_tolerance(config.tolerance)
                .with_max_iterations(config.max_iterations),
        ),
        LinearSolverKind::Direct => Box::new(super::DirectSolver::new()),
    }
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean norm
pub fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// `b - a x`
pub fn residual<O: LinearOperator>(a: &O, x: &[f64], b: &[f64]) -> Vec<f64> {
    let mut r = a.apply(x);
    for (ri, bi) in r.iter_mut().zip(b) {
        *ri = bi - *ri;
    }
    r
}

/// Absolute and relative residual norms of `x`
///
/// The relative value falls back to the absolute one when `b` vanishes.
pub fn residual_norms<O: LinearOperator>(a: &O, x: &[f64], b: &[f64]) -> (f64, f64) {
    let r_norm = norm(&residual(a, x, b));
    let b_norm = norm(b);
    let relative = if b_norm > 0.0 { r_norm / b_norm } else { r_norm };
    (r_norm, relative)
}
