/// Coarse (homogenized) block against the fully resolved block
///
/// Both solves clamp the lower presses and push the upper press down with the
/// configured traction. The homogenized solve replaces the fibers of the block
/// by the effective tensor of the unit cell; the sparse variant keeps the
/// fibers right under the presses. The peak displacement of each is compared
/// against the resolved reference.

use composite_press::*;
use std::time::Instant;

fn run<F>(label: &str, solve: F) -> Option<MacroSolution>
where
    F: FnOnce() -> Result<MacroSolution>,
{
    let start = Instant::now();
    match solve() {
        Ok(solution) => {
            println!("{:<10} {:>8} {:>8} {:>14.6e} {:>10.2e} {:>7.2}s",
                     label, solution.mesh.num_cells(), solution.iterations,
                     solution.max_displacement(), solution.equilibrium_defect(),
                     start.elapsed().as_secs_f64());
            Some(solution)
        }
        Err(e) => {
            println!("{:<10} failed: {}", label, e);
            None
        }
    }
}

fn main() {
    println!("=== Coarse vs Resolved Pressed Block ===\n");

    let mut config = PipelineConfig::default();
    config.output.persist = false;
    let pipeline = Pipeline::new(config).expect("valid configuration");

    let effective = pipeline.homogenize().expect("homogenization").effective;
    let c = effective.matrix();
    println!("Effective stiffness:");
    for i in 0..3 {
        println!("  {:>12.4e} {:>12.4e} {:>12.4e}", c[(i, 0)], c[(i, 1)], c[(i, 2)]);
    }
    println!();

    println!("{:<10} {:>8} {:>8} {:>14} {:>10} {:>8}",
             "scenario", "cells", "iters", "max |u|", "balance", "time");
    let resolved = run("block", || pipeline.solve_direct(Scenario::Block));
    let coarse = run("coarse", || pipeline.solve_coarse(Scenario::Coarse, &effective));
    let sparse = run("sparse", || pipeline.solve_coarse(Scenario::Sparse, &effective));

    if let Some(reference) = resolved {
        let u_ref = reference.max_displacement();
        println!();
        for solution in [coarse, sparse].into_iter().flatten() {
            let rel = (solution.max_displacement() - u_ref).abs() / u_ref;
            println!("{:<10} peak displacement off by {:.2}%", solution.scenario, 100.0 * rel);
        }
    }
}
