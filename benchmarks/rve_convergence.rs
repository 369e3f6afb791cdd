/// Convergence of the homogenized stiffness with unit-cell resolution
///
/// The unit cell is meshed at increasing resolution and homogenized. Each
/// entry of the effective tensor should settle as the fiber boundary is
/// resolved more finely; the table reports the change against the previous
/// level. A single-phase cell is run first as a sanity check: linear
/// triangles reproduce affine fields exactly, so its error is solver noise.

use composite_press::*;
use std::time::Instant;

fn main() {
    println!("=== RVE Homogenization Convergence ===\n");

    let mut base = PipelineConfig::default();
    base.output.persist = false;

    // Sanity check: single phase
    let mut single = base.clone();
    single.materials.fiber_youngs_modulus = single.materials.matrix_youngs_modulus;
    single.materials.fiber_poisson_ratio = single.materials.matrix_poisson_ratio;
    let exact = single
        .materials
        .matrix()
        .expect("valid matrix phase")
        .constitutive_matrix();
    let result = Pipeline::new(single)
        .and_then(|p| p.homogenize())
        .expect("single-phase homogenization");
    let err = (result.effective.matrix() - exact.matrix()).amax() / exact.matrix().amax();
    println!("Single phase: max relative error {:.2e}", err);
    if err < 1e-6 {
        println!("  ✓ PASS\n");
    } else {
        println!("  ✗ FAIL\n");
    }

    println!("{:>10} {:>8} {:>12} {:>12} {:>12} {:>10} {:>8}",
             "resolution", "cells", "C00", "C11", "C22", "change", "time");

    let mut previous: Option<nalgebra::Matrix3<f64>> = None;
    for base_resolution in [40.0, 80.0, 160.0, 320.0, 640.0] {
        let mut config = base.clone();
        config.mesh.base_resolution = base_resolution;
        let pipeline = Pipeline::new(config).expect("valid configuration");

        let start = Instant::now();
        let cells = pipeline
            .mesh(Scenario::Rve)
            .map(|(mesh, _)| mesh.num_cells())
            .expect("rve mesh");
        let result = match pipeline.homogenize() {
            Ok(r) => r,
            Err(e) => {
                println!("{:>10} failed: {}", base_resolution, e);
                continue;
            }
        };
        let elapsed = start.elapsed().as_secs_f64();

        let c = *result.effective.matrix();
        let change = previous
            .map(|p| format!("{:.2e}", (c - p).amax() / c.amax()))
            .unwrap_or_else(|| "-".to_string());
        println!("{:>10} {:>8} {:>12.4e} {:>12.4e} {:>12.4e} {:>10} {:>7.2}s",
                 Scenario::Rve.resolution(pipeline.config()), cells,
                 c[(0, 0)], c[(1, 1)], c[(2, 2)], change, elapsed);
        previous = Some(c);
    }
}
