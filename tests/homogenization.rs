use approx::assert_relative_eq;
use composite_press::{Error, IsotropicElasticity, LinearSolverKind, Pipeline, PipelineConfig, Scenario, UnitStrain};

/// Unit cell at 16 cells per side, in memory only
fn config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.mesh.base_resolution = 160.0;
    config.output.persist = false;
    config
}

fn assert_tensor_eq(actual: &nalgebra::Matrix3<f64>, expected: &nalgebra::Matrix3<f64>, rel: f64) {
    let scale = expected.amax();
    for i in 0..3 {
        for j in 0..3 {
            assert_relative_eq!(actual[(i, j)], expected[(i, j)], epsilon = rel * scale);
        }
    }
}

#[test]
fn test_single_phase_matches_plane_strain_tensor() {
    let mut config = config();
    config.materials.fiber_youngs_modulus = config.materials.matrix_youngs_modulus;
    config.materials.fiber_poisson_ratio = config.materials.matrix_poisson_ratio;

    let result = Pipeline::new(config).unwrap().homogenize().unwrap();

    // E1 = 4e10, ν1 = 0.15
    let (lambda, mu) = IsotropicElasticity::new(4e10, 0.15).unwrap().lame_parameters();
    let c = result.effective.matrix();
    assert_relative_eq!(c[(0, 0)], lambda + 2.0 * mu, max_relative = 1e-6);
    assert_relative_eq!(c[(0, 2)], lambda, max_relative = 1e-6);
    assert_relative_eq!(c[(1, 1)], mu, max_relative = 1e-6);
    assert!(c[(0, 1)].abs() < 1e-6 * c[(0, 0)]);
}

#[test]
fn test_unit_contrast_reduces_to_isotropic() {
    let mut config = config();
    config.materials.fiber_youngs_modulus = 7e10;
    config.materials.fiber_poisson_ratio = 0.2;
    config.materials.matrix_youngs_modulus = 7e10;
    config.materials.matrix_poisson_ratio = 0.2;

    let result = Pipeline::new(config).unwrap().homogenize().unwrap();
    let expected = IsotropicElasticity::new(7e10, 0.2).unwrap().constitutive_matrix();
    assert_tensor_eq(result.effective.matrix(), expected.matrix(), 1e-6);
}

#[test]
fn test_fibers_stiffen_the_composite() {
    let config = config();
    let matrix = config.materials.matrix().unwrap().constitutive_matrix();
    let fiber = config.materials.fiber().unwrap().constitutive_matrix();

    let result = Pipeline::new(config).unwrap().homogenize().unwrap();
    let c = result.effective.matrix();

    for k in [(0, 0), (1, 1), (2, 2)] {
        assert!(c[k] > matrix.matrix()[k], "{:?}: {} <= matrix", k, c[k]);
        assert!(c[k] < fiber.matrix()[k], "{:?}: {} >= fiber", k, c[k]);
    }
    // Fibers are wider than tall: stiffer along x
    assert!(c[(0, 0)] > c[(2, 2)]);
    assert!(result.effective.symmetry_defect() < 1e-3);
}

#[test]
fn test_homogenization_is_deterministic() {
    let pipeline = Pipeline::new(config()).unwrap();
    let first = pipeline.homogenize().unwrap();
    let second = pipeline.homogenize().unwrap();
    assert_eq!(first.effective, second.effective);
    assert_eq!(first.displacements, second.displacements);
}

#[test]
fn test_incompressible_phase_is_rejected() {
    let mut config = config();
    config.materials.matrix_poisson_ratio = 0.5;
    assert!(matches!(Pipeline::new(config), Err(Error::InvalidMaterial(_))));
}

#[test]
fn test_cg_reproduces_boundary_displacements() {
    // Default CG settings, stiff fibers against unit-order boundary data
    let pipeline = Pipeline::new(config()).unwrap();
    let (mesh, _) = pipeline.mesh(Scenario::Rve).unwrap();
    let result = pipeline.homogenize().unwrap();

    for (state, u) in UnitStrain::ALL.iter().zip(&result.displacements) {
        for node in mesh.boundary_nodes() {
            let g = state.displacement(&mesh.nodes[node]);
            assert_eq!([u[2 * node], u[2 * node + 1]], g, "{:?} at node {}", state, node);
        }

        let avg = result.effective.averaged_strain(*state).unwrap();
        for k in 0..3 {
            let expected = if k == state.index() { 1.0 } else { 0.0 };
            assert_relative_eq!(avg[k], expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_cg_and_lu_agree_on_effective_tensor() {
    let mut iterative = config();
    iterative.solver.linear_solver = LinearSolverKind::Cg;
    iterative.solver.tolerance = 1e-12;
    let mut direct = config();
    direct.solver.linear_solver = LinearSolverKind::Direct;

    let cg = Pipeline::new(iterative).unwrap().homogenize().unwrap();
    let lu = Pipeline::new(direct).unwrap().homogenize().unwrap();

    assert_tensor_eq(cg.effective.matrix(), lu.effective.matrix(), 1e-9);
    assert!(cg.effective.symmetry_defect() < 1e-9);
    assert!(lu.effective.symmetry_defect() < 1e-9);
}
