/// Strain-displacement relationships for plane-strain solids
///
/// Implements the B-matrix that relates nodal displacements to element strains.

use nalgebra::{Point2, SMatrix, SVector, Vector3};
use crate::error::{Error, Result};
use crate::fem::Tri3Basis;

/// Strain-displacement matrix computations
pub struct StrainDisplacement;

impl StrainDisplacement {
    /// Compute 3×6 strain-displacement matrix B from shape function derivatives
    ///
    /// Relates nodal displacements to element strains: ε = B · u_e
    ///
    /// # Arguments
    /// * `dN_dx` - Shape function derivatives [∂N_i/∂x, ∂N_i/∂y] for i=0..2
    ///
    /// # Returns
    /// B matrix (3×6) where:
    /// - Rows: [ε_xx, γ_xy, ε_yy]
    /// - Columns: [u_0x, u_0y, u_1x, u_1y, u_2x, u_2y]
    ///
    /// For each node i, columns 2i, 2i+1 are:
    /// ```text
    ///     [∂N_i/∂x    0     ]   (ε_xx = ∂u_x/∂x)
    ///     [∂N_i/∂y  ∂N_i/∂x ]   (γ_xy = ∂u_x/∂y + ∂u_y/∂x)
    ///     [  0      ∂N_i/∂y ]   (ε_yy = ∂u_y/∂y)
    /// ```
    #[allow(non_snake_case)]
    pub fn compute_b_matrix(dN_dx: &[[f64; 2]; 3]) -> SMatrix<f64, 3, 6> {
        let mut B = SMatrix::<f64, 3, 6>::zeros();

        for i in 0..3 {
            let col_base = 2 * i;

            let dNi_dx = dN_dx[i][0];
            let dNi_dy = dN_dx[i][1];

            B[(0, col_base)] = dNi_dx;

            B[(1, col_base)] = dNi_dy;
            B[(1, col_base + 1)] = dNi_dx;

            B[(2, col_base + 1)] = dNi_dy;
        }

        B
    }

    /// B-matrix of a physical triangle
    ///
    /// # Errors
    /// `Meshing` if the triangle is degenerate
    pub fn compute_b_for_cell(vertices: &[Point2<f64>; 3]) -> Result<SMatrix<f64, 3, 6>> {
        let dn_dx = Tri3Basis::shape_derivatives_cartesian(vertices).ok_or_else(|| {
            Error::Meshing(format!("degenerate triangle {:?}", vertices))
        })?;
        Ok(Self::compute_b_matrix(&dn_dx))
    }

    /// Constant strain of a linear triangle
    #[allow(non_snake_case)]
    pub fn cell_strain(B: &SMatrix<f64, 3, 6>, u_elem: &SVector<f64, 6>) -> Vector3<f64> {
        B * u_elem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    #[allow(non_snake_case)]
    fn test_affine_displacement_gives_exact_strain() {
        let v = [Point2::new(0.1, 0.2), Point2::new(0.9, 0.1), Point2::new(0.4, 0.8)];
        let B = StrainDisplacement::compute_b_for_cell(&v).unwrap();

        // u = (a x + b y, c x + d y) → ε = (a, b + c, d)
        let (a, b, c, d) = (1e-3, 2e-3, -5e-4, 3e-3);
        let mut u = SVector::<f64, 6>::zeros();
        for i in 0..3 {
            u[2 * i] = a * v[i].x + b * v[i].y;
            u[2 * i + 1] = c * v[i].x + d * v[i].y;
        }

        let eps = StrainDisplacement::cell_strain(&B, &u);
        assert_relative_eq!(eps[0], a, epsilon = 1e-14);
        assert_relative_eq!(eps[1], b + c, epsilon = 1e-14);
        assert_relative_eq!(eps[2], d, epsilon = 1e-14);
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_rigid_motion_is_strain_free() {
        let v = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        let B = StrainDisplacement::compute_b_for_cell(&v).unwrap();

        // Infinitesimal rotation u = (-θ y, θ x) plus translation
        let theta = 1e-2;
        let mut u = SVector::<f64, 6>::zeros();
        for i in 0..3 {
            u[2 * i] = 0.3 - theta * v[i].y;
            u[2 * i + 1] = -0.1 + theta * v[i].x;
        }
        let eps = StrainDisplacement::cell_strain(&B, &u);
        assert!(eps.norm() < 1e-15);
    }

    #[test]
    fn test_degenerate_cell_is_error() {
        let v = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)];
        assert!(StrainDisplacement::compute_b_for_cell(&v).is_err());
    }
}
