/// Element matrices for plane-strain elasticity
///
/// Linear triangles have constant strain, so every integral below is the
/// integrand times the cell area.

use nalgebra::{Point2, SMatrix, SVector, Vector3};
use crate::error::Result;
use super::{StiffnessTensor, StrainDisplacement};

/// Element matrix computations for linear elasticity
pub struct ElasticityElement;

/// Cell-averaged response of one element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellResponse {
    pub area: f64,
    /// [ε_xx, γ_xy, ε_yy]
    pub strain: Vector3<f64>,
    /// [σ_xx, σ_xy, σ_yy]
    pub stress: Vector3<f64>,
}

impl ElasticityElement {
    /// Compute element stiffness matrix for linear elasticity
    ///
    /// K_e = A B^T D B
    ///
    /// # Arguments
    /// * `vertices` - Physical coordinates of the 3 element vertices
    /// * `stiffness` - Plane constitutive tensor of the cell
    ///
    /// # Returns
    /// 6×6 element stiffness matrix (symmetric when D is)
    #[allow(non_snake_case)]
    pub fn stiffness_matrix(
        vertices: &[Point2<f64>; 3],
        stiffness: &StiffnessTensor,
    ) -> Result<SMatrix<f64, 6, 6>> {
        let B = StrainDisplacement::compute_b_for_cell(vertices)?;
        let area = crate::fem::Tri3Basis::area(vertices);

        let D = stiffness.matrix();
        let DB = D * B;
        Ok(area * B.transpose() * DB)
    }

    /// Strain and stress of a cell under nodal displacements `u_elem`
    #[allow(non_snake_case)]
    pub fn response(
        vertices: &[Point2<f64>; 3],
        stiffness: &StiffnessTensor,
        u_elem: &SVector<f64, 6>,
    ) -> Result<CellResponse> {
        let B = StrainDisplacement::compute_b_for_cell(vertices)?;
        let strain = StrainDisplacement::cell_strain(&B, u_elem);
        Ok(CellResponse {
            area: crate::fem::Tri3Basis::area(vertices),
            strain,
            stress: stiffness.stress(&strain),
        })
    }
}
