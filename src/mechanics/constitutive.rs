/// Constitutive models for plane-strain elasticity
///
/// Stress and strain use the Voigt ordering shared by the whole crate:
/// strain `[ε_xx, γ_xy, ε_yy]` with `γ_xy = 2 ε_xy`, stress
/// `[σ_xx, σ_xy, σ_yy]`.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// One isotropic phase, given by Young's modulus (Pa) and Poisson's ratio
///
/// Deserialization goes through [`IsotropicElasticity::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElasticConstants")]
pub struct IsotropicElasticity {
    pub youngs_modulus: f64,
    pub poisson_ratio: f64,
}

/// Unchecked wire form of [`IsotropicElasticity`]
#[derive(Deserialize)]
struct ElasticConstants {
    youngs_modulus: f64,
    poisson_ratio: f64,
}

impl TryFrom<ElasticConstants> for IsotropicElasticity {
    type Error = Error;

    fn try_from(c: ElasticConstants) -> Result<Self> {
        Self::new(c.youngs_modulus, c.poisson_ratio)
    }
}

impl IsotropicElasticity {
    /// # Errors
    /// `InvalidMaterial` unless `E > 0` and `-1 < ν < 0.5`. The upper bound is
    /// strict because the plane-strain λ blows up at ν = 0.5.
    pub fn new(youngs_modulus: f64, poisson_ratio: f64) -> Result<Self> {
        if !(youngs_modulus > 0.0 && youngs_modulus.is_finite()) {
            return Err(Error::InvalidMaterial(format!(
                "Young's modulus must be positive, got {}",
                youngs_modulus
            )));
        }
        if !(poisson_ratio > -1.0 && poisson_ratio < 0.5) {
            return Err(Error::InvalidMaterial(format!(
                "Poisson's ratio must be in (-1, 0.5), got {}",
                poisson_ratio
            )));
        }
        Ok(Self { youngs_modulus, poisson_ratio })
    }

    /// `(λ, μ)` with `λ = Eν / ((1+ν)(1-2ν))` and `μ = E / (2(1+ν))`
    pub fn lame_parameters(&self) -> (f64, f64) {
        let (e, nu) = (self.youngs_modulus, self.poisson_ratio);
        let mu = 0.5 * e / (1.0 + nu);
        let lambda = 2.0 * mu * nu / (1.0 - 2.0 * nu);
        (lambda, mu)
    }

    /// Plane-strain constitutive matrix
    ///
    /// ```text
    /// D = [λ+2μ  0   λ  ]
    ///     [ 0    μ   0  ]
    ///     [ λ    0  λ+2μ]
    /// ```
    pub fn constitutive_matrix(&self) -> StiffnessTensor {
        let (lambda, mu) = self.lame_parameters();
        StiffnessTensor::from_lame(lambda, mu)
    }
}

/// Plane stiffness tensor in Voigt form
///
/// Isotropic phases produce it from Lamé parameters; the homogenizer produces
/// a general (numerically near-symmetric) one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StiffnessTensor(pub Matrix3<f64>);

impl StiffnessTensor {
    pub fn from_lame(lambda: f64, mu: f64) -> Self {
        let c = lambda + 2.0 * mu;
        StiffnessTensor(Matrix3::new(
            c, 0.0, lambda,
            0.0, mu, 0.0,
            lambda, 0.0, c,
        ))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    /// σ = C ε
    pub fn stress(&self, strain: &Vector3<f64>) -> Vector3<f64> {
        self.0 * strain
    }

    /// Row-major entries, the layout the coarse solve reports
    pub fn to_row_major(&self) -> [f64; 9] {
        let m = &self.0;
        [
            m[(0, 0)], m[(0, 1)], m[(0, 2)],
            m[(1, 0)], m[(1, 1)], m[(1, 2)],
            m[(2, 0)], m[(2, 1)], m[(2, 2)],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lame_parameters() {
        let mat = IsotropicElasticity::new(4e10, 0.15).unwrap();
        let (lambda, mu) = mat.lame_parameters();

        assert_relative_eq!(lambda, 4e10 * 0.15 / (1.15 * 0.7), max_relative = 1e-14);
        assert_relative_eq!(mu, 4e10 / 2.3, max_relative = 1e-14);
    }

    #[test]
    fn test_poisson_ratio_bounds() {
        assert!(matches!(IsotropicElasticity::new(1.0, 0.5), Err(Error::InvalidMaterial(_))));
        assert!(matches!(IsotropicElasticity::new(1.0, -1.0), Err(Error::InvalidMaterial(_))));
        assert!(matches!(IsotropicElasticity::new(0.0, 0.3), Err(Error::InvalidMaterial(_))));
        assert!(IsotropicElasticity::new(1.0, 0.499).is_ok());
    }

    #[test]
    fn test_deserialize_validates_constants() {
        let mat: IsotropicElasticity =
            serde_json::from_str(r#"{"youngs_modulus": 4e10, "poisson_ratio": 0.15}"#).unwrap();
        assert_eq!(mat, IsotropicElasticity::new(4e10, 0.15).unwrap());

        let bad = serde_json::from_str::<IsotropicElasticity>(r#"{"youngs_modulus": 4e10, "poisson_ratio": 0.5}"#);
        assert!(bad.unwrap_err().to_string().contains("Poisson"));
        assert!(serde_json::from_str::<IsotropicElasticity>(r#"{"youngs_modulus": -1.0, "poisson_ratio": 0.2}"#).is_err());

        // Nested in a material
        let nested = serde_json::from_str::<crate::mechanics::Material>(r#"{"Isotropic": {"youngs_modulus": 1.0, "poisson_ratio": 0.5}}"#);
        assert!(nested.is_err());
    }

    #[test]
    fn test_plane_strain_matrix() {
        let mat = IsotropicElasticity::new(100e9, 0.25).unwrap();
        let (lambda, mu) = mat.lame_parameters();
        let d = mat.constitutive_matrix();

        assert_relative_eq!(d.0[(0, 0)], lambda + 2.0 * mu);
        assert_relative_eq!(d.0[(2, 2)], lambda + 2.0 * mu);
        assert_relative_eq!(d.0[(0, 2)], lambda);
        assert_relative_eq!(d.0[(1, 1)], mu);
        assert_eq!(d.0[(0, 1)], 0.0);
        assert_eq!(d.0, d.0.transpose());
    }

    #[test]
    fn test_shear_stress_uses_engineering_strain() {
        let mat = IsotropicElasticity::new(100e9, 0.25).unwrap();
        let (_, mu) = mat.lame_parameters();

        // γ_xy = 2 ε_xy = 1e-3 → σ_xy = 2μ ε_xy = μ γ_xy
        let sigma = mat.constitutive_matrix().stress(&Vector3::new(0.0, 1e-3, 0.0));
        assert_relative_eq!(sigma[1], mu * 1e-3);
        assert_eq!(sigma[0], 0.0);
    }
}
