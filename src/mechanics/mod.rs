/// Solid mechanics module for plane-strain linear elasticity
///
/// This module provides implementations for:
/// - Isotropic and general plane constitutive tensors
/// - Strain-displacement relationships
/// - Element matrices for displacement-based FEM
/// - Per-cell coefficient fields built from tagged material laws

pub mod constitutive;
pub mod strain;
pub mod element;
pub mod field;

pub use constitutive::{IsotropicElasticity, StiffnessTensor};
pub use strain::StrainDisplacement;
pub use element::{CellResponse, ElasticityElement};
pub use field::{
    build_anisotropic_field, build_isotropic_field, LameField, Material, MaterialLaw,
    StiffnessField,
};
