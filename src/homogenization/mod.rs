/// Two-scale homogenization of periodic composites
pub mod rve;

pub use rve::{
    homogenize, integrate_response, solve_unit_strain, EffectiveStiffness, Homogenization,
    StateIntegrals, UnitStrain,
};
