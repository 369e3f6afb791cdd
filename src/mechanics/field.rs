//! Per-cell coefficient fields
//!
//! A material law maps subdomain tags to constitutive data; applying it to the
//! cell tags of a mesh yields one entry per cell, aligned with `Mesh::cells`.
//! Lookups are pure and a tag without material is an error, never a default.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use super::{IsotropicElasticity, StiffnessTensor};
use crate::error::{Error, Result};
use crate::homogenization::EffectiveStiffness;
use crate::mesh::CellTags;

/// Constitutive data attached to one subdomain tag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Material {
    Isotropic(IsotropicElasticity),
    Anisotropic(StiffnessTensor),
}

impl Material {
    pub fn stiffness(&self) -> StiffnessTensor {
        match self {
            Material::Isotropic(m) => m.constitutive_matrix(),
            Material::Anisotropic(c) => *c,
        }
    }
}

/// Tag → material mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialLaw {
    materials: BTreeMap<u32, Material>,
}

impl MaterialLaw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: u32, material: Material) -> Self {
        self.materials.insert(tag, material);
        self
    }

    pub fn insert(&mut self, tag: u32, material: Material) {
        self.materials.insert(tag, material);
    }

    pub fn get(&self, tag: u32) -> Result<&Material> {
        self.materials.get(&tag).ok_or(Error::MissingMaterial { tag })
    }

    /// Two-phase law: tag 0 is the matrix, every listed tag the inclusion
    pub fn two_phase<I>(matrix: IsotropicElasticity, inclusion: IsotropicElasticity, tags: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut law = Self::new().with(0, Material::Isotropic(matrix));
        for tag in tags {
            if tag != 0 {
                law.insert(tag, Material::Isotropic(inclusion));
            }
        }
        law
    }

    /// Evaluate the law on every cell
    pub fn build_field(&self, tags: &CellTags) -> Result<StiffnessField> {
        let data = tags
            .iter()
            .map(|tag| self.get(tag).map(Material::stiffness))
            .collect::<Result<Vec<_>>>()?;
        Ok(StiffnessField(data))
    }
}

/// Lamé parameters (λ, μ) per cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LameField(pub Vec<(f64, f64)>);

impl LameField {
    pub fn get(&self, cell: usize) -> (f64, f64) {
        self.0[cell]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plane-strain tensors `[[λ+2μ,0,λ],[0,μ,0],[λ,0,λ+2μ]]`
    pub fn to_stiffness_field(&self) -> StiffnessField {
        StiffnessField(
            self.0
                .iter()
                .map(|&(lambda, mu)| StiffnessTensor::from_lame(lambda, mu))
                .collect(),
        )
    }
}

/// Plane stiffness tensor per cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StiffnessField(pub Vec<StiffnessTensor>);

impl StiffnessField {
    pub fn get(&self, cell: usize) -> &StiffnessTensor {
        &self.0[cell]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-cell (λ, μ) from isotropic materials keyed by tag
pub fn build_isotropic_field(
    tags: &CellTags,
    materials: &BTreeMap<u32, IsotropicElasticity>,
) -> Result<LameField> {
    let data = tags
        .iter()
        .map(|tag| {
            materials
                .get(&tag)
                .map(IsotropicElasticity::lame_parameters)
                .ok_or(Error::MissingMaterial { tag })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(LameField(data))
}

/// Per-cell tensors: the homogenized tensor on `homogenized_tag`, isotropic
/// phases elsewhere
pub fn build_anisotropic_field(
    tags: &CellTags,
    homogenized_tag: u32,
    effective: &EffectiveStiffness,
    isotropic: &BTreeMap<u32, IsotropicElasticity>,
) -> Result<StiffnessField> {
    let mut law = MaterialLaw::new();
    for (&tag, &material) in isotropic {
        law.insert(tag, Material::Isotropic(material));
    }
    law.insert(homogenized_tag, Material::Anisotropic(effective.tensor()));
    law.build_field(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    fn phases() -> (IsotropicElasticity, IsotropicElasticity) {
        (
            IsotropicElasticity::new(4e10, 0.15).unwrap(),
            IsotropicElasticity::new(2e11, 0.3).unwrap(),
        )
    }

    #[test]
    fn test_isotropic_field_lookup() {
        let (matrix, fiber) = phases();
        let materials = BTreeMap::from([(0, matrix), (1, fiber)]);
        let tags = CellTags::new(vec![0, 1, 1, 0]);

        let field = build_isotropic_field(&tags, &materials).unwrap();
        assert_eq!(field.len(), 4);
        assert_eq!(field.get(1), fiber.lame_parameters());

        let tensors = field.to_stiffness_field();
        let (lambda, mu) = matrix.lame_parameters();
        assert_relative_eq!(tensors.get(0).0[(0, 0)], lambda + 2.0 * mu);
        assert_relative_eq!(tensors.get(0).0[(2, 0)], lambda);
    }

    #[test]
    fn test_missing_tag_is_reported() {
        let (matrix, _) = phases();
        let materials = BTreeMap::from([(0, matrix)]);
        let tags = CellTags::new(vec![0, 5]);

        match build_isotropic_field(&tags, &materials) {
            Err(Error::MissingMaterial { tag }) => assert_eq!(tag, 5),
            other => panic!("expected MissingMaterial, got {:?}", other),
        }
    }

    #[test]
    fn test_anisotropic_field() {
        let (matrix, fiber) = phases();
        let c = StiffnessTensor(Matrix3::new(9.0, 0.1, 2.0, 0.1, 3.0, 0.0, 2.0, 0.0, 7.0));
        let effective = EffectiveStiffness::from_tensor(c);
        let isotropic = BTreeMap::from([(1, matrix), (2, fiber), (3, fiber)]);
        let tags = CellTags::new(vec![0, 1, 3, 0, 2]);

        let field = build_anisotropic_field(&tags, 0, &effective, &isotropic).unwrap();
        assert_eq!(field.get(0), &c);
        assert_eq!(field.get(3), &c);
        assert_eq!(field.get(1), &matrix.constitutive_matrix());
        assert_eq!(field.get(4), &fiber.constitutive_matrix());
    }

    #[test]
    fn test_two_phase_law() {
        let (matrix, fiber) = phases();
        let law = MaterialLaw::two_phase(matrix, fiber, [0, 1, 4]);
        let field = law.build_field(&CellTags::new(vec![4, 0])).unwrap();
        assert_eq!(field.get(0), &fiber.constitutive_matrix());
        assert_eq!(field.get(1), &matrix.constitutive_matrix());
        assert!(matches!(law.get(2), Err(Error::MissingMaterial { tag: 2 })));
    }
}
