use std::collections::BTreeSet;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// Subdomain tag per cell, aligned 1:1 with `Mesh::cells`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellTags(pub Vec<u32>);

impl CellTags {
    pub fn new(data: Vec<u32>) -> Self {
        Self(data)
    }

    pub fn get(&self, cell: usize) -> u32 {
        self.0[cell]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Distinct tags present, ascending
    pub fn distinct(&self) -> BTreeSet<u32> {
        self.0.iter().copied().collect()
    }

    pub fn count(&self, tag: u32) -> usize {
        self.0.iter().filter(|&&t| t == tag).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Vector field data on mesh nodes (2 components per node)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorField {
    pub name: String,
    pub data: Vec<Vector2<f64>>,
}

impl VectorField {
    pub fn new(name: &str, data: Vec<Vector2<f64>>) -> Self {
        Self {
            name: name.to_string(),
            data,
        }
    }

    /// Create vector field from flat DOF vector
    ///
    /// Converts interleaved DOF array [ux0, uy0, ux1, uy1, ...]
    /// into vector of Vector2 objects
    ///
    /// # Errors
    /// `InvalidConfig` if the length is odd
    pub fn from_dof_vector(name: &str, dof_vector: &[f64]) -> Result<Self> {
        if dof_vector.len() % 2 != 0 {
            return Err(Error::InvalidConfig(format!(
                "DOF vector must have 2*n entries for vector field '{}', got {}",
                name,
                dof_vector.len()
            )));
        }

        let data: Vec<_> = dof_vector
            .chunks(2)
            .map(|chunk| Vector2::new(chunk[0], chunk[1]))
            .collect();

        Ok(Self::new(name, data))
    }

    /// Largest nodal magnitude
    pub fn max_norm(&self) -> f64 {
        self.data.iter().map(|v| v.norm()).fold(0.0, f64::max)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_tags() {
        let tags = CellTags::new(vec![0, 3, 3, 1, 0]);
        assert_eq!(tags.distinct().into_iter().collect::<Vec<_>>(), vec![0, 1, 3]);
        assert_eq!(tags.count(3), 2);
        assert_eq!(tags.get(3), 1);

        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, "[0,3,3,1,0]");
    }

    #[test]
    fn test_vector_field_from_dofs() {
        let field = VectorField::from_dof_vector("u", &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(field.len(), 2);
        assert_eq!(field.data[1], Vector2::new(3.0, 4.0));
        assert!((field.max_norm() - 5.0).abs() < 1e-12);

        assert!(VectorField::from_dof_vector("u", &[1.0, 2.0, 3.0]).is_err());
    }
}
