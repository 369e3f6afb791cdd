//! JSON artifacts on disk
//!
//! Layout under the output root:
//!
//! ```text
//! meshes/<name>.json               mesh nodes and cells
//! meshes/<name>_domains.json       cell tags
//! <name>/u.json                    macro displacement
//! <name>/u<i>.json                 unit state displacements
//! <name>/effective_stiffness.json  homogenized tensor
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::homogenization::EffectiveStiffness;
use crate::mesh::{CellTags, Mesh, VectorField};

/// Reads and writes pipeline artifacts below one root directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mesh_path(&self, name: &str) -> PathBuf {
        self.root.join("meshes").join(format!("{}.json", name))
    }

    pub fn tags_path(&self, name: &str) -> PathBuf {
        self.root.join("meshes").join(format!("{}_domains.json", name))
    }

    /// `<name>/u.json` for `index = None`, `<name>/u<i>.json` otherwise
    pub fn displacement_path(&self, name: &str, index: Option<usize>) -> PathBuf {
        let file = match index {
            Some(i) => format!("u{}.json", i),
            None => "u.json".to_string(),
        };
        self.root.join(name).join(file)
    }

    pub fn stiffness_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join("effective_stiffness.json")
    }

    /// Write a mesh and its cell tags
    pub fn save_mesh(&self, name: &str, mesh: &Mesh, tags: &CellTags) -> Result<()> {
        write_json(&self.mesh_path(name), mesh)?;
        write_json(&self.tags_path(name), tags)
    }

    pub fn load_mesh(&self, name: &str) -> Result<(Mesh, CellTags)> {
        let mesh = read_json(&self.mesh_path(name))?;
        let tags = read_json(&self.tags_path(name))?;
        Ok((mesh, tags))
    }

    /// Write an interleaved nodal displacement vector
    pub fn save_displacement(&self, name: &str, index: Option<usize>, u: &[f64]) -> Result<()> {
        let label = match index {
            Some(i) => format!("u{}", i),
            None => "u".to_string(),
        };
        let field = VectorField::from_dof_vector(&label, u)?;
        write_json(&self.displacement_path(name, index), &field)
    }

    pub fn load_displacement(&self, name: &str, index: Option<usize>) -> Result<VectorField> {
        read_json(&self.displacement_path(name, index))
    }

    pub fn save_effective_stiffness(&self, name: &str, effective: &EffectiveStiffness) -> Result<()> {
        write_json(&self.stiffness_path(name), effective)
    }

    pub fn load_effective_stiffness(&self, name: &str) -> Result<EffectiveStiffness> {
        read_json(&self.stiffness_path(name))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, value)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
