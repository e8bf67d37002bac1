/// Composite mesh asset: one source file's scene flattened to
/// (transform, coloured mesh) instances

use std::path::PathBuf;
use glam::Mat4;
use crate::asset::{Asset, AssetHandle, ColouredMeshHandle};

pub type CompositeMeshHandle = AssetHandle<CompositeMesh>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeMeshEntry {
    pub transform: Mat4,
    pub mesh: ColouredMeshHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeMesh {
    name: String,
    pub entries: Vec<CompositeMeshEntry>,
    /// File this composite is loaded from; empty for generated composites
    pub path: PathBuf,
    /// Set once a load from `path` has run, whether or not it produced entries
    pub load_attempted: bool,
}

impl CompositeMesh {
    /// Unloaded composite pointing at a file
    pub fn with_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            path: path.into(),
            load_attempted: false,
        }
    }

    pub fn push(&mut self, transform: Mat4, mesh: ColouredMeshHandle) {
        self.entries.push(CompositeMeshEntry { transform, mesh });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn transform(&self, index: usize) -> Option<Mat4> {
        self.entries.get(index).map(|e| e.transform)
    }
}

impl Asset for CompositeMesh {
    fn type_name() -> &'static str {
        "CompositeMesh"
    }

    fn empty(name: String) -> Self {
        Self::with_path(name, PathBuf::new())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn valid(&self) -> bool {
        !self.entries.is_empty()
    }
}
