/// Coloured mesh asset: a mesh drawn with a material

use crate::asset::{Asset, AssetHandle, MaterialHandle, MeshHandle};

pub type ColouredMeshHandle = AssetHandle<ColouredMesh>;

#[derive(Debug, Clone, PartialEq)]
pub struct ColouredMesh {
    name: String,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    /// Pipeline variant key from the `RendererDependencyProvider`
    pub renderer_dependency_index: usize,
}

impl ColouredMesh {
    pub fn new(name: impl Into<String>, mesh: MeshHandle, material: MaterialHandle, renderer_dependency_index: usize) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            renderer_dependency_index,
        }
    }
}

impl Asset for ColouredMesh {
    fn type_name() -> &'static str {
        "ColouredMesh"
    }

    fn empty(name: String) -> Self {
        Self::new(name, MeshHandle::INVALID, MaterialHandle::INVALID, 0)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn valid(&self) -> bool {
        self.mesh.is_valid() && self.material.is_valid()
    }
}
