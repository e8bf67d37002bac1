/// Material asset: ordered textures and scalars laid out by the
/// `CompatibilityDescriptor`

use crate::asset::{Asset, AssetHandle, TextureHandle};

pub type MaterialHandle = AssetHandle<Material>;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    pub textures: Vec<TextureHandle>,
    pub values: Vec<f32>,
    pub has_transparency: bool,
    /// First entry in the material buffer, -1 when nothing was written
    pub gpu_index: i32,
}

impl Material {
    pub fn new(name: impl Into<String>, textures: Vec<TextureHandle>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            textures,
            values,
            has_transparency: false,
            gpu_index: -1,
        }
    }

    /// Entries this material occupies in the material buffer
    pub fn entry_count(&self) -> usize {
        self.textures.len() + self.values.len()
    }
}

impl Asset for Material {
    fn type_name() -> &'static str {
        "Material"
    }

    fn empty(name: String) -> Self {
        Self::new(name, Vec::new(), Vec::new())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn valid(&self) -> bool {
        self.entry_count() != 0
    }
}
