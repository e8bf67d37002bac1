/// Material slot layout shared by loaders and shaders.
///
/// Materials carry ordered textures and values with no meaning of their own;
/// the descriptor says which texture or scalar sits at each position, and the
/// material buffer is packed in exactly that order.

/// Role of a material texture slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Normal,
    /// Metallic in R, roughness in G, ambient occlusion in B
    CombinedMro,
}

#[derive(Debug, Clone, Copy)]
pub struct TextureDescriptor {
    pub kind: TextureKind,
    pub mip_mapped: bool,
    pub srgb: bool,
}

impl TextureDescriptor {
    pub fn new(kind: TextureKind, mip_mapped: bool, srgb: bool) -> Self {
        Self { kind, mip_mapped, srgb }
    }
}

/// Two descriptors are the same slot when their roles match
impl PartialEq for TextureDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// Role of a material scalar slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueDescriptor {
    DiffuseR,
    DiffuseG,
    DiffuseB,
    OpacityR,
    RoughnessR,
    MetallicR,
    NormalScaleR,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityDescriptor {
    pub textures: Vec<TextureDescriptor>,
    pub values: Vec<ValueDescriptor>,
}

impl CompatibilityDescriptor {
    pub fn has_texture(&self, kind: TextureKind) -> bool {
        self.textures.iter().any(|t| t.kind == kind)
    }

    pub fn has_value(&self, value: ValueDescriptor) -> bool {
        self.values.contains(&value)
    }

    /// Entries one material occupies in the material buffer
    pub fn entry_count(&self) -> usize {
        self.textures.len() + self.values.len()
    }
}

impl Default for CompatibilityDescriptor {
    fn default() -> Self {
        Self {
            textures: vec![
                TextureDescriptor::new(TextureKind::Diffuse, true, true),
                TextureDescriptor::new(TextureKind::Normal, true, false),
                TextureDescriptor::new(TextureKind::CombinedMro, true, false),
            ],
            values: vec![
                ValueDescriptor::DiffuseR,
                ValueDescriptor::DiffuseG,
                ValueDescriptor::DiffuseB,
                ValueDescriptor::OpacityR,
                ValueDescriptor::MetallicR,
                ValueDescriptor::RoughnessR,
            ],
        }
    }
}
