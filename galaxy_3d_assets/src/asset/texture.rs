/// Texture asset: an image plus a sampler, bound into the bindless table

use crate::asset::{Asset, AssetHandle};
use crate::resource::{ImageHandle, SamplerHandle};

pub type TextureHandle = AssetHandle<Texture>;

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    name: String,
    pub image: ImageHandle,
    pub sampler: SamplerHandle,
    pub has_transparency: bool,
    /// Slot in the bindless texture array, `UNBOUND` or `DUMMY`
    pub gpu_index: i32,
}

impl Texture {
    /// Not written to the bindless table yet
    pub const UNBOUND: i32 = -2;
    /// Placeholder that never gets a slot
    pub const DUMMY: i32 = -1;

    pub fn new(name: impl Into<String>, image: ImageHandle, sampler: SamplerHandle, has_transparency: bool) -> Self {
        Self {
            name: name.into(),
            image,
            sampler,
            has_transparency,
            gpu_index: Self::UNBOUND,
        }
    }

    /// Placeholder for material slots the source file leaves empty
    pub fn dummy(name: impl Into<String>) -> Self {
        Self {
            gpu_index: Self::DUMMY,
            ..Self::empty(name.into())
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.gpu_index == Self::DUMMY
    }
}

impl Asset for Texture {
    fn type_name() -> &'static str {
        "Texture"
    }

    fn empty(name: String) -> Self {
        Self::new(name, ImageHandle::NONE, SamplerHandle::NONE, false)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn valid(&self) -> bool {
        self.is_dummy() || (self.image.is_valid() && self.sampler.is_valid())
    }
}
