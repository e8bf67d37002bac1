/// Image trait, formats, usage flags and layouts

use bitflags::bitflags;
use crate::error::Result;
use crate::graphics_device::MemoryProperties;

/// Sampled image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum ImageFormat {
    R8_UNORM,
    R8_SNORM,
    R8_SRGB,
    R8G8_UNORM,
    R8G8_SNORM,
    R8G8_SRGB,
    R8G8B8A8_UNORM,
    R8G8B8A8_SNORM,
    R8G8B8A8_SRGB,
}

impl ImageFormat {
    /// Size of one pixel in bytes
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            ImageFormat::R8_UNORM | ImageFormat::R8_SNORM | ImageFormat::R8_SRGB => 1,
            ImageFormat::R8G8_UNORM | ImageFormat::R8G8_SNORM | ImageFormat::R8G8_SRGB => 2,
            ImageFormat::R8G8B8A8_UNORM | ImageFormat::R8G8B8A8_SNORM | ImageFormat::R8G8B8A8_SRGB => 4,
        }
    }

    pub fn is_rgba8(&self) -> bool {
        matches!(self, ImageFormat::R8G8B8A8_UNORM | ImageFormat::R8G8B8A8_SRGB)
    }
}

bitflags! {
    /// Image usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const SAMPLED = 1 << 0;
        const STORAGE = 1 << 1;
        const TRANSFER_SRC = 1 << 2;
        const TRANSFER_DST = 1 << 3;
    }
}

/// Image layouts the upload path moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    Undefined,
    TransferDst,
    TransferSrc,
    ShaderReadOnly,
}

/// Descriptor for creating a 2D image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    pub format: ImageFormat,
    pub usage: ImageUsage,
}

/// Image resource trait
///
/// Implemented by backend-specific image types (e.g., VulkanImage).
/// The image and its view are destroyed when dropped.
pub trait Image: Send + Sync {
    /// Properties the image was created with
    fn desc(&self) -> &ImageDesc;

    fn memory_properties(&self) -> MemoryProperties;

    /// Copy tightly packed level 0 pixels into mapped memory
    fn write_mapped(&self, data: &[u8]) -> Result<()>;
}
