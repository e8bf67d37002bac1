/// GPU resources: CPU payload plus the device object created on upload.
///
/// Each resource carries a [`ResourceLocation`] mask. `upload()` is a no-op
/// once `UPLOADED` is set and sets it only after the transfer completed;
/// `destroy()` drops the device object and clears the bit. Both are safe to
/// call repeatedly.

use std::sync::Arc;
use bitflags::bitflags;
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, TransferCommands,
    Buffer, BufferDesc, BufferUsage,
    Image, ImageDesc, ImageFormat, ImageUsage, ImageLayout, ImageBarrier, MipBlit,
    Sampler, SamplerDesc,
};

bitflags! {
    /// Where a resource's data currently lives
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResourceLocation: u8 {
        const ON_DISK = 1;
        const VALID = 2;
        const IN_MEMORY = 4;
        const UPLOADED = 8;
    }
}

impl ResourceLocation {
    pub const MISSING: ResourceLocation = ResourceLocation::empty();
}

/// `floor(log2(max(width, height))) + 1`
pub fn mip_levels_for(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

// ===== IMAGE =====

pub struct ImageResource {
    pub location: ResourceLocation,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub mip_levels: u32,
    /// Bytes per channel
    pub component_size: u32,
    pub srgb: bool,
    pub transparent: bool,
    pub format: ImageFormat,
    pub usage: ImageUsage,
    /// Tightly packed level 0 pixels
    pub data: Vec<u8>,
    image: Option<Arc<dyn Image>>,
}

impl ImageResource {
    /// In-memory 8-bit image with one mip level, sampled usage
    pub fn new(width: u32, height: u32, channels: u32, format: ImageFormat, data: Vec<u8>) -> Self {
        Self {
            location: ResourceLocation::IN_MEMORY,
            width,
            height,
            channels,
            mip_levels: 1,
            component_size: 1,
            srgb: matches!(format, ImageFormat::R8_SRGB | ImageFormat::R8G8_SRGB | ImageFormat::R8G8B8A8_SRGB),
            transparent: false,
            format,
            usage: ImageUsage::SAMPLED,
            data,
            image: None,
        }
    }

    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels.max(1);
        self
    }

    /// Device image, once uploaded
    pub fn image(&self) -> Option<&Arc<dyn Image>> {
        self.image.as_ref()
    }

    pub fn is_uploaded(&self) -> bool {
        self.location.contains(ResourceLocation::UPLOADED)
    }

    /// Sampled format for an 8-bit image with `channels` channels
    ///
    /// Three-channel images must be expanded to RGBA first; `None` for any
    /// unsupported channel count.
    pub fn pixel_format_for(channels: u32, signed: bool, srgb: bool) -> Option<ImageFormat> {
        let format = match (channels, signed, srgb) {
            (1, _, true) => ImageFormat::R8_SRGB,
            (1, true, false) => ImageFormat::R8_SNORM,
            (1, false, false) => ImageFormat::R8_UNORM,
            (2, _, true) => ImageFormat::R8G8_SRGB,
            (2, true, false) => ImageFormat::R8G8_SNORM,
            (2, false, false) => ImageFormat::R8G8_UNORM,
            (4, _, true) => ImageFormat::R8G8B8A8_SRGB,
            (4, true, false) => ImageFormat::R8G8B8A8_SNORM,
            (4, false, false) => ImageFormat::R8G8B8A8_UNORM,
            _ => return None,
        };
        Some(format)
    }

    /// Mark the image transparent if any alpha is below 255 (RGBA8 only)
    pub fn calculate_transparency(&mut self) {
        if !self.format.is_rgba8() {
            return;
        }
        self.transparent = self.data.chunks_exact(4).any(|px| px[3] < 255);
    }

    fn expected_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel() as usize
    }

    pub fn upload(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if self.is_uploaded() {
            return Ok(());
        }
        if self.width == 0 || self.height == 0 || self.data.len() < self.expected_size() {
            return Err(Error::InvalidResource(format!(
                "image {}x{} {:?} has {} bytes of pixel data",
                self.width, self.height, self.format, self.data.len()
            )));
        }

        let mut usage = self.usage | ImageUsage::TRANSFER_DST;
        if self.mip_levels > 1 {
            usage |= ImageUsage::TRANSFER_SRC;
        }
        let image = device.create_image(ImageDesc {
            width: self.width,
            height: self.height,
            mip_levels: self.mip_levels,
            format: self.format,
            usage,
        })?;

        let mut staging = None;
        let recorded = self.record_upload(device, &image, &mut staging);
        // Staging buffers go back to the pool even when the transfer failed
        if let Some(buffer) = staging {
            device.return_staging_buffer(buffer);
        }
        recorded?;

        self.image = Some(image);
        self.location |= ResourceLocation::UPLOADED;
        Ok(())
    }

    /// Fill `image` and leave it shader-readable; a staging buffer used on
    /// the way is handed out through `staging`
    fn record_upload(
        &self,
        device: &mut dyn GraphicsDevice,
        image: &Arc<dyn Image>,
        staging: &mut Option<Arc<dyn Buffer>>,
    ) -> Result<()> {
        let pixels = &self.data[..self.expected_size()];
        let mut cmds = device.begin_transfer()?;
        cmds.image_barrier(image, &ImageBarrier {
            base_mip_level: 0,
            level_count: self.mip_levels,
            old_layout: ImageLayout::Undefined,
            new_layout: ImageLayout::TransferDst,
        })?;

        if image.memory_properties().is_host_visible() {
            image.write_mapped(pixels)?;
        } else {
            let buffer = staging.insert(device.request_staging_buffer(pixels.len() as u64)?);
            buffer.write_mapped(0, pixels)?;
            cmds.copy_buffer_to_image(buffer, image, self.width, self.height)?;
        }

        if self.mip_levels > 1 {
            record_mip_chain(cmds.as_mut(), image, self.width, self.height, self.mip_levels)?;
        } else {
            cmds.image_barrier(image, &ImageBarrier {
                base_mip_level: 0,
                level_count: 1,
                old_layout: ImageLayout::TransferDst,
                new_layout: ImageLayout::ShaderReadOnly,
            })?;
        }

        device.end_transfer(cmds)
    }

    pub fn destroy(&mut self) {
        if !self.is_uploaded() {
            return;
        }
        self.image = None;
        self.location.remove(ResourceLocation::UPLOADED);
    }
}

/// Fill levels 1.. by successive half-size blits, leaving every level in
/// shader-read layout
fn record_mip_chain(
    cmds: &mut dyn TransferCommands,
    image: &Arc<dyn Image>,
    width: u32,
    height: u32,
    mip_levels: u32,
) -> Result<()> {
    let (mut w, mut h) = (width, height);
    for level in 1..mip_levels {
        let src_level = level - 1;
        cmds.image_barrier(image, &ImageBarrier {
            base_mip_level: src_level,
            level_count: 1,
            old_layout: ImageLayout::TransferDst,
            new_layout: ImageLayout::TransferSrc,
        })?;

        let next = ((w / 2).max(1), (h / 2).max(1));
        cmds.blit_image_level(image, &MipBlit {
            src_level,
            src_extent: (w, h),
            dst_extent: next,
        })?;

        cmds.image_barrier(image, &ImageBarrier {
            base_mip_level: src_level,
            level_count: 1,
            old_layout: ImageLayout::TransferSrc,
            new_layout: ImageLayout::ShaderReadOnly,
        })?;
        (w, h) = next;
    }

    cmds.image_barrier(image, &ImageBarrier {
        base_mip_level: mip_levels - 1,
        level_count: 1,
        old_layout: ImageLayout::TransferDst,
        new_layout: ImageLayout::ShaderReadOnly,
    })
}

// ===== BUFFER =====

/// Write `data` into `staging` and copy it to the start of `dst`
fn copy_through_staging(
    device: &mut dyn GraphicsDevice,
    staging: &Arc<dyn Buffer>,
    dst: &Arc<dyn Buffer>,
    data: &[u8],
) -> Result<()> {
    staging.write_mapped(0, data)?;
    let mut cmds = device.begin_transfer()?;
    cmds.copy_buffer(staging, dst, data.len() as u64)?;
    device.end_transfer(cmds)
}

pub struct BufferResource {
    pub location: ResourceLocation,
    pub usage: BufferUsage,
    pub data: Vec<u8>,
    buffer: Option<Arc<dyn Buffer>>,
}

impl BufferResource {
    pub fn new(usage: BufferUsage, data: Vec<u8>) -> Self {
        Self {
            location: ResourceLocation::IN_MEMORY,
            usage,
            data,
            buffer: None,
        }
    }

    pub fn buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.buffer.as_ref()
    }

    pub fn is_uploaded(&self) -> bool {
        self.location.contains(ResourceLocation::UPLOADED)
    }

    pub fn upload(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if self.is_uploaded() {
            return Ok(());
        }
        if self.data.is_empty() {
            return Err(Error::InvalidResource("cannot upload an empty buffer".to_string()));
        }

        let size = self.data.len() as u64;
        let buffer = device.create_buffer(BufferDesc {
            size,
            usage: self.usage | BufferUsage::TRANSFER_DST,
        })?;

        if buffer.memory_properties().is_host_visible() {
            buffer.write_mapped(0, &self.data)?;
        } else {
            let staging = device.request_staging_buffer(size)?;
            let copied = copy_through_staging(device, &staging, &buffer, &self.data);
            device.return_staging_buffer(staging);
            copied?;
        }

        self.buffer = Some(buffer);
        self.location |= ResourceLocation::UPLOADED;
        Ok(())
    }

    pub fn destroy(&mut self) {
        if !self.is_uploaded() {
            return;
        }
        self.buffer = None;
        self.location.remove(ResourceLocation::UPLOADED);
    }
}

// ===== SAMPLER =====

pub struct SamplerResource {
    pub location: ResourceLocation,
    pub desc: SamplerDesc,
    sampler: Option<Arc<dyn Sampler>>,
}

impl SamplerResource {
    pub fn new(desc: SamplerDesc) -> Self {
        Self {
            location: ResourceLocation::VALID,
            desc,
            sampler: None,
        }
    }

    pub fn sampler(&self) -> Option<&Arc<dyn Sampler>> {
        self.sampler.as_ref()
    }

    pub fn is_uploaded(&self) -> bool {
        self.location.contains(ResourceLocation::UPLOADED)
    }

    pub fn upload(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if self.is_uploaded() {
            return Ok(());
        }
        self.sampler = Some(device.create_sampler(&self.desc)?);
        self.location |= ResourceLocation::UPLOADED;
        Ok(())
    }

    pub fn destroy(&mut self) {
        if !self.is_uploaded() {
            return;
        }
        self.sampler = None;
        self.location.remove(ResourceLocation::UPLOADED);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "gpu_resource_tests.rs"]
mod tests;
