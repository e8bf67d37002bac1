/// Central registry of GPU resources (images, buffers, samplers).
///
/// Resources are stored densely and addressed by [`ResourceHandle`]s. A handle
/// only says "this slot was set"; whether the resource is resident is a
/// separate question answered by `is_*_uploaded`.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::engine_err;
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, SamplerDesc, Filter, MipmapMode, AddressMode, BorderColor,
};
use crate::resource::{BufferResource, ImageResource, SamplerResource};

// ===== HANDLES =====

/// Optional index into one of the resource registries
pub struct ResourceHandle<T> {
    index: Option<u32>,
    _marker: PhantomData<fn() -> T>,
}

pub type ImageHandle = ResourceHandle<ImageResource>;
pub type BufferHandle = ResourceHandle<BufferResource>;
pub type SamplerHandle = ResourceHandle<SamplerResource>;

impl<T> ResourceHandle<T> {
    /// Unbound handle
    pub const NONE: Self = Self { index: None, _marker: PhantomData };

    fn from_index(index: usize) -> Self {
        Self { index: Some(index as u32), _marker: PhantomData }
    }

    pub fn index(&self) -> Option<usize> {
        self.index.map(|i| i as usize)
    }

    pub fn is_valid(&self) -> bool {
        self.index.is_some()
    }
}

impl<T> Clone for ResourceHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ResourceHandle<T> {}

impl<T> PartialEq for ResourceHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for ResourceHandle<T> {}

impl<T> Default for ResourceHandle<T> {
    fn default() -> Self {
        Self::NONE
    }
}

impl<T> fmt::Debug for ResourceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "ResourceHandle({})", i),
            None => write!(f, "ResourceHandle(none)"),
        }
    }
}

// ===== RESOURCE MANAGER =====

pub struct ResourceManager {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    images: Vec<ImageResource>,
    buffers: Vec<BufferResource>,
    samplers: Vec<SamplerResource>,
    default_sampler: SamplerHandle,
}

impl ResourceManager {
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>) -> Self {
        Self {
            device,
            images: Vec::new(),
            buffers: Vec::new(),
            samplers: Vec::new(),
            default_sampler: SamplerHandle::NONE,
        }
    }

    /// Register and upload the default sampler
    ///
    /// Linear filtering, linear mips, repeat on every axis, 16x anisotropy,
    /// lod 0..200, opaque black border.
    pub fn initialize(&mut self) -> Result<()> {
        let desc = SamplerDesc {
            mag_filter: Filter::Linear,
            min_filter: Filter::Linear,
            mipmap_mode: MipmapMode::Linear,
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            address_mode_w: AddressMode::Repeat,
            mip_lod_bias: 0.0,
            anisotropy_enable: true,
            max_anisotropy: 16.0,
            min_lod: 0.0,
            max_lod: 200.0,
            border_color: BorderColor::IntOpaqueBlack,
        };
        let handle = self.add_sampler(SamplerResource::new(desc));
        self.upload_sampler(handle)?;
        self.default_sampler = handle;
        crate::engine_debug!("galaxy3d::ResourceManager", "Default sampler registered");
        Ok(())
    }

    /// Shared graphics device
    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.device
    }

    /// Lock the device, mapping poisoning to `BackendError`
    pub fn lock_device(&self) -> Result<MutexGuard<'_, dyn GraphicsDevice + 'static>> {
        self.device
            .lock()
            .map_err(|_| engine_err!("galaxy3d::ResourceManager", "Graphics device lock poisoned"))
    }

    pub fn default_sampler(&self) -> SamplerHandle {
        self.default_sampler
    }

    // ===== REGISTRATION =====

    pub fn add_image(&mut self, image: ImageResource) -> ImageHandle {
        self.images.push(image);
        ImageHandle::from_index(self.images.len() - 1)
    }

    pub fn add_buffer(&mut self, buffer: BufferResource) -> BufferHandle {
        self.buffers.push(buffer);
        BufferHandle::from_index(self.buffers.len() - 1)
    }

    pub fn add_sampler(&mut self, sampler: SamplerResource) -> SamplerHandle {
        self.samplers.push(sampler);
        SamplerHandle::from_index(self.samplers.len() - 1)
    }

    // ===== ACCESS =====

    pub fn image(&self, handle: ImageHandle) -> Option<&ImageResource> {
        handle.index().and_then(|i| self.images.get(i))
    }

    pub fn image_mut(&mut self, handle: ImageHandle) -> Option<&mut ImageResource> {
        handle.index().and_then(|i| self.images.get_mut(i))
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&BufferResource> {
        handle.index().and_then(|i| self.buffers.get(i))
    }

    pub fn buffer_mut(&mut self, handle: BufferHandle) -> Option<&mut BufferResource> {
        handle.index().and_then(|i| self.buffers.get_mut(i))
    }

    pub fn sampler(&self, handle: SamplerHandle) -> Option<&SamplerResource> {
        handle.index().and_then(|i| self.samplers.get(i))
    }

    pub fn sampler_mut(&mut self, handle: SamplerHandle) -> Option<&mut SamplerResource> {
        handle.index().and_then(|i| self.samplers.get_mut(i))
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn sampler_count(&self) -> usize {
        self.samplers.len()
    }

    pub fn is_image_uploaded(&self, handle: ImageHandle) -> bool {
        self.image(handle).is_some_and(|r| r.is_uploaded())
    }

    pub fn is_buffer_uploaded(&self, handle: BufferHandle) -> bool {
        self.buffer(handle).is_some_and(|r| r.is_uploaded())
    }

    pub fn is_sampler_uploaded(&self, handle: SamplerHandle) -> bool {
        self.sampler(handle).is_some_and(|r| r.is_uploaded())
    }

    // ===== UPLOAD =====

    pub fn upload_image(&mut self, handle: ImageHandle) -> Result<()> {
        let mut device = self.device.lock()
            .map_err(|_| engine_err!("galaxy3d::ResourceManager", "Graphics device lock poisoned"))?;
        let image = handle.index()
            .and_then(|i| self.images.get_mut(i))
            .ok_or_else(|| Error::InvalidResource(format!("unknown image {:?}", handle)))?;
        image.upload(&mut *device)
    }

    pub fn upload_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        let mut device = self.device.lock()
            .map_err(|_| engine_err!("galaxy3d::ResourceManager", "Graphics device lock poisoned"))?;
        let buffer = handle.index()
            .and_then(|i| self.buffers.get_mut(i))
            .ok_or_else(|| Error::InvalidResource(format!("unknown buffer {:?}", handle)))?;
        buffer.upload(&mut *device)
    }

    pub fn upload_sampler(&mut self, handle: SamplerHandle) -> Result<()> {
        let mut device = self.device.lock()
            .map_err(|_| engine_err!("galaxy3d::ResourceManager", "Graphics device lock poisoned"))?;
        let sampler = handle.index()
            .and_then(|i| self.samplers.get_mut(i))
            .ok_or_else(|| Error::InvalidResource(format!("unknown sampler {:?}", handle)))?;
        sampler.upload(&mut *device)
    }

    /// Destroy every device object and clear the registries
    pub fn destroy(&mut self) {
        for image in &mut self.images {
            image.destroy();
        }
        for buffer in &mut self.buffers {
            buffer.destroy();
        }
        for sampler in &mut self.samplers {
            sampler.destroy();
        }
        self.images.clear();
        self.buffers.clear();
        self.samplers.clear();
        self.default_sampler = SamplerHandle::NONE;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
