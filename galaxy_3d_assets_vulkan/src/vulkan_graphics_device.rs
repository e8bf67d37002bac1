/// VulkanGraphicsDevice - Vulkan implementation of the GraphicsDevice trait

use galaxy_3d_assets::galaxy3d::Result;
use galaxy_3d_assets::galaxy3d::device::{
    Buffer as GraphicsBuffer, BufferDesc, BufferUsage, DescriptorSet as GraphicsDescriptorSet,
    DescriptorSetDesc, DescriptorWrite, GraphicsDevice, Image as GraphicsImage, ImageDesc,
    Sampler as GraphicsSampler, SamplerDesc, TransferCommands,
};
use galaxy_3d_assets::{engine_debug, engine_err, engine_info};
use ash::vk;
use gpu_allocator::vulkan::Allocator;
use gpu_allocator::MemoryLocation;
use std::sync::{Arc, Mutex};

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_descriptor_set::DescriptorSet;
use crate::vulkan_image::Image;
use crate::vulkan_sampler::Sampler;
use crate::vulkan_transfer::Transfer;

/// Default minimum size of a pooled staging buffer (16 MB)
pub const DEFAULT_STAGING_BUFFER_SIZE: u64 = 16 * 1024 * 1024;

/// Vulkan graphics device
///
/// Built on a logical device, queue and allocator owned by the application,
/// which must keep them alive (and the device undestroyed) until every object
/// created here has been dropped. The queue must support transfer and, for
/// mip generation, graphics operations.
pub struct VulkanGraphicsDevice {
    ctx: Arc<GpuContext>,
    /// Minimum size of a newly created staging buffer
    staging_buffer_size: u64,
    /// Returned staging buffers, ready for reuse
    staging_pool: Vec<Arc<dyn GraphicsBuffer>>,
}

impl VulkanGraphicsDevice {
    pub fn new(
        device: ash::Device,
        allocator: Arc<Mutex<Allocator>>,
        queue: vk::Queue,
        queue_family: u32,
        staging_buffer_size: u64,
    ) -> Result<Self> {
        let ctx = GpuContext::new(device, allocator, queue, queue_family)?;

        engine_info!("galaxy3d::vulkan", "VulkanGraphicsDevice created (queue family {}, staging {} bytes)",
            queue_family, staging_buffer_size);

        Ok(Self {
            ctx: Arc::new(ctx),
            staging_buffer_size,
            staging_pool: Vec::new(),
        })
    }

    /// Shared context, for backend code that records its own commands
    pub fn context(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    /// Number of staging buffers waiting for reuse
    pub fn pooled_staging_buffers(&self) -> usize {
        self.staging_pool.len()
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn GraphicsBuffer>> {
        let buffer = Buffer::create(&self.ctx, &desc, MemoryLocation::GpuOnly, "buffer")?;
        Ok(Arc::new(buffer))
    }

    fn create_image(&mut self, desc: ImageDesc) -> Result<Arc<dyn GraphicsImage>> {
        let image = Image::create(&self.ctx, desc)?;
        Ok(Arc::new(image))
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<Arc<dyn GraphicsSampler>> {
        let sampler = Sampler::create(&self.ctx, desc)?;
        Ok(Arc::new(sampler))
    }

    fn create_descriptor_set(&mut self, desc: &DescriptorSetDesc) -> Result<Arc<dyn GraphicsDescriptorSet>> {
        let set = DescriptorSet::create(&self.ctx, desc)?;
        Ok(Arc::new(set))
    }

    fn write_descriptor_set(
        &mut self,
        set: &Arc<dyn GraphicsDescriptorSet>,
        write: &DescriptorWrite,
    ) -> Result<()> {
        unsafe { DescriptorSet::from_dyn(set).write(write) }
    }

    fn request_staging_buffer(&mut self, size: u64) -> Result<Arc<dyn GraphicsBuffer>> {
        if let Some(index) = self.staging_pool.iter().position(|b| b.size() >= size) {
            return Ok(self.staging_pool.swap_remove(index));
        }

        let desc = BufferDesc {
            size: size.max(self.staging_buffer_size),
            usage: BufferUsage::TRANSFER_SRC,
        };
        engine_debug!("galaxy3d::vulkan", "Creating staging buffer of {} bytes", desc.size);
        let buffer = Buffer::create(&self.ctx, &desc, MemoryLocation::CpuToGpu, "staging")?;
        Ok(Arc::new(buffer))
    }

    fn return_staging_buffer(&mut self, buffer: Arc<dyn GraphicsBuffer>) {
        self.staging_pool.push(buffer);
    }

    fn begin_transfer(&mut self) -> Result<Box<dyn TransferCommands>> {
        Ok(Box::new(Transfer::begin(&self.ctx)?))
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.ctx.device.device_wait_idle()
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to wait for device idle: {:?}", e))?;
        }
        Ok(())
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.device_wait_idle().ok();
        }
        self.staging_pool.clear();
        engine_info!("galaxy3d::vulkan", "VulkanGraphicsDevice destroyed");
    }
}
