/// Buffer - Vulkan implementation of the Buffer trait

use galaxy_3d_assets::galaxy3d::{Error, Result};
use galaxy_3d_assets::galaxy3d::device::{Buffer as GraphicsBuffer, BufferDesc, MemoryProperties};
use galaxy_3d_assets::{engine_err, engine_error};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{buffer_usage_to_vk, memory_properties_from_vk};

/// Vulkan buffer implementation
pub struct Buffer {
    /// Shared GPU context (device, allocator, queue, command pool)
    ctx: Arc<GpuContext>,
    /// Vulkan buffer
    pub(crate) buffer: vk::Buffer,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    /// Buffer size
    pub(crate) size: u64,
    memory_properties: MemoryProperties,
}

impl Buffer {
    /// Create and bind a buffer
    ///
    /// `location` selects device-local (`GpuOnly`) or mappable (`CpuToGpu`) memory.
    pub fn create(ctx: &Arc<GpuContext>, desc: &BufferDesc, location: MemoryLocation, name: &str) -> Result<Self> {
        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(desc.size)
                .usage(buffer_usage_to_vk(desc.usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = ctx.device.create_buffer(&buffer_create_info, None)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create buffer of size {} bytes: {:?}", desc.size, e))?;

            let mut this = Self {
                ctx: Arc::clone(ctx),
                buffer,
                allocation: None,
                size: desc.size,
                memory_properties: MemoryProperties::empty(),
            };

            let requirements = ctx.device.get_buffer_memory_requirements(buffer);
            let allocation = ctx.allocator
                .lock()
                .map_err(|_| engine_err!("galaxy3d::vulkan", "Allocator lock poisoned"))?
                .allocate(&AllocationCreateDesc {
                    name,
                    requirements,
                    location,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| {
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!("galaxy3d::vulkan", "Out of GPU memory for {} (required: {:.2} MB)", name, size_mb);
                    Error::OutOfMemory
                })?;

            let (memory, offset) = (allocation.memory(), allocation.offset());
            this.memory_properties = memory_properties_from_vk(allocation.memory_properties());
            this.allocation = Some(allocation);
            ctx.device.bind_buffer_memory(buffer, memory, offset)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to bind buffer memory: {:?}", e))?;

            Ok(this)
        }
    }

    /// The Vulkan buffer behind a device-interface buffer
    ///
    /// # Safety
    ///
    /// `buffer` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(buffer: &Arc<dyn GraphicsBuffer>) -> &Buffer {
        &*(Arc::as_ptr(buffer) as *const Buffer)
    }
}

impl GraphicsBuffer for Buffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn memory_properties(&self) -> MemoryProperties {
        self.memory_properties
    }

    fn write_mapped(&self, offset: u64, data: &[u8]) -> Result<()> {
        let Some(allocation) = &self.allocation else {
            engine_error!("galaxy3d::vulkan", "Buffer write failed: no GPU allocation");
            return Err(Error::BackendError("Buffer has no allocation".to_string()));
        };
        if offset + data.len() as u64 > self.size {
            return Err(Error::InvalidResource(format!(
                "write {}..{} exceeds buffer size {}",
                offset,
                offset + data.len() as u64,
                self.size
            )));
        }

        let mapped_ptr = allocation
            .mapped_ptr()
            .ok_or_else(|| Error::BackendError("Buffer is not CPU-accessible".to_string()))?
            .as_ptr() as *mut u8;

        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped_ptr.add(offset as usize), data.len());

            if !self.memory_properties.contains(MemoryProperties::HOST_COHERENT) {
                let range = vk::MappedMemoryRange::default()
                    .memory(allocation.memory())
                    .offset(0)
                    .size(vk::WHOLE_SIZE);
                self.ctx.device.flush_mapped_memory_ranges(&[range])
                    .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to flush mapped buffer: {:?}", e))?;
            }
        }
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
