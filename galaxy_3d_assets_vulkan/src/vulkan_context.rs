/// GpuContext - Shared GPU state for all Vulkan objects
///
/// Contains everything needed by buffers, images and transfer scopes:
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - Queue for transfer submission
/// - Command pool for one-shot transfer command buffers

use galaxy_3d_assets::galaxy3d::Result;
use galaxy_3d_assets::engine_err;
use ash::vk;
use gpu_allocator::vulkan::Allocator;
use std::sync::{Arc, Mutex};

/// Shared GPU context for all Vulkan resources.
///
/// Shared (via `Arc`) by every object the device creates, so it stays alive
/// until the last buffer or image is dropped. The logical device and the
/// allocator belong to the application and must outlive it.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator (shared with the application)
    pub allocator: Arc<Mutex<Allocator>>,

    /// Queue used for transfer submission (graphics or dedicated transfer)
    pub queue: vk::Queue,

    /// Family of `queue`
    pub queue_family: u32,

    /// Command pool for one-shot transfer command buffers
    /// (created with TRANSIENT + RESET_COMMAND_BUFFER flags)
    pub transfer_command_pool: Mutex<vk::CommandPool>,
}

impl GpuContext {
    pub fn new(
        device: ash::Device,
        allocator: Arc<Mutex<Allocator>>,
        queue: vk::Queue,
        queue_family: u32,
    ) -> Result<Self> {
        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(queue_family)
            .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

        let pool = unsafe { device.create_command_pool(&pool_info, None) }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create transfer command pool: {:?}", e))?;

        Ok(Self {
            device,
            allocator,
            queue,
            queue_family,
            transfer_command_pool: Mutex::new(pool),
        })
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        // Last reference: every command buffer from the pool is gone
        if let Ok(pool) = self.transfer_command_pool.get_mut() {
            if *pool != vk::CommandPool::null() {
                unsafe { self.device.destroy_command_pool(*pool, None) };
                *pool = vk::CommandPool::null();
            }
        }
    }
}
