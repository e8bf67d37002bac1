/// Image - Vulkan implementation of the Image trait (2D, sampled, with view)

use galaxy_3d_assets::galaxy3d::{Error, Result};
use galaxy_3d_assets::galaxy3d::device::{Image as GraphicsImage, ImageDesc, MemoryProperties};
use galaxy_3d_assets::{engine_err, engine_error};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{image_format_to_vk, image_usage_to_vk};

/// Vulkan image implementation
pub struct Image {
    ctx: Arc<GpuContext>,
    /// Vulkan image
    pub(crate) image: vk::Image,
    /// View over every mip level
    pub(crate) view: vk::ImageView,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    desc: ImageDesc,
}

impl Image {
    /// Create an optimal-tiling device-local image and its view
    pub fn create(ctx: &Arc<GpuContext>, desc: ImageDesc) -> Result<Self> {
        let format = image_format_to_vk(desc.format);
        let mip_levels = desc.mip_levels.max(1);

        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(format)
                .extent(vk::Extent3D {
                    width: desc.width,
                    height: desc.height,
                    depth: 1,
                })
                .mip_levels(mip_levels)
                .array_layers(1)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(image_usage_to_vk(desc.usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = ctx.device.create_image(&image_create_info, None)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create image {}x{}: {:?}", desc.width, desc.height, e))?;

            let mut this = Self {
                ctx: Arc::clone(ctx),
                image,
                view: vk::ImageView::null(),
                allocation: None,
                desc,
            };

            let requirements = ctx.device.get_image_memory_requirements(image);
            let allocation = ctx.allocator
                .lock()
                .map_err(|_| engine_err!("galaxy3d::vulkan", "Allocator lock poisoned"))?
                .allocate(&AllocationCreateDesc {
                    name: "image",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| {
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!(
                        "galaxy3d::vulkan",
                        "Out of GPU memory for image (size: {}x{}, mips: {}, {:.2} MB)",
                        this.desc.width, this.desc.height, mip_levels, size_mb
                    );
                    Error::OutOfMemory
                })?;

            let (memory, offset) = (allocation.memory(), allocation.offset());
            // Owned by `this` from here on, so error returns free it
            this.allocation = Some(allocation);
            ctx.device.bind_image_memory(image, memory, offset)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to bind image memory: {:?}", e))?;

            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: mip_levels,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            this.view = ctx.device.create_image_view(&view_create_info, None)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create image view: {:?}", e))?;

            Ok(this)
        }
    }

    /// The Vulkan image behind a device-interface image
    ///
    /// # Safety
    ///
    /// `image` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(image: &Arc<dyn GraphicsImage>) -> &Image {
        &*(Arc::as_ptr(image) as *const Image)
    }
}

impl GraphicsImage for Image {
    fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    /// Never host-visible: optimal tiling has no linear layout to map
    fn memory_properties(&self) -> MemoryProperties {
        MemoryProperties::DEVICE_LOCAL
    }

    fn write_mapped(&self, _data: &[u8]) -> Result<()> {
        Err(Error::BackendError("Optimal-tiling images are filled through staging buffers".to_string()))
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        unsafe {
            if self.view != vk::ImageView::null() {
                self.ctx.device.destroy_image_view(self.view, None);
            }

            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_image(self.image, None);
        }
    }
}
