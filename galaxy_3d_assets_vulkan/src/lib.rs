/*!
# Galaxy 3D Assets - Vulkan Backend

Vulkan implementation of the `GraphicsDevice` trait used by the Galaxy 3D
asset subsystem.

This crate uses the Ash library for Vulkan bindings and gpu-allocator for
memory management. It does not create instances, devices or windows: the
application hands over its logical device, a queue and an allocator.

The device must enable the `descriptorBindingPartiallyBound` feature, which
the bindless texture table relies on.
*/

mod vulkan_context;
mod vulkan_format;
mod vulkan_buffer;
mod vulkan_image;
mod vulkan_sampler;
mod vulkan_descriptor_set;
mod vulkan_transfer;
mod vulkan_graphics_device;

pub use vulkan_context::GpuContext;
pub use vulkan_graphics_device::{VulkanGraphicsDevice, DEFAULT_STAGING_BUFFER_SIZE};

pub mod galaxy3d {
    pub use crate::vulkan_graphics_device::{VulkanGraphicsDevice, DEFAULT_STAGING_BUFFER_SIZE};
    pub use crate::vulkan_context::GpuContext;
    pub use crate::vulkan_buffer::Buffer as VulkanBuffer;
    pub use crate::vulkan_image::Image as VulkanImage;
    pub use crate::vulkan_sampler::Sampler as VulkanSampler;
    pub use crate::vulkan_descriptor_set::DescriptorSet as VulkanDescriptorSet;
}
