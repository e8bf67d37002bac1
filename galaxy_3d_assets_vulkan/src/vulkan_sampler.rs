/// Sampler - Vulkan implementation of the Sampler trait

use galaxy_3d_assets::galaxy3d::Result;
use galaxy_3d_assets::galaxy3d::device::{Sampler as GraphicsSampler, SamplerDesc};
use galaxy_3d_assets::engine_err;
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{address_mode_to_vk, border_color_to_vk, filter_to_vk, mipmap_mode_to_vk};

/// Vulkan sampler, destroyed on drop
pub struct Sampler {
    ctx: Arc<GpuContext>,
    pub(crate) sampler: vk::Sampler,
    desc: SamplerDesc,
}

impl Sampler {
    pub fn create(ctx: &Arc<GpuContext>, desc: &SamplerDesc) -> Result<Self> {
        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(filter_to_vk(desc.mag_filter))
            .min_filter(filter_to_vk(desc.min_filter))
            .mipmap_mode(mipmap_mode_to_vk(desc.mipmap_mode))
            .address_mode_u(address_mode_to_vk(desc.address_mode_u))
            .address_mode_v(address_mode_to_vk(desc.address_mode_v))
            .address_mode_w(address_mode_to_vk(desc.address_mode_w))
            .mip_lod_bias(desc.mip_lod_bias)
            .anisotropy_enable(desc.anisotropy_enable)
            .max_anisotropy(if desc.anisotropy_enable { desc.max_anisotropy } else { 1.0 })
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .min_lod(desc.min_lod)
            .max_lod(desc.max_lod)
            .border_color(border_color_to_vk(desc.border_color))
            .unnormalized_coordinates(false);

        let sampler = unsafe { ctx.device.create_sampler(&create_info, None) }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create sampler: {:?}", e))?;

        Ok(Self {
            ctx: Arc::clone(ctx),
            sampler,
            desc: desc.clone(),
        })
    }

    /// # Safety
    ///
    /// `sampler` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(sampler: &Arc<dyn GraphicsSampler>) -> &Sampler {
        &*(Arc::as_ptr(sampler) as *const Sampler)
    }
}

impl GraphicsSampler for Sampler {
    fn desc(&self) -> &SamplerDesc {
        &self.desc
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        unsafe { self.ctx.device.destroy_sampler(self.sampler, None) };
    }
}
