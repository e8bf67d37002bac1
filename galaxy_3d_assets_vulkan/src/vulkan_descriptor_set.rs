/// DescriptorSet - Vulkan implementation of the DescriptorSet trait
///
/// Each set owns its layout and a pool sized for exactly that set. Array
/// bindings are created PARTIALLY_BOUND so a bindless texture table can be
/// filled slot by slot; the device must enable `descriptorBindingPartiallyBound`.

use galaxy_3d_assets::galaxy3d::{Error, Result};
use galaxy_3d_assets::galaxy3d::device::{
    DescriptorSet as GraphicsDescriptorSet, DescriptorSetDesc, DescriptorWrite,
};
use galaxy_3d_assets::engine_err;
use ash::vk;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_format::descriptor_type_to_vk;
use crate::vulkan_image::Image;
use crate::vulkan_sampler::Sampler;

/// Vulkan descriptor set implementation
pub struct DescriptorSet {
    ctx: Arc<GpuContext>,
    pool: vk::DescriptorPool,
    layout: vk::DescriptorSetLayout,
    pub(crate) descriptor_set: vk::DescriptorSet,
    /// Resources referenced by the set, keyed by (binding, array element)
    bound: Mutex<FxHashMap<(u32, u32), DescriptorWrite>>,
}

impl DescriptorSet {
    pub fn create(ctx: &Arc<GpuContext>, desc: &DescriptorSetDesc) -> Result<Self> {
        let bindings: Vec<vk::DescriptorSetLayoutBinding> = desc
            .bindings
            .iter()
            .map(|b| {
                vk::DescriptorSetLayoutBinding::default()
                    .binding(b.binding)
                    .descriptor_type(descriptor_type_to_vk(b.descriptor_type))
                    .descriptor_count(b.count)
                    .stage_flags(vk::ShaderStageFlags::ALL)
            })
            .collect();
        let binding_flags: Vec<vk::DescriptorBindingFlags> = desc
            .bindings
            .iter()
            .map(|b| {
                if b.count > 1 {
                    vk::DescriptorBindingFlags::PARTIALLY_BOUND
                } else {
                    vk::DescriptorBindingFlags::empty()
                }
            })
            .collect();

        let mut pool_counts: FxHashMap<vk::DescriptorType, u32> = FxHashMap::default();
        for b in &desc.bindings {
            *pool_counts.entry(descriptor_type_to_vk(b.descriptor_type)).or_insert(0) += b.count;
        }
        let pool_sizes: Vec<vk::DescriptorPoolSize> = pool_counts
            .into_iter()
            .map(|(ty, descriptor_count)| vk::DescriptorPoolSize { ty, descriptor_count })
            .collect();

        unsafe {
            let mut flags_info = vk::DescriptorSetLayoutBindingFlagsCreateInfo::default()
                .binding_flags(&binding_flags);
            let layout_info = vk::DescriptorSetLayoutCreateInfo::default()
                .bindings(&bindings)
                .push_next(&mut flags_info);
            let layout = ctx.device.create_descriptor_set_layout(&layout_info, None)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create descriptor set layout: {:?}", e))?;

            let pool_info = vk::DescriptorPoolCreateInfo::default()
                .pool_sizes(&pool_sizes)
                .max_sets(1);
            let pool = match ctx.device.create_descriptor_pool(&pool_info, None) {
                Ok(pool) => pool,
                Err(e) => {
                    ctx.device.destroy_descriptor_set_layout(layout, None);
                    return Err(engine_err!("galaxy3d::vulkan", "Failed to create descriptor pool: {:?}", e));
                }
            };

            let layouts = [layout];
            let alloc_info = vk::DescriptorSetAllocateInfo::default()
                .descriptor_pool(pool)
                .set_layouts(&layouts);
            let descriptor_set = match ctx.device.allocate_descriptor_sets(&alloc_info) {
                Ok(sets) => sets[0],
                Err(e) => {
                    ctx.device.destroy_descriptor_pool(pool, None);
                    ctx.device.destroy_descriptor_set_layout(layout, None);
                    return Err(engine_err!("galaxy3d::vulkan", "Failed to allocate descriptor set: {:?}", e));
                }
            };

            Ok(Self {
                ctx: Arc::clone(ctx),
                pool,
                layout,
                descriptor_set,
                bound: Mutex::new(FxHashMap::default()),
            })
        }
    }

    /// Layout for building pipeline layouts that use this set
    pub fn layout(&self) -> vk::DescriptorSetLayout {
        self.layout
    }

    pub fn handle(&self) -> vk::DescriptorSet {
        self.descriptor_set
    }

    /// # Safety
    ///
    /// `set` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(set: &Arc<dyn GraphicsDescriptorSet>) -> &DescriptorSet {
        &*(Arc::as_ptr(set) as *const DescriptorSet)
    }

    /// Write one descriptor and keep its resources alive while bound
    ///
    /// # Safety
    ///
    /// Every resource in `write` must have been created by the same device.
    pub(crate) unsafe fn write(&self, write: &DescriptorWrite) -> Result<()> {
        let key = match write {
            DescriptorWrite::StorageBuffer { binding, buffer } => {
                let buffer_info = [vk::DescriptorBufferInfo {
                    buffer: Buffer::from_dyn(buffer).buffer,
                    offset: 0,
                    range: vk::WHOLE_SIZE,
                }];
                let vk_write = vk::WriteDescriptorSet::default()
                    .dst_set(self.descriptor_set)
                    .dst_binding(*binding)
                    .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
                    .buffer_info(&buffer_info);
                self.ctx.device.update_descriptor_sets(&[vk_write], &[]);
                (*binding, 0)
            }
            DescriptorWrite::CombinedImageSampler { binding, array_element, image, sampler } => {
                let image_info = [vk::DescriptorImageInfo {
                    sampler: Sampler::from_dyn(sampler).sampler,
                    image_view: Image::from_dyn(image).view,
                    image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                }];
                let vk_write = vk::WriteDescriptorSet::default()
                    .dst_set(self.descriptor_set)
                    .dst_binding(*binding)
                    .dst_array_element(*array_element)
                    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                    .image_info(&image_info);
                self.ctx.device.update_descriptor_sets(&[vk_write], &[]);
                (*binding, *array_element)
            }
        };

        self.bound
            .lock()
            .map_err(|_| Error::BackendError("descriptor set lock poisoned".to_string()))?
            .insert(key, write.clone());
        Ok(())
    }
}

impl GraphicsDescriptorSet for DescriptorSet {}

impl Drop for DescriptorSet {
    fn drop(&mut self) {
        unsafe {
            // Frees the set with it
            self.ctx.device.destroy_descriptor_pool(self.pool, None);
            self.ctx.device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}
