/// TransferCommands - one-shot command buffer on the transfer queue
///
/// Recording starts when the scope is created; `submit` ends the command
/// buffer, submits it with a fence and blocks until it has executed.
/// Every resource a command touches is kept alive until then.

use galaxy_3d_assets::galaxy3d::{Error, Result};
use galaxy_3d_assets::galaxy3d::device::{
    Buffer as GraphicsBuffer, Image as GraphicsImage, ImageBarrier, MipBlit, TransferCommands,
};
use galaxy_3d_assets::engine_err;
use ash::vk;
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{extent_offset, image_layout_to_vk, layout_access};
use crate::vulkan_image::Image;

/// vkCmdUpdateBuffer limit per call
const MAX_INLINE_UPDATE: usize = 65536;

pub struct Transfer {
    ctx: Arc<GpuContext>,
    command_buffer: vk::CommandBuffer,
    buffers: Vec<Arc<dyn GraphicsBuffer>>,
    images: Vec<Arc<dyn GraphicsImage>>,
    submitted: bool,
}

impl Transfer {
    pub fn begin(ctx: &Arc<GpuContext>) -> Result<Self> {
        let pool = ctx.transfer_command_pool
            .lock()
            .map_err(|_| engine_err!("galaxy3d::vulkan", "Transfer command pool lock poisoned"))?;

        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffer = ctx.device.allocate_command_buffers(&allocate_info)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to allocate transfer command buffer: {:?}", e))?[0];

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            if let Err(e) = ctx.device.begin_command_buffer(command_buffer, &begin_info) {
                ctx.device.free_command_buffers(*pool, &[command_buffer]);
                return Err(engine_err!("galaxy3d::vulkan", "Failed to begin transfer command buffer: {:?}", e));
            }

            Ok(Self {
                ctx: Arc::clone(ctx),
                command_buffer,
                buffers: Vec::new(),
                images: Vec::new(),
                submitted: false,
            })
        }
    }

    fn keep_buffer(&mut self, buffer: &Arc<dyn GraphicsBuffer>) {
        self.buffers.push(Arc::clone(buffer));
    }

    fn keep_image(&mut self, image: &Arc<dyn GraphicsImage>) {
        self.images.push(Arc::clone(image));
    }

    fn submit_and_wait(&mut self) -> Result<()> {
        let device = &self.ctx.device;
        unsafe {
            device.end_command_buffer(self.command_buffer)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to end transfer command buffer: {:?}", e))?;

            let fence = device.create_fence(&vk::FenceCreateInfo::default(), None)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create transfer fence: {:?}", e))?;

            let command_buffers = [self.command_buffer];
            let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
            let result = device
                .queue_submit(self.ctx.queue, &[submit_info], fence)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to submit transfer: {:?}", e))
                .and_then(|_| {
                    device
                        .wait_for_fences(&[fence], true, u64::MAX)
                        .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to wait for transfer fence: {:?}", e))
                });
            device.destroy_fence(fence, None);
            result
        }
    }
}

impl TransferCommands for Transfer {
    fn copy_buffer(&mut self, src: &Arc<dyn GraphicsBuffer>, dst: &Arc<dyn GraphicsBuffer>, size: u64) -> Result<()> {
        unsafe {
            let region = vk::BufferCopy { src_offset: 0, dst_offset: 0, size };
            self.ctx.device.cmd_copy_buffer(
                self.command_buffer,
                Buffer::from_dyn(src).buffer,
                Buffer::from_dyn(dst).buffer,
                &[region],
            );
        }
        self.keep_buffer(src);
        self.keep_buffer(dst);
        Ok(())
    }

    fn copy_buffer_to_image(
        &mut self,
        src: &Arc<dyn GraphicsBuffer>,
        dst: &Arc<dyn GraphicsImage>,
        width: u32,
        height: u32,
    ) -> Result<()> {
        unsafe {
            let region = vk::BufferImageCopy::default()
                .buffer_offset(0)
                .buffer_row_length(0)
                .buffer_image_height(0)
                .image_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    mip_level: 0,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
                .image_extent(vk::Extent3D { width, height, depth: 1 });

            self.ctx.device.cmd_copy_buffer_to_image(
                self.command_buffer,
                Buffer::from_dyn(src).buffer,
                Image::from_dyn(dst).image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );
        }
        self.keep_buffer(src);
        self.keep_image(dst);
        Ok(())
    }

    fn update_buffer(&mut self, dst: &Arc<dyn GraphicsBuffer>, offset: u64, data: &[u8]) -> Result<()> {
        if offset % 4 != 0 || data.len() % 4 != 0 {
            return Err(Error::InvalidResource(format!(
                "inline buffer update at {} of {} bytes is not 4-byte aligned",
                offset,
                data.len()
            )));
        }
        let buffer = unsafe { Buffer::from_dyn(dst).buffer };
        for (i, chunk) in data.chunks(MAX_INLINE_UPDATE).enumerate() {
            let chunk_offset = offset + (i * MAX_INLINE_UPDATE) as u64;
            unsafe {
                self.ctx.device.cmd_update_buffer(self.command_buffer, buffer, chunk_offset, chunk);
            }
        }
        self.keep_buffer(dst);
        Ok(())
    }

    fn image_barrier(&mut self, image: &Arc<dyn GraphicsImage>, barrier: &ImageBarrier) -> Result<()> {
        let (src_access, src_stage) = layout_access(barrier.old_layout);
        let (dst_access, dst_stage) = layout_access(barrier.new_layout);
        unsafe {
            let vk_barrier = vk::ImageMemoryBarrier::default()
                .old_layout(image_layout_to_vk(barrier.old_layout))
                .new_layout(image_layout_to_vk(barrier.new_layout))
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(Image::from_dyn(image).image)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: barrier.base_mip_level,
                    level_count: barrier.level_count,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .src_access_mask(src_access)
                .dst_access_mask(dst_access);

            self.ctx.device.cmd_pipeline_barrier(
                self.command_buffer,
                src_stage,
                dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[vk_barrier],
            );
        }
        self.keep_image(image);
        Ok(())
    }

    fn blit_image_level(&mut self, image: &Arc<dyn GraphicsImage>, blit: &MipBlit) -> Result<()> {
        let subresource = |mip_level| vk::ImageSubresourceLayers {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            mip_level,
            base_array_layer: 0,
            layer_count: 1,
        };
        unsafe {
            let vk_image = Image::from_dyn(image).image;
            let region = vk::ImageBlit::default()
                .src_subresource(subresource(blit.src_level))
                .src_offsets([vk::Offset3D::default(), extent_offset(blit.src_extent)])
                .dst_subresource(subresource(blit.src_level + 1))
                .dst_offsets([vk::Offset3D::default(), extent_offset(blit.dst_extent)]);

            self.ctx.device.cmd_blit_image(
                self.command_buffer,
                vk_image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                vk_image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
                vk::Filter::LINEAR,
            );
        }
        self.keep_image(image);
        Ok(())
    }

    fn submit(mut self: Box<Self>) -> Result<()> {
        let result = self.submit_and_wait();
        self.submitted = result.is_ok();
        result
    }
}

impl Drop for Transfer {
    fn drop(&mut self) {
        unsafe {
            // An unsubmitted scope may still be referenced by a pending submit
            if !self.submitted {
                self.ctx.device.queue_wait_idle(self.ctx.queue).ok();
            }
            if let Ok(pool) = self.ctx.transfer_command_pool.lock() {
                self.ctx.device.free_command_buffers(*pool, &[self.command_buffer]);
            }
        }
    }
}
