/// Transfer scope: commands recorded between `begin_transfer` and `end_transfer`

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Buffer, Image, ImageLayout};

/// Layout transition over a range of mip levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBarrier {
    pub base_mip_level: u32,
    pub level_count: u32,
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
}

/// Blit from one mip level into the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipBlit {
    pub src_level: u32,
    pub src_extent: (u32, u32),
    pub dst_extent: (u32, u32),
}

/// Recorded transfer commands
///
/// Backends record into a one-shot command buffer; `submit` runs it on the
/// transfer queue and blocks until completion.
pub trait TransferCommands: Send {
    fn copy_buffer(
        &mut self,
        src: &Arc<dyn Buffer>,
        dst: &Arc<dyn Buffer>,
        size: u64,
    ) -> Result<()>;

    /// Copy tightly packed pixels into mip level 0 (image must be in TransferDst)
    fn copy_buffer_to_image(
        &mut self,
        src: &Arc<dyn Buffer>,
        dst: &Arc<dyn Image>,
        width: u32,
        height: u32,
    ) -> Result<()>;

    /// Inline update of a small buffer range
    fn update_buffer(&mut self, dst: &Arc<dyn Buffer>, offset: u64, data: &[u8]) -> Result<()>;

    fn image_barrier(&mut self, image: &Arc<dyn Image>, barrier: &ImageBarrier) -> Result<()>;

    fn blit_image_level(&mut self, image: &Arc<dyn Image>, blit: &MipBlit) -> Result<()>;

    fn submit(self: Box<Self>) -> Result<()>;
}
