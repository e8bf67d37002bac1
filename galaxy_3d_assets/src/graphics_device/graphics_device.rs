/// GraphicsDevice trait - factory for GPU objects and transfer scopes

use std::sync::Arc;
use bitflags::bitflags;
use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, Image, ImageDesc, Sampler, SamplerDesc,
    DescriptorSet, DescriptorSetDesc, DescriptorWrite, TransferCommands,
};

bitflags! {
    /// Properties of the memory backing a buffer or image
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryProperties: u32 {
        const DEVICE_LOCAL = 1 << 0;
        const HOST_VISIBLE = 1 << 1;
        const HOST_COHERENT = 1 << 2;
    }
}

impl MemoryProperties {
    /// Whether the CPU can map this memory and write into it directly
    pub fn is_host_visible(self) -> bool {
        self.contains(MemoryProperties::HOST_VISIBLE)
    }
}

/// Device interface used by resources to reach GPU memory
///
/// Implemented by backend devices (e.g. `VulkanGraphicsDevice`). Every object
/// is returned behind an `Arc` and destroyed when the last reference drops.
/// Callers share the device as `Arc<Mutex<dyn GraphicsDevice>>`, which also
/// serializes transfer submissions.
pub trait GraphicsDevice: Send + Sync {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    fn create_image(&mut self, desc: ImageDesc) -> Result<Arc<dyn Image>>;

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<Arc<dyn Sampler>>;

    fn create_descriptor_set(&mut self, desc: &DescriptorSetDesc) -> Result<Arc<dyn DescriptorSet>>;

    /// Write one descriptor (a storage buffer or one element of an image array)
    fn write_descriptor_set(
        &mut self,
        set: &Arc<dyn DescriptorSet>,
        write: &DescriptorWrite,
    ) -> Result<()>;

    /// Get a host-visible buffer of at least `size` bytes for staging uploads
    fn request_staging_buffer(&mut self, size: u64) -> Result<Arc<dyn Buffer>>;

    /// Give a staging buffer back once the transfer that used it completed
    fn return_staging_buffer(&mut self, buffer: Arc<dyn Buffer>);

    /// Open a transfer scope. Commands run when the scope is ended.
    fn begin_transfer(&mut self) -> Result<Box<dyn TransferCommands>>;

    /// Submit a transfer scope and wait for it to complete
    fn end_transfer(&mut self, commands: Box<dyn TransferCommands>) -> Result<()> {
        commands.submit()
    }

    /// Wait for all GPU operations to complete
    fn wait_idle(&self) -> Result<()>;
}
