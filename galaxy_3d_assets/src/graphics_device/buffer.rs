/// Buffer trait and buffer descriptor

use bitflags::bitflags;
use crate::error::Result;
use crate::graphics_device::MemoryProperties;

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        const VERTEX = 1 << 0;
        const INDEX = 1 << 1;
        const UNIFORM = 1 << 2;
        const STORAGE = 1 << 3;
        const TRANSFER_SRC = 1 << 4;
        const TRANSFER_DST = 1 << 5;
    }
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    pub usage: BufferUsage,
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types (e.g., VulkanBuffer).
/// The buffer is automatically destroyed when dropped.
pub trait Buffer: Send + Sync {
    /// Size in bytes
    fn size(&self) -> u64;

    fn memory_properties(&self) -> MemoryProperties;

    /// Copy `data` into mapped memory at `offset` and flush it
    ///
    /// Fails when the memory is not host-visible or the range does not fit.
    fn write_mapped(&self, offset: u64, data: &[u8]) -> Result<()>;
}
