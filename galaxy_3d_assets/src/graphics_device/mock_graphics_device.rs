/// Mock graphics device for unit tests (no GPU required)
///
/// Every call is recorded as a short command string so tests can assert on
/// the exact sequence a resource upload produced.

use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, MemoryProperties,
    Buffer, BufferDesc, BufferUsage,
    Image, ImageDesc,
    Sampler, SamplerDesc,
    DescriptorSet, DescriptorSetDesc, DescriptorWrite,
    TransferCommands, ImageBarrier, MipBlit,
};

/// Shared command log
pub type CommandLog = Arc<Mutex<Vec<String>>>;

fn record(log: &CommandLog, command: String) {
    if let Ok(mut log) = log.lock() {
        log.push(command);
    }
}

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    pub desc: BufferDesc,
    pub memory: MemoryProperties,
    pub data: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn new(desc: BufferDesc, memory: MemoryProperties) -> Self {
        let data = Mutex::new(vec![0u8; desc.size as usize]);
        Self { desc, memory, data }
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.desc.size
    }

    fn memory_properties(&self) -> MemoryProperties {
        self.memory
    }

    fn write_mapped(&self, offset: u64, data: &[u8]) -> Result<()> {
        if !self.memory.is_host_visible() {
            return Err(Error::InvalidResource("buffer memory is not host-visible".to_string()));
        }
        let start = offset as usize;
        let end = start + data.len();
        let mut bytes = self.data.lock().map_err(|_| Error::BackendError("mock buffer poisoned".to_string()))?;
        if end > bytes.len() {
            return Err(Error::InvalidResource(format!("write {}..{} exceeds buffer size {}", start, end, bytes.len())));
        }
        bytes[start..end].copy_from_slice(data);
        Ok(())
    }
}

// ============================================================================
// Mock Image
// ============================================================================

pub struct MockImage {
    pub desc: ImageDesc,
    pub memory: MemoryProperties,
    pub data: Mutex<Vec<u8>>,
}

impl Image for MockImage {
    fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    fn memory_properties(&self) -> MemoryProperties {
        self.memory
    }

    fn write_mapped(&self, data: &[u8]) -> Result<()> {
        if !self.memory.is_host_visible() {
            return Err(Error::InvalidResource("image memory is not host-visible".to_string()));
        }
        let mut bytes = self.data.lock().map_err(|_| Error::BackendError("mock image poisoned".to_string()))?;
        *bytes = data.to_vec();
        Ok(())
    }
}

// ============================================================================
// Mock Sampler / DescriptorSet
// ============================================================================

pub struct MockSampler {
    pub desc: SamplerDesc,
}

impl Sampler for MockSampler {
    fn desc(&self) -> &SamplerDesc {
        &self.desc
    }
}

pub struct MockDescriptorSet {
    pub desc: DescriptorSetDesc,
}

impl DescriptorSet for MockDescriptorSet {}

// ============================================================================
// Mock TransferCommands
// ============================================================================

pub struct MockTransferCommands {
    log: CommandLog,
    buffer_updates: Arc<Mutex<Vec<(u64, Vec<u8>)>>>,
    fail_submit: bool,
}

impl TransferCommands for MockTransferCommands {
    fn copy_buffer(&mut self, _src: &Arc<dyn Buffer>, _dst: &Arc<dyn Buffer>, size: u64) -> Result<()> {
        record(&self.log, format!("copy_buffer({})", size));
        Ok(())
    }

    fn copy_buffer_to_image(
        &mut self,
        _src: &Arc<dyn Buffer>,
        _dst: &Arc<dyn Image>,
        width: u32,
        height: u32,
    ) -> Result<()> {
        record(&self.log, format!("copy_buffer_to_image({}x{})", width, height));
        Ok(())
    }

    fn update_buffer(&mut self, _dst: &Arc<dyn Buffer>, offset: u64, data: &[u8]) -> Result<()> {
        record(&self.log, format!("update_buffer({}, {})", offset, data.len()));
        if let Ok(mut updates) = self.buffer_updates.lock() {
            updates.push((offset, data.to_vec()));
        }
        Ok(())
    }

    fn image_barrier(&mut self, _image: &Arc<dyn Image>, barrier: &ImageBarrier) -> Result<()> {
        record(&self.log, format!(
            "barrier({}+{} {:?}->{:?})",
            barrier.base_mip_level, barrier.level_count, barrier.old_layout, barrier.new_layout
        ));
        Ok(())
    }

    fn blit_image_level(&mut self, _image: &Arc<dyn Image>, blit: &MipBlit) -> Result<()> {
        record(&self.log, format!(
            "blit({} {}x{}->{}x{})",
            blit.src_level, blit.src_extent.0, blit.src_extent.1, blit.dst_extent.0, blit.dst_extent.1
        ));
        Ok(())
    }

    fn submit(self: Box<Self>) -> Result<()> {
        record(&self.log, "submit".to_string());
        if self.fail_submit {
            return Err(Error::BackendError("mock submit failed".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

pub struct MockGraphicsDevice {
    /// Memory reported for created buffers and images
    pub memory: MemoryProperties,
    pub log: CommandLog,
    /// (offset, bytes) of every `update_buffer`
    pub buffer_updates: Arc<Mutex<Vec<(u64, Vec<u8>)>>>,
    /// Make every transfer submit fail
    pub fail_submit: bool,
}

impl MockGraphicsDevice {
    /// Device-local memory: uploads go through staging buffers
    pub fn new() -> Self {
        Self::with_memory(MemoryProperties::DEVICE_LOCAL)
    }

    /// Host-visible memory: uploads write mapped memory directly
    pub fn new_host_visible() -> Self {
        Self::with_memory(MemoryProperties::HOST_VISIBLE | MemoryProperties::HOST_COHERENT)
    }

    fn with_memory(memory: MemoryProperties) -> Self {
        Self {
            memory,
            log: Arc::new(Mutex::new(Vec::new())),
            buffer_updates: Arc::new(Mutex::new(Vec::new())),
            fail_submit: false,
        }
    }

    /// Snapshot of the recorded commands
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Number of recorded commands starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.commands().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        record(&self.log, format!("create_buffer({})", desc.size));
        Ok(Arc::new(MockBuffer::new(desc, self.memory)))
    }

    fn create_image(&mut self, desc: ImageDesc) -> Result<Arc<dyn Image>> {
        record(&self.log, format!("create_image({}x{}, {})", desc.width, desc.height, desc.mip_levels));
        Ok(Arc::new(MockImage { desc, memory: self.memory, data: Mutex::new(Vec::new()) }))
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<Arc<dyn Sampler>> {
        record(&self.log, "create_sampler".to_string());
        Ok(Arc::new(MockSampler { desc: desc.clone() }))
    }

    fn create_descriptor_set(&mut self, desc: &DescriptorSetDesc) -> Result<Arc<dyn DescriptorSet>> {
        record(&self.log, format!("create_descriptor_set({})", desc.bindings.len()));
        Ok(Arc::new(MockDescriptorSet { desc: desc.clone() }))
    }

    fn write_descriptor_set(&mut self, _set: &Arc<dyn DescriptorSet>, write: &DescriptorWrite) -> Result<()> {
        let command = match write {
            DescriptorWrite::StorageBuffer { binding, .. } => {
                format!("write_descriptor({})", binding)
            }
            DescriptorWrite::CombinedImageSampler { binding, array_element, .. } => {
                format!("write_descriptor({}[{}])", binding, array_element)
            }
        };
        record(&self.log, command);
        Ok(())
    }

    fn request_staging_buffer(&mut self, size: u64) -> Result<Arc<dyn Buffer>> {
        record(&self.log, format!("request_staging_buffer({})", size));
        let desc = BufferDesc { size, usage: BufferUsage::TRANSFER_SRC };
        Ok(Arc::new(MockBuffer::new(desc, MemoryProperties::HOST_VISIBLE | MemoryProperties::HOST_COHERENT)))
    }

    fn return_staging_buffer(&mut self, _buffer: Arc<dyn Buffer>) {
        record(&self.log, "return_staging_buffer".to_string());
    }

    fn begin_transfer(&mut self) -> Result<Box<dyn TransferCommands>> {
        record(&self.log, "begin_transfer".to_string());
        Ok(Box::new(MockTransferCommands {
            log: self.log.clone(),
            buffer_updates: self.buffer_updates.clone(),
            fail_submit: self.fail_submit,
        }))
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
