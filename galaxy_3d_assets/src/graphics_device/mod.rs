/// Graphics device module - the narrow device interface consumed by the asset
/// subsystem (resource creation, transfer scopes, descriptor writes)

pub mod graphics_device;
pub mod buffer;
pub mod image;
pub mod sampler;
pub mod descriptor_set;
pub mod transfer;

pub use graphics_device::*;
pub use buffer::*;
pub use image::*;
pub use sampler::*;
pub use descriptor_set::*;
pub use transfer::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
