/// Asset subsystem configuration

use std::path::PathBuf;
use crate::asset::CompatibilityDescriptor;

/// Asset subsystem configuration
#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Directories scanned for loadable files (also used to resolve
    /// texture paths referenced by material files)
    pub root_directories: Vec<PathBuf>,
    /// Size of the bindless texture table
    pub max_texture_count: u32,
    /// Number of `f32` entries in the material buffer
    pub max_material_entry_count: u32,
    /// Staging buffer size hint in bytes, for backends that pool staging memory
    pub staging_buffer_size: u64,
    /// Log every loaded mesh and texture at INFO level
    pub log_asset_loading: bool,
    /// Material slot layout
    pub compatibility: CompatibilityDescriptor,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root_directories: Vec::new(),
            max_texture_count: 100,
            max_material_entry_count: 1000,
            staging_buffer_size: 64 * 1024 * 1024,
            log_asset_loading: false,
            compatibility: CompatibilityDescriptor::default(),
        }
    }
}
