/// AssetSubsystem - top-level owner of the asset registries and the loader.
///
/// Constructed once from an `AssetConfig` and a graphics device, then passed
/// by reference to whatever needs assets. There is no global registry.

use std::sync::{Arc, Mutex};
use crate::asset::{AssetManager, CompositeMeshHandle};
use crate::config::AssetConfig;
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::loader::{AssetLoader, LoadProgress};
use crate::engine_info;

pub struct AssetSubsystem {
    manager: AssetManager,
    loader: AssetLoader,
}

impl AssetSubsystem {
    pub fn new(config: &AssetConfig, device: Arc<Mutex<dyn GraphicsDevice>>) -> Self {
        let mut loader = AssetLoader::new();
        for root in &config.root_directories {
            loader.add_root_directory(root.clone());
        }
        Self {
            manager: AssetManager::new(device, config),
            loader,
        }
    }

    /// Create the GPU tables, the default assets, and register every file
    /// found under the root directories
    pub fn initialize(&mut self) -> Result<()> {
        self.manager.initialize()?;
        let found = self.loader.collect_files(&mut self.manager)?;
        engine_info!("galaxy3d::AssetSubsystem", "Asset subsystem ready ({} files)", found);
        Ok(())
    }

    pub fn destroy(&mut self) {
        self.manager.destroy();
    }

    pub fn manager(&self) -> &AssetManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut AssetManager {
        &mut self.manager
    }

    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    pub fn progress(&self) -> Arc<LoadProgress> {
        self.loader.progress()
    }

    /// Load (if needed) and prepare a composite mesh by name
    ///
    /// Unknown or unloadable names yield a handle resolving to the default
    /// composite mesh.
    pub fn load_composite_mesh(&mut self, name: &str) -> Result<CompositeMeshHandle> {
        self.loader.validate_assets(&mut self.manager, &[name])?;
        Ok(self.manager.get_composite_mesh(name))
    }

    pub fn available_composite_mesh_names(&self) -> Vec<String> {
        self.manager.available_composite_mesh_names()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "asset_subsystem_tests.rs"]
mod tests;
