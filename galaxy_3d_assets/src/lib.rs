/*!
# Galaxy 3D Assets

Asset ingestion for the Galaxy 3D engine.

This crate turns on-disk model and image files (OBJ/MTL, glTF/GLB, PNG/JPEG...)
into deduplicated, GPU-resident assets addressed by lightweight handles.
Device access goes through the `GraphicsDevice` trait; the Vulkan
implementation lives in `galaxy_3d_assets_vulkan`.

## Architecture

- **AssetSubsystem**: top-level owner, built once from an `AssetConfig`
- **AssetManager**: named registries (textures, materials, meshes, coloured
  and composite meshes), bindless texture table and material buffer
- **AssetLoader**: root directory scan and per-format loaders
- **ResourceManager**: CPU-side images/buffers/samplers and their upload state
- **MeshAssembler**: strided attribute views interleaved into vertex buffers
*/

// Internal modules
mod error;
mod engine;
mod config;
mod asset_subsystem;
pub mod log;
pub mod graphics_device;
pub mod utils;
pub mod resource;
pub mod asset;
pub mod loader;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Global logger entry point
    pub use crate::engine::Engine;

    // Top-level owner and its configuration
    pub use crate::asset_subsystem::AssetSubsystem;
    pub use crate::config::AssetConfig;

    // Logging sub-module (types only, macros are exported at crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Asset registries and asset types
    pub mod asset {
        pub use crate::asset::*;
    }

    // CPU-side GPU resources
    pub mod resource {
        pub use crate::resource::*;
    }

    // File loaders
    pub mod loader {
        pub use crate::loader::*;
    }

    // Device interface implemented by backends
    pub mod device {
        pub use crate::graphics_device::*;
    }

    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
