/// Loader module - file discovery and format loaders (OBJ, glTF, images)

pub mod asset_loader;
pub mod load_progress;
pub mod obj_parser;
pub mod obj_loader;
pub mod gltf_loader;
pub mod texture_loader;

pub use asset_loader::{AssetLoader, LoaderKind};
pub use load_progress::{LoadProgress, LoadProgressSnapshot};
pub use texture_loader::{handle_texture, handle_texture_combination};
