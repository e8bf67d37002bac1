/// Asset module - named registries of renderable assets and the manager
/// that uploads them

pub mod asset_id;
pub mod asset_container;
pub mod compatibility_descriptor;
pub mod texture;
pub mod material;
pub mod mesh;
pub mod coloured_mesh;
pub mod composite_mesh;
pub mod renderer_dependency;
pub mod mesh_assembler;
pub mod asset_manager;

pub use asset_id::*;
pub use asset_container::*;
pub use compatibility_descriptor::*;
pub use texture::*;
pub use material::*;
pub use mesh::*;
pub use coloured_mesh::*;
pub use composite_mesh::*;
pub use renderer_dependency::*;
pub use mesh_assembler::*;
pub use asset_manager::*;
