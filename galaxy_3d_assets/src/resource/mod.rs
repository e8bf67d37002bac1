/// Resource layer: GPU resources and their registry

pub mod gpu_resource;
pub mod resource_manager;

pub use gpu_resource::*;
pub use resource_manager::*;
