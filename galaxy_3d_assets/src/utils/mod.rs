/// Shared helpers: strided views, bounding boxes, slot counters

pub mod strided_view;
pub mod aabb;
pub mod slot_counter;

pub use strided_view::*;
pub use aabb::AABB;
pub use slot_counter::SlotCounter;
