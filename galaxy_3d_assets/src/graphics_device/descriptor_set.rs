/// Descriptor set layout description and writes

use std::sync::Arc;
use crate::graphics_device::{Buffer, Image, Sampler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorType {
    StorageBuffer,
    CombinedImageSampler,
}

/// One binding slot of a descriptor set
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    /// Array size (the bindless texture table uses one binding with many elements)
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorSetDesc {
    pub bindings: Vec<DescriptorBinding>,
}

/// A single descriptor update
#[derive(Clone)]
pub enum DescriptorWrite {
    StorageBuffer {
        binding: u32,
        buffer: Arc<dyn Buffer>,
    },
    CombinedImageSampler {
        binding: u32,
        array_element: u32,
        image: Arc<dyn Image>,
        sampler: Arc<dyn Sampler>,
    },
}

impl DescriptorWrite {
    pub fn binding(&self) -> u32 {
        match self {
            DescriptorWrite::StorageBuffer { binding, .. } => *binding,
            DescriptorWrite::CombinedImageSampler { binding, .. } => *binding,
        }
    }
}

/// Descriptor set abstraction
///
/// Marker trait: backend implementations (VulkanDescriptorSet) own the pool,
/// layout and set handles.
pub trait DescriptorSet: Send + Sync {}
