/// Mesh asset: vertex/index buffer bindings, data layout and bounds

use std::collections::BTreeMap;
use crate::asset::{Asset, AssetHandle};
use crate::error::{Error, Result};
use crate::resource::BufferHandle;
use crate::utils::AABB;

pub type MeshHandle = AssetHandle<Mesh>;

/// Vertex attributes a mesh can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexDataElem {
    Position,
    Normal,
    Tangent,
    TextureCoordinate,
    Joints,
    Weights,
}

impl VertexDataElem {
    pub const COUNT: usize = 6;

    pub const ALL: [VertexDataElem; Self::COUNT] = [
        VertexDataElem::Position,
        VertexDataElem::Normal,
        VertexDataElem::Tangent,
        VertexDataElem::TextureCoordinate,
        VertexDataElem::Joints,
        VertexDataElem::Weights,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Layout of one attribute stream (or of the index stream)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshDataInfo {
    /// Bytes between consecutive elements
    pub stride: u16,
    pub components: u8,
    /// Bytes per component
    pub component_size: u8,
}

impl MeshDataInfo {
    pub fn new(stride: u16, components: u8, component_size: u8) -> Self {
        Self { stride, components, component_size }
    }
}

/// Structural description of a mesh's buffers; equal layouts share pipelines
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MeshDataLayout {
    pub index_info: MeshDataInfo,
    pub infos: BTreeMap<VertexDataElem, MeshDataInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    /// Index type for a component size in bytes (2 or 4)
    pub fn from_size(size: usize) -> Result<IndexType> {
        match size {
            2 => Ok(IndexType::U16),
            4 => Ok(IndexType::U32),
            other => Err(Error::ContractViolation(format!(
                "index components must be 2 or 4 bytes, got {}",
                other
            ))),
        }
    }

    pub fn size(self) -> usize {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBufferBinding {
    pub buffer: BufferHandle,
    pub offset: u64,
    pub index_type: IndexType,
}

impl Default for IndexBufferBinding {
    fn default() -> Self {
        Self {
            buffer: BufferHandle::NONE,
            offset: 0,
            index_type: IndexType::U16,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexBufferBinding {
    pub buffer: BufferHandle,
    /// Byte offset of the attribute's first element
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    name: String,
    pub index_count: u32,
    pub topology: PrimitiveTopology,
    pub layout: MeshDataLayout,
    pub index_buffer: IndexBufferBinding,
    pub vertex_buffers: [VertexBufferBinding; VertexDataElem::COUNT],
    pub aabb: AABB,
}

impl Mesh {
    pub fn vertex_buffer(&self, elem: VertexDataElem) -> &VertexBufferBinding {
        &self.vertex_buffers[elem.index()]
    }

    pub fn set_vertex_buffer(&mut self, elem: VertexDataElem, buffer: BufferHandle, offset: u64) {
        self.vertex_buffers[elem.index()] = VertexBufferBinding { buffer, offset };
    }

    /// Every bound buffer handle (index buffer first)
    pub fn bound_buffers(&self) -> impl Iterator<Item = BufferHandle> + '_ {
        std::iter::once(self.index_buffer.buffer)
            .chain(self.vertex_buffers.iter().map(|b| b.buffer))
            .filter(|b| b.is_valid())
    }
}

impl Asset for Mesh {
    fn type_name() -> &'static str {
        "Mesh"
    }

    fn empty(name: String) -> Self {
        Self {
            name,
            index_count: 0,
            topology: PrimitiveTopology::TriangleList,
            layout: MeshDataLayout::default(),
            index_buffer: IndexBufferBinding::default(),
            vertex_buffers: [VertexBufferBinding::default(); VertexDataElem::COUNT],
            aabb: AABB::EMPTY,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Positions are mandatory, everything else is optional
    fn valid(&self) -> bool {
        self.vertex_buffer(VertexDataElem::Position).buffer.is_valid()
    }
}
