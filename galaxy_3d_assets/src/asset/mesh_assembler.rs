/// Mesh assembler: packs arbitrary per-format attribute views into one
/// interleaved, de-indexed vertex buffer.
///
/// Loaders hand over strided views (already composed with their index views)
/// and an index count. The assembler copies every attribute into a fixed
/// `#[repr(C)]` record, synthesizes flat normals and tangents when they are
/// missing, computes the bounding box, registers the buffer and fills in the
/// mesh bindings and layout.
///
/// Generated tangents carry the handedness of the UV mapping in `w`
/// (`bitangent = cross(normal, tangent.xyz) * w`, matching glTF): `+1` for a
/// counter-clockwise mapping, `-1` where the texture is mirrored.

use std::mem::{offset_of, size_of};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use crate::asset::{Mesh, MeshDataInfo, MeshDataLayout, PrimitiveTopology, VertexDataElem};
use crate::error::Result;
use crate::graphics_device::BufferUsage;
use crate::resource::{BufferResource, ResourceManager};
use crate::utils::{copy_into, StridedRead, StridedView, StridedViewMut, AABB};
use crate::{engine_error, engine_info};

// ===== VERTEX RECORDS =====

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SimpleVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SimpleSkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub weights: [f32; 4],
    /// Four 8-bit joint indices
    pub joints: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FullVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub texcoord: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FullSkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub texcoord: [f32; 2],
    pub weights: [f32; 4],
    pub joints: u32,
}

/// Per-vertex skinning sources
#[derive(Clone, Copy)]
pub struct SkinViews<W, J> {
    pub weights: W,
    pub joints: J,
}

/// Placeholder type for absent optional views
pub type NoView = StridedView<'static, Vec3>;

/// Placeholder type for absent tangent views
pub type NoTangentView = StridedView<'static, Vec4>;

// ===== INTERLEAVED BUILDER =====

/// One attribute slot inside a record
#[derive(Clone, Copy)]
struct Slot {
    elem: VertexDataElem,
    offset: usize,
    components: u8,
    component_size: u8,
}

impl Slot {
    const fn new(elem: VertexDataElem, offset: usize, components: u8, component_size: u8) -> Self {
        Self { elem, offset, components, component_size }
    }
}

struct Interleaved {
    data: Vec<u8>,
    stride: usize,
    count: usize,
}

impl Interleaved {
    /// `None` when `stride * count` overflows
    fn new(stride: usize, count: usize) -> Option<Self> {
        let size = stride.checked_mul(count)?;
        Some(Self { data: vec![0u8; size], stride, count })
    }

    /// Copy `count` elements of `src` into the attribute at `offset`
    fn fill<T: Pod, V: StridedRead<Item = T>>(&mut self, offset: usize, src: V) -> bool {
        let mut dst = StridedViewMut::<T>::new(&mut self.data[offset..], self.stride);
        copy_into(src, self.count, &mut dst) == self.count
    }

    fn read<T: Pod>(&self, offset: usize, i: usize) -> T {
        StridedView::<T>::new(&self.data[offset..], self.stride)
            .get(i)
            .unwrap_or_else(T::zeroed)
    }

    fn write<T: Pod>(&mut self, offset: usize, i: usize, value: T) {
        StridedViewMut::<T>::new(&mut self.data[offset..], self.stride).set(i, value);
    }

    fn flat_normals(&mut self, position: usize, normal: usize) {
        for i in (0..self.count).step_by(3) {
            let v1: Vec3 = self.read(position, i);
            let v2: Vec3 = self.read(position, i + 1);
            let v3: Vec3 = self.read(position, i + 2);
            let n = (v2 - v1).cross(v3 - v1).normalize_or_zero();
            for k in 0..3 {
                self.write(normal, i + k, n);
            }
        }
    }

    fn tangents(&mut self, position: usize, texcoord: usize, tangent: usize) {
        for i in (0..self.count).step_by(3) {
            let v1: Vec3 = self.read(position, i);
            let v2: Vec3 = self.read(position, i + 1);
            let v3: Vec3 = self.read(position, i + 2);
            let uv1: Vec2 = self.read(texcoord, i);
            let uv2: Vec2 = self.read(texcoord, i + 1);
            let uv3: Vec2 = self.read(texcoord, i + 2);

            let t = triangle_tangent(v2 - v1, v3 - v1, uv2 - uv1, uv3 - uv1);
            for k in 0..3 {
                self.write(tangent, i + k, t);
            }
        }
    }

    fn aabb(&self, position: usize) -> AABB {
        AABB::from_points((0..self.count).map(|i| self.read::<Vec3>(position, i)))
    }
}

/// Tangent of one triangle from its edges and UV deltas
fn triangle_tangent(edge1: Vec3, edge2: Vec3, delta_uv1: Vec2, delta_uv2: Vec2) -> Vec4 {
    let det = delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y;
    if det == 0.0 {
        return Vec4::new(1.0, 0.0, 0.0, 1.0);
    }
    let f = 1.0 / det;
    let t = (f * (delta_uv2.y * edge1 - delta_uv1.y * edge2))
        .try_normalize()
        .unwrap_or(Vec3::X);
    // Negative determinant: UVs wind opposite to the triangle
    t.extend(if det < 0.0 { -1.0 } else { 1.0 })
}

// ===== ASSEMBLER =====

/// Builds interleaved meshes into a `ResourceManager`
pub struct MeshAssembler<'a> {
    resources: &'a mut ResourceManager,
    log_loading: bool,
}

impl<'a> MeshAssembler<'a> {
    pub fn new(resources: &'a mut ResourceManager, log_loading: bool) -> Self {
        Self { resources, log_loading }
    }

    fn check_index_count(&self, index_count: u32) -> bool {
        if index_count == 0 || index_count % 3 != 0 {
            engine_error!(
                "galaxy3d::MeshAssembler",
                "Mesh index count {} is not a positive multiple of 3, skipping",
                index_count
            );
            return false;
        }
        true
    }

    /// Record buffer for `index_count` vertices, allocated only once the
    /// position source is known to reach its last element
    fn allocate<P: StridedRead>(&self, stride: usize, index_count: u32, positions: P) -> Option<Interleaved> {
        if positions.get(index_count as usize - 1).is_none() {
            engine_error!(
                "galaxy3d::MeshAssembler",
                "Position source holds fewer than {} elements, skipping mesh",
                index_count
            );
            return None;
        }
        let out = Interleaved::new(stride, index_count as usize);
        if out.is_none() {
            engine_error!(
                "galaxy3d::MeshAssembler",
                "Mesh of {} vertices does not fit in memory, skipping",
                index_count
            );
        }
        out
    }

    fn copy_failed(&self, attribute: &str) -> bool {
        engine_error!(
            "galaxy3d::MeshAssembler",
            "Attribute {} has fewer elements than the index count, skipping mesh",
            attribute
        );
        false
    }

    /// Position + normal
    pub fn simple<P, N>(&mut self, positions: P, normals: Option<N>, index_count: u32, mesh: &mut Mesh) -> Result<bool>
    where
        P: StridedRead<Item = Vec3>,
        N: StridedRead<Item = Vec3>,
    {
        if !self.check_index_count(index_count) {
            return Ok(false);
        }
        const POSITION: usize = offset_of!(SimpleVertex, position);
        const NORMAL: usize = offset_of!(SimpleVertex, normal);

        let Some(mut out) = self.allocate(size_of::<SimpleVertex>(), index_count, positions) else {
            return Ok(false);
        };
        if !out.fill(POSITION, positions) {
            return Ok(self.copy_failed("position"));
        }
        match normals {
            Some(normals) => {
                if !out.fill(NORMAL, normals) {
                    return Ok(self.copy_failed("normal"));
                }
            }
            None => out.flat_normals(POSITION, NORMAL),
        }

        let slots = [
            Slot::new(VertexDataElem::Position, POSITION, 3, 4),
            Slot::new(VertexDataElem::Normal, NORMAL, 3, 4),
        ];
        self.finish(out, POSITION, &slots, mesh)?;
        Ok(true)
    }

    /// Position + normal + weights + packed joints
    pub fn simple_skinned<P, N, W, J>(
        &mut self,
        positions: P,
        normals: Option<N>,
        skin: SkinViews<W, J>,
        index_count: u32,
        mesh: &mut Mesh,
    ) -> Result<bool>
    where
        P: StridedRead<Item = Vec3>,
        N: StridedRead<Item = Vec3>,
        W: StridedRead<Item = Vec4>,
        J: StridedRead<Item = u32>,
    {
        if !self.check_index_count(index_count) {
            return Ok(false);
        }
        const POSITION: usize = offset_of!(SimpleSkinnedVertex, position);
        const NORMAL: usize = offset_of!(SimpleSkinnedVertex, normal);
        const WEIGHTS: usize = offset_of!(SimpleSkinnedVertex, weights);
        const JOINTS: usize = offset_of!(SimpleSkinnedVertex, joints);

        let Some(mut out) = self.allocate(size_of::<SimpleSkinnedVertex>(), index_count, positions) else {
            return Ok(false);
        };
        if !out.fill(POSITION, positions) {
            return Ok(self.copy_failed("position"));
        }
        if !out.fill(WEIGHTS, skin.weights) {
            return Ok(self.copy_failed("weights"));
        }
        if !out.fill(JOINTS, skin.joints) {
            return Ok(self.copy_failed("joints"));
        }
        match normals {
            Some(normals) => {
                if !out.fill(NORMAL, normals) {
                    return Ok(self.copy_failed("normal"));
                }
            }
            None => out.flat_normals(POSITION, NORMAL),
        }

        let slots = [
            Slot::new(VertexDataElem::Position, POSITION, 3, 4),
            Slot::new(VertexDataElem::Normal, NORMAL, 3, 4),
            Slot::new(VertexDataElem::Weights, WEIGHTS, 4, 4),
            Slot::new(VertexDataElem::Joints, JOINTS, 1, 4),
        ];
        self.finish(out, POSITION, &slots, mesh)?;
        Ok(true)
    }

    /// Position + normal + tangent + texcoord
    pub fn full<P, UV, N, T>(
        &mut self,
        positions: P,
        texcoords: UV,
        normals: Option<N>,
        tangents: Option<T>,
        index_count: u32,
        mesh: &mut Mesh,
    ) -> Result<bool>
    where
        P: StridedRead<Item = Vec3>,
        UV: StridedRead<Item = Vec2>,
        N: StridedRead<Item = Vec3>,
        T: StridedRead<Item = Vec4>,
    {
        if !self.check_index_count(index_count) {
            return Ok(false);
        }
        const POSITION: usize = offset_of!(FullVertex, position);
        const NORMAL: usize = offset_of!(FullVertex, normal);
        const TANGENT: usize = offset_of!(FullVertex, tangent);
        const TEXCOORD: usize = offset_of!(FullVertex, texcoord);

        let Some(mut out) = self.allocate(size_of::<FullVertex>(), index_count, positions) else {
            return Ok(false);
        };
        if !self.fill_surface(&mut out, [POSITION, NORMAL, TANGENT, TEXCOORD], positions, texcoords, normals, tangents) {
            return Ok(false);
        }

        let slots = [
            Slot::new(VertexDataElem::Position, POSITION, 3, 4),
            Slot::new(VertexDataElem::Normal, NORMAL, 3, 4),
            Slot::new(VertexDataElem::Tangent, TANGENT, 4, 4),
            Slot::new(VertexDataElem::TextureCoordinate, TEXCOORD, 2, 4),
        ];
        self.finish(out, POSITION, &slots, mesh)?;
        Ok(true)
    }

    /// Full record plus weights and packed joints
    #[allow(clippy::too_many_arguments)]
    pub fn full_skinned<P, UV, N, T, W, J>(
        &mut self,
        positions: P,
        texcoords: UV,
        normals: Option<N>,
        tangents: Option<T>,
        skin: SkinViews<W, J>,
        index_count: u32,
        mesh: &mut Mesh,
    ) -> Result<bool>
    where
        P: StridedRead<Item = Vec3>,
        UV: StridedRead<Item = Vec2>,
        N: StridedRead<Item = Vec3>,
        T: StridedRead<Item = Vec4>,
        W: StridedRead<Item = Vec4>,
        J: StridedRead<Item = u32>,
    {
        if !self.check_index_count(index_count) {
            return Ok(false);
        }
        const POSITION: usize = offset_of!(FullSkinnedVertex, position);
        const NORMAL: usize = offset_of!(FullSkinnedVertex, normal);
        const TANGENT: usize = offset_of!(FullSkinnedVertex, tangent);
        const TEXCOORD: usize = offset_of!(FullSkinnedVertex, texcoord);
        const WEIGHTS: usize = offset_of!(FullSkinnedVertex, weights);
        const JOINTS: usize = offset_of!(FullSkinnedVertex, joints);

        let Some(mut out) = self.allocate(size_of::<FullSkinnedVertex>(), index_count, positions) else {
            return Ok(false);
        };
        if !out.fill(WEIGHTS, skin.weights) {
            return Ok(self.copy_failed("weights"));
        }
        if !out.fill(JOINTS, skin.joints) {
            return Ok(self.copy_failed("joints"));
        }
        if !self.fill_surface(&mut out, [POSITION, NORMAL, TANGENT, TEXCOORD], positions, texcoords, normals, tangents) {
            return Ok(false);
        }

        let slots = [
            Slot::new(VertexDataElem::Position, POSITION, 3, 4),
            Slot::new(VertexDataElem::Normal, NORMAL, 3, 4),
            Slot::new(VertexDataElem::Tangent, TANGENT, 4, 4),
            Slot::new(VertexDataElem::TextureCoordinate, TEXCOORD, 2, 4),
            Slot::new(VertexDataElem::Weights, WEIGHTS, 4, 4),
            Slot::new(VertexDataElem::Joints, JOINTS, 1, 4),
        ];
        self.finish(out, POSITION, &slots, mesh)?;
        Ok(true)
    }

    /// Positions, texcoords, then normals and tangents (copied or generated)
    fn fill_surface<P, UV, N, T>(
        &self,
        out: &mut Interleaved,
        [position, normal, tangent, texcoord]: [usize; 4],
        positions: P,
        texcoords: UV,
        normals: Option<N>,
        tangents: Option<T>,
    ) -> bool
    where
        P: StridedRead<Item = Vec3>,
        UV: StridedRead<Item = Vec2>,
        N: StridedRead<Item = Vec3>,
        T: StridedRead<Item = Vec4>,
    {
        if !out.fill(position, positions) {
            return self.copy_failed("position");
        }
        if !out.fill(texcoord, texcoords) {
            return self.copy_failed("texcoord");
        }
        match normals {
            Some(normals) => {
                if !out.fill(normal, normals) {
                    return self.copy_failed("normal");
                }
            }
            None => out.flat_normals(position, normal),
        }
        match tangents {
            Some(tangents) => {
                if !out.fill(tangent, tangents) {
                    return self.copy_failed("tangent");
                }
            }
            None => out.tangents(position, texcoord, tangent),
        }
        true
    }

    /// Register and upload the packed buffer, then bind it on `mesh`
    fn finish(&mut self, out: Interleaved, position: usize, slots: &[Slot], mesh: &mut Mesh) -> Result<()> {
        let aabb = out.aabb(position);
        let stride = out.stride as u16;
        let count = out.count as u32;

        let handle = self.resources.add_buffer(BufferResource::new(
            BufferUsage::VERTEX | BufferUsage::STORAGE,
            out.data,
        ));
        self.resources.upload_buffer(handle)?;

        mesh.index_count = count;
        mesh.topology = PrimitiveTopology::TriangleList;
        mesh.layout = MeshDataLayout::default();
        for slot in slots {
            mesh.set_vertex_buffer(slot.elem, handle, slot.offset as u64);
            mesh.layout
                .infos
                .insert(slot.elem, MeshDataInfo::new(stride, slot.components, slot.component_size));
        }
        mesh.aabb = aabb;

        if self.log_loading {
            engine_info!("galaxy3d::MeshAssembler", "Loaded mesh with {} vertices.", count);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mesh_assembler_tests.rs"]
mod tests;
