/// glTF 2.0 (`.gltf` / `.glb`) loading into a composite mesh.
///
/// Buffers and images come from `gltf::import`. Vertex attributes are read in
/// place: every accessor becomes a strided (or converting) view over the
/// imported buffer, composed with the primitive's index view, and handed to
/// the mesh assembler. Each mesh node contributes one entry per primitive,
/// placed with the node's world transform.

use std::mem::size_of;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use gltf::accessor::DataType;
use gltf::texture::{MagFilter, MinFilter, WrappingMode};
use gltf::Semantic;
use crate::asset::{
    Asset, AssetManager, ColouredMesh, CompositeMeshHandle, IndexType, Material, MaterialHandle,
    Mesh, MeshAssembler, PrimitiveTopology, SkinViews, Texture, TextureHandle, TextureKind,
    ValueDescriptor,
};
use crate::error::Result;
use crate::graphics_device::{AddressMode, BorderColor, Filter, MipmapMode, SamplerDesc};
use crate::resource::{mip_levels_for, ImageHandle, ImageResource, SamplerHandle, SamplerResource};
use crate::utils::{ConvertingView, DummyView, IndexedView, StridedRead, StridedView, ViewIndex};
use crate::{engine_error, engine_info, engine_warn};

// ============================================================================
// Samplers and images
// ============================================================================

fn convert_address_mode(mode: WrappingMode) -> AddressMode {
    match mode {
        WrappingMode::Repeat => AddressMode::Repeat,
        WrappingMode::ClampToEdge => AddressMode::ClampToEdge,
        WrappingMode::MirroredRepeat => AddressMode::MirroredRepeat,
    }
}

fn convert_min_filter(filter: Option<MinFilter>) -> (Filter, MipmapMode) {
    match filter {
        Some(MinFilter::Linear) | Some(MinFilter::LinearMipmapNearest) => (Filter::Linear, MipmapMode::Nearest),
        Some(MinFilter::NearestMipmapLinear) => (Filter::Nearest, MipmapMode::Linear),
        Some(MinFilter::LinearMipmapLinear) => (Filter::Linear, MipmapMode::Linear),
        Some(MinFilter::Nearest) | Some(MinFilter::NearestMipmapNearest) | None => (Filter::Nearest, MipmapMode::Nearest),
    }
}

/// Samplers without mip filtering clamp sampling to level 0
fn max_lod(filter: Option<MinFilter>) -> f32 {
    match filter {
        Some(MinFilter::NearestMipmapNearest)
        | Some(MinFilter::LinearMipmapNearest)
        | Some(MinFilter::NearestMipmapLinear)
        | Some(MinFilter::LinearMipmapLinear) => 2000.0,
        _ => 0.25,
    }
}

/// Device sampler description for a glTF sampler
pub fn sampler_desc(
    mag_filter: Option<MagFilter>,
    min_filter: Option<MinFilter>,
    wrap_s: WrappingMode,
    wrap_t: WrappingMode,
) -> SamplerDesc {
    let mag_filter = match mag_filter {
        Some(MagFilter::Linear) => Filter::Linear,
        Some(MagFilter::Nearest) | None => Filter::Nearest,
    };
    let (min, mipmap_mode) = convert_min_filter(min_filter);
    SamplerDesc {
        mag_filter,
        min_filter: min,
        mipmap_mode,
        address_mode_u: convert_address_mode(wrap_s),
        address_mode_v: convert_address_mode(wrap_t),
        address_mode_w: convert_address_mode(wrap_t),
        mip_lod_bias: 0.0,
        anisotropy_enable: true,
        max_anisotropy: 16.0,
        min_lod: 0.0,
        max_lod: max_lod(min_filter),
        border_color: BorderColor::IntOpaqueBlack,
    }
}

/// 8-bit image resource for decoded glTF pixels
///
/// RGB is expanded to RGBA (opaque). `None` for 16-bit and float images.
pub fn image_resource(data: &gltf::image::Data, srgb: bool, mip_mapped: bool) -> Option<ImageResource> {
    use gltf::image::Format;

    let (channels, pixels) = match data.format {
        Format::R8 => (1, data.pixels.clone()),
        Format::R8G8 => (2, data.pixels.clone()),
        Format::R8G8B8A8 => (4, data.pixels.clone()),
        Format::R8G8B8 => {
            let rgba = data
                .pixels
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], 255])
                .collect();
            (4, rgba)
        }
        _ => return None,
    };
    let format = ImageResource::pixel_format_for(channels, false, srgb)?;
    let mip_levels = if mip_mapped { mip_levels_for(data.width, data.height) } else { 1 };

    let mut image = ImageResource::new(data.width, data.height, channels, format, pixels).with_mip_levels(mip_levels);
    image.calculate_transparency();
    Some(image)
}

// ============================================================================
// Node transforms
// ============================================================================

/// `T * R * S` (or the explicit matrix)
pub fn local_transform(transform: gltf::scene::Transform) -> Mat4 {
    match transform {
        gltf::scene::Transform::Matrix { matrix } => Mat4::from_cols_array_2d(&matrix),
        gltf::scene::Transform::Decomposed { translation, rotation, scale } => Mat4::from_scale_rotation_translation(
            Vec3::from_array(scale),
            Quat::from_array(rotation),
            Vec3::from_array(translation),
        ),
    }
}

/// Local transform of `node` composed with every ancestor's
///
/// Malformed files can make the parent chain loop; the walk stops at the
/// first node seen twice.
pub fn world_transform(locals: &[Mat4], parents: &[Option<usize>], node: usize) -> Mat4 {
    let Some(local) = locals.get(node) else {
        return Mat4::IDENTITY;
    };
    let mut matrix = *local;
    let mut visited = vec![false; locals.len()];
    visited[node] = true;

    let mut current = node;
    while let Some(parent) = parents.get(current).copied().flatten() {
        match visited.get(parent) {
            Some(false) => {}
            Some(true) => {
                engine_error!("galaxy3d::GltfLoader", "Node hierarchy contains a cycle through node {}", parent);
                break;
            }
            None => break,
        }
        visited[parent] = true;
        matrix = locals[parent] * matrix;
        current = parent;
    }
    matrix
}

// ============================================================================
// Attribute conversions
// ============================================================================

fn texcoord_f32(bytes: &[u8]) -> Vec2 {
    Vec2::from_array(bytemuck::pod_read_unaligned(bytes))
}

fn texcoord_u8(bytes: &[u8]) -> Vec2 {
    Vec2::new(bytes[0] as f32, bytes[1] as f32) / 256.0
}

fn texcoord_u16(bytes: &[u8]) -> Vec2 {
    let [u, v]: [u16; 2] = bytemuck::pod_read_unaligned(bytes);
    Vec2::new(u as f32, v as f32) / 65535.0
}

fn weights_f32(bytes: &[u8]) -> Vec4 {
    Vec4::from_array(bytemuck::pod_read_unaligned(bytes))
}

fn weights_u8(bytes: &[u8]) -> Vec4 {
    Vec4::new(bytes[0] as f32, bytes[1] as f32, bytes[2] as f32, bytes[3] as f32) / 256.0
}

fn weights_u16(bytes: &[u8]) -> Vec4 {
    let w: [u16; 4] = bytemuck::pod_read_unaligned(bytes);
    Vec4::new(w[0] as f32, w[1] as f32, w[2] as f32, w[3] as f32) / 65535.0
}

/// Four joint indices packed 8 bits each, first joint in the low byte
pub fn pack_joints(joints: [u8; 4]) -> u32 {
    u32::from_le_bytes(joints)
}

fn joints_u8(bytes: &[u8]) -> u32 {
    pack_joints([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn joints_u16(bytes: &[u8]) -> u32 {
    let j: [u16; 4] = bytemuck::pod_read_unaligned(bytes);
    pack_joints([j[0] as u8, j[1] as u8, j[2] as u8, j[3] as u8])
}

// ============================================================================
// Accessor views
// ============================================================================

/// Bytes an accessor reads from (starting at its first element) and its stride
fn accessor_bytes<'a>(accessor: &gltf::Accessor<'_>, buffers: &'a [gltf::buffer::Data]) -> Option<(&'a [u8], usize)> {
    let view = accessor.view()?;
    let data = buffers.get(view.buffer().index())?;
    let start = view.offset() + accessor.offset();
    let end = view.offset() + view.length();
    Some((data.0.get(start..end)?, view.stride().unwrap_or(0)))
}

/// Whether `count` elements of `element_size` bytes, `stride` apart (0 for
/// tightly packed), fit in `available` bytes
fn elements_fit(available: usize, count: usize, stride: usize, element_size: usize) -> bool {
    if count == 0 {
        return true;
    }
    let stride = if stride == 0 { element_size } else { stride };
    (count - 1)
        .checked_mul(stride)
        .and_then(|offset| offset.checked_add(element_size))
        .is_some_and(|needed| needed <= available)
}

/// Accessor element count, if its buffer view really holds that many elements
fn checked_count(accessor: &gltf::Accessor<'_>, buffers: &[gltf::buffer::Data]) -> Option<u32> {
    let count = accessor.count();
    let fits = accessor_bytes(accessor, buffers)
        .is_some_and(|(bytes, stride)| elements_fit(bytes.len(), count, stride, accessor.size()));
    if !fits {
        engine_error!(
            "galaxy3d::GltfLoader",
            "Accessor {} declares {} elements, more than its buffer view holds",
            accessor.index(),
            count
        );
        return None;
    }
    u32::try_from(count).ok()
}

fn strided<'a, T: bytemuck::Pod>(accessor: &gltf::Accessor<'_>, buffers: &'a [gltf::buffer::Data]) -> Option<StridedView<'a, T>> {
    accessor_bytes(accessor, buffers).map(|(bytes, stride)| StridedView::new(bytes, stride))
}

fn texcoord_view<'a>(accessor: &gltf::Accessor<'_>, buffers: &'a [gltf::buffer::Data]) -> Option<ConvertingView<'a, Vec2>> {
    let (convert, size): (fn(&[u8]) -> Vec2, usize) = match accessor.data_type() {
        DataType::F32 => (texcoord_f32, 2 * size_of::<f32>()),
        DataType::U8 => (texcoord_u8, 2),
        DataType::U16 => (texcoord_u16, 2 * size_of::<u16>()),
        other => {
            engine_error!("galaxy3d::GltfLoader", "Unsupported texture coordinate component type {:?}", other);
            return None;
        }
    };
    let (bytes, stride) = accessor_bytes(accessor, buffers)?;
    Some(ConvertingView::new(bytes, stride, size, convert))
}

fn weights_view<'a>(accessor: &gltf::Accessor<'_>, buffers: &'a [gltf::buffer::Data]) -> Option<ConvertingView<'a, Vec4>> {
    let (convert, size): (fn(&[u8]) -> Vec4, usize) = match accessor.data_type() {
        DataType::F32 => (weights_f32, 4 * size_of::<f32>()),
        DataType::U8 => (weights_u8, 4),
        DataType::U16 => (weights_u16, 4 * size_of::<u16>()),
        other => {
            engine_error!("galaxy3d::GltfLoader", "Unsupported weight component type {:?}", other);
            return None;
        }
    };
    let (bytes, stride) = accessor_bytes(accessor, buffers)?;
    Some(ConvertingView::new(bytes, stride, size, convert))
}

fn joints_view<'a>(accessor: &gltf::Accessor<'_>, buffers: &'a [gltf::buffer::Data]) -> Option<ConvertingView<'a, u32>> {
    let (convert, size): (fn(&[u8]) -> u32, usize) = match accessor.data_type() {
        DataType::U8 => (joints_u8, 4),
        DataType::U16 => (joints_u16, 4 * size_of::<u16>()),
        other => {
            engine_error!("galaxy3d::GltfLoader", "Unsupported joint component type {:?}", other);
            return None;
        }
    };
    let (bytes, stride) = accessor_bytes(accessor, buffers)?;
    Some(ConvertingView::new(bytes, stride, size, convert))
}

/// Per-vertex attribute views of one primitive, before indexing
struct PrimitiveViews<'a> {
    positions: StridedView<'a, Vec3>,
    normals: Option<StridedView<'a, Vec3>>,
    tangents: Option<StridedView<'a, Vec4>>,
    texcoords: Option<ConvertingView<'a, Vec2>>,
    skin: Option<SkinViews<ConvertingView<'a, Vec4>, ConvertingView<'a, u32>>>,
}

impl<'a> PrimitiveViews<'a> {
    fn read(primitive: &gltf::Primitive<'_>, skinned: bool, buffers: &'a [gltf::buffer::Data]) -> Option<Self> {
        let Some(positions) = primitive.get(&Semantic::Positions) else {
            engine_error!("galaxy3d::GltfLoader", "Mesh data is missing vertices");
            return None;
        };
        let positions = strided(&positions, buffers)?;
        let normals = primitive.get(&Semantic::Normals).and_then(|a| strided(&a, buffers));
        let tangents = primitive.get(&Semantic::Tangents).and_then(|a| strided(&a, buffers));
        let texcoords = match primitive.get(&Semantic::TexCoords(0)) {
            Some(accessor) => Some(texcoord_view(&accessor, buffers)?),
            None => None,
        };

        let skin = if skinned {
            let weights = primitive.get(&Semantic::Weights(0)).and_then(|a| weights_view(&a, buffers));
            let joints = primitive.get(&Semantic::Joints(0)).and_then(|a| joints_view(&a, buffers));
            match (weights, joints) {
                (Some(weights), Some(joints)) => Some(SkinViews { weights, joints }),
                _ => {
                    engine_warn!("galaxy3d::GltfLoader", "Skinned primitive without usable WEIGHTS_0/JOINTS_0, loading it unskinned");
                    None
                }
            }
        } else {
            None
        };

        Some(Self { positions, normals, tangents, texcoords, skin })
    }

    /// Pick the vertex record from the available attributes and assemble
    fn assemble<I>(&self, assembler: &mut MeshAssembler<'_>, indices: I, index_count: u32, mesh: &mut Mesh) -> Result<bool>
    where
        I: StridedRead,
        I::Item: ViewIndex,
    {
        let positions = IndexedView::new(self.positions, indices);
        let normals = self.normals.map(|v| IndexedView::new(v, indices));
        let tangents = self.tangents.map(|v| IndexedView::new(v, indices));
        let skin = self.skin.as_ref().map(|s| SkinViews {
            weights: IndexedView::new(s.weights, indices),
            joints: IndexedView::new(s.joints, indices),
        });

        match (self.texcoords, skin) {
            (Some(texcoords), Some(skin)) => assembler.full_skinned(
                positions,
                IndexedView::new(texcoords, indices),
                normals,
                tangents,
                skin,
                index_count,
                mesh,
            ),
            (Some(texcoords), None) => {
                assembler.full(positions, IndexedView::new(texcoords, indices), normals, tangents, index_count, mesh)
            }
            (None, Some(skin)) => assembler.simple_skinned(positions, normals, skin, index_count, mesh),
            (None, None) => assembler.simple(positions, normals, index_count, mesh),
        }
    }
}

/// Assemble `primitive` into `mesh`, reading through its index accessor
fn assemble_primitive(
    assembler: &mut MeshAssembler<'_>,
    primitive: &gltf::Primitive<'_>,
    skinned: bool,
    buffers: &[gltf::buffer::Data],
    mesh: &mut Mesh,
) -> Result<bool> {
    let Some(views) = PrimitiveViews::read(primitive, skinned, buffers) else {
        return Ok(false);
    };

    let Some(indices) = primitive.indices() else {
        let count = primitive.get(&Semantic::Positions).and_then(|a| checked_count(&a, buffers));
        return match count {
            Some(count) => views.assemble(assembler, DummyView, count, mesh),
            None => Ok(false),
        };
    };

    let Some(count) = checked_count(&indices, buffers) else {
        return Ok(false);
    };
    match IndexType::from_size(indices.size())? {
        IndexType::U16 => match strided::<u16>(&indices, buffers) {
            Some(view) => views.assemble(assembler, view, count, mesh),
            None => Ok(false),
        },
        IndexType::U32 => match strided::<u32>(&indices, buffers) {
            Some(view) => views.assemble(assembler, view, count, mesh),
            None => Ok(false),
        },
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Per-file caches so shared images, samplers and textures load once
struct GltfContext<'a> {
    name: String,
    images: &'a [gltf::image::Data],
    image_handles: Vec<Option<ImageHandle>>,
    sampler_handles: Vec<Option<SamplerHandle>>,
    textures: Vec<Option<TextureHandle>>,
}

impl GltfContext<'_> {
    fn request_image(&mut self, manager: &mut AssetManager, index: usize, srgb: bool, mip_mapped: bool) -> Option<ImageHandle> {
        if let Some(Some(handle)) = self.image_handles.get(index) {
            return Some(*handle);
        }
        let data = self.images.get(index)?;
        let Some(image) = image_resource(data, srgb, mip_mapped) else {
            engine_error!("galaxy3d::GltfLoader", "Unsupported pixel format {:?} for image {}", data.format, index);
            return None;
        };
        let handle = manager.resources_mut().add_image(image);
        if let Some(slot) = self.image_handles.get_mut(index) {
            *slot = Some(handle);
        }
        Some(handle)
    }

    fn request_sampler(&mut self, manager: &mut AssetManager, sampler: gltf::texture::Sampler<'_>) -> SamplerHandle {
        let Some(index) = sampler.index() else {
            return manager.resources().default_sampler();
        };
        if let Some(Some(handle)) = self.sampler_handles.get(index) {
            return *handle;
        }
        let desc = sampler_desc(sampler.mag_filter(), sampler.min_filter(), sampler.wrap_s(), sampler.wrap_t());
        let handle = manager.resources_mut().add_sampler(SamplerResource::new(desc));
        if let Some(slot) = self.sampler_handles.get_mut(index) {
            *slot = Some(handle);
        }
        handle
    }

    fn request_texture(
        &mut self,
        manager: &mut AssetManager,
        texture: gltf::Texture<'_>,
        srgb: bool,
        mip_mapped: bool,
    ) -> Result<TextureHandle> {
        let index = texture.index();
        if let Some(Some(handle)) = self.textures.get(index) {
            return Ok(*handle);
        }

        let name = format!(
            "{}/textures/{}",
            self.name,
            texture.name().map_or_else(|| index.to_string(), str::to_string)
        );
        let sampler = self.request_sampler(manager, texture.sampler());
        let handle = match self.request_image(manager, texture.source().index(), srgb, mip_mapped) {
            Some(image) => {
                let transparent = manager.resources().image(image).is_some_and(|i| i.transparent);
                manager.add_texture(Texture::new(name, image, sampler, transparent))?
            }
            None => manager.add_texture(Texture::empty(name))?,
        };

        if let Some(slot) = self.textures.get_mut(index) {
            *slot = Some(handle);
        }
        Ok(handle)
    }

    fn load_material(&mut self, manager: &mut AssetManager, index: usize, material: gltf::Material<'_>) -> Result<MaterialHandle> {
        let name = format!(
            "{}/materials/{}",
            self.name,
            material.name().map_or_else(|| index.to_string(), str::to_string)
        );
        let pbr = material.pbr_metallic_roughness();
        let normal_texture = material.normal_texture();
        let descriptors = manager.compatibility().textures.clone();
        let value_descriptors = manager.compatibility().values.clone();

        let mut textures = Vec::with_capacity(descriptors.len());
        let mut transparent = false;
        for descriptor in &descriptors {
            let source = match descriptor.kind {
                TextureKind::Diffuse => pbr.base_color_texture().map(|info| info.texture()),
                TextureKind::Normal => normal_texture.as_ref().map(|normal| normal.texture()),
                TextureKind::CombinedMro => pbr.metallic_roughness_texture().map(|info| info.texture()),
            };
            let texture = match source {
                Some(texture) => {
                    let handle = self.request_texture(manager, texture, descriptor.srgb, descriptor.mip_mapped)?;
                    if descriptor.kind == TextureKind::Diffuse {
                        transparent |= manager.resolve_texture(handle).has_transparency;
                    }
                    handle
                }
                None => manager.dummy_texture(),
            };
            textures.push(texture);
        }

        let base_color = pbr.base_color_factor();
        let values = value_descriptors
            .iter()
            .map(|value| match value {
                ValueDescriptor::DiffuseR => base_color[0],
                ValueDescriptor::DiffuseG => base_color[1],
                ValueDescriptor::DiffuseB => base_color[2],
                ValueDescriptor::OpacityR => base_color[3],
                ValueDescriptor::RoughnessR => pbr.roughness_factor(),
                ValueDescriptor::MetallicR => pbr.metallic_factor(),
                ValueDescriptor::NormalScaleR => normal_texture.as_ref().map_or(1.0, |normal| normal.scale()),
            })
            .collect();

        let mut material = Material::new(name, textures, values);
        material.has_transparency = transparent;
        manager.add_material(material)
    }
}

/// Fill the (unloaded) composite `handle` from the glTF or GLB file at its path
///
/// Files that fail to import are logged and leave the composite empty.
/// Index accessors with components other than 2 or 4 bytes are an error.
pub fn load_gltf(manager: &mut AssetManager, handle: CompositeMeshHandle) -> Result<()> {
    let Some(composite) = manager.composite_meshes().get(handle.id()) else {
        return Ok(());
    };
    let (name, path) = (composite.name().to_string(), composite.path.clone());

    let (document, buffers, images) = match gltf::import(&path) {
        Ok(imported) => imported,
        Err(e) => {
            engine_error!("galaxy3d::GltfLoader", "Loading {} failed: {}", path.display(), e);
            return Ok(());
        }
    };

    let mut context = GltfContext {
        name: name.clone(),
        images: &images,
        image_handles: vec![None; images.len()],
        sampler_handles: vec![None; document.samplers().len()],
        textures: vec![None; document.textures().len()],
    };

    let mut materials = Vec::with_capacity(document.materials().len());
    for (i, material) in document.materials().enumerate() {
        materials.push(context.load_material(manager, i, material)?);
    }

    let locals: Vec<Mat4> = document.nodes().map(|n| local_transform(n.transform())).collect();
    let mut parents: Vec<Option<usize>> = vec![None; locals.len()];
    for node in document.nodes() {
        for child in node.children() {
            if let Some(parent) = parents.get_mut(child.index()) {
                *parent = Some(node.index());
            }
        }
    }

    let mut count = 0usize;
    for node in document.nodes() {
        let Some(gltf_mesh) = node.mesh() else { continue };
        let mesh_name = format!(
            "{}/meshes/{}",
            name,
            gltf_mesh.name().map_or_else(|| gltf_mesh.index().to_string(), str::to_string)
        );
        let skinned = node.skin().is_some();
        let transform = world_transform(&locals, &parents, node.index());

        for (j, primitive) in gltf_mesh.primitives().enumerate() {
            let sub_name = format!("{}/{}", mesh_name, j);
            let mut mesh = Mesh::empty(sub_name.clone());
            mesh.topology = PrimitiveTopology::TriangleList;
            if !assemble_primitive(&mut manager.assembler(), &primitive, skinned, &buffers, &mut mesh)? {
                engine_error!("galaxy3d::GltfLoader", "Submesh {} skipped", sub_name);
                continue;
            }
            let mesh = manager.add_mesh(mesh);
            manager.prepare_mesh(mesh)?;

            let material = match primitive.material().index().and_then(|i| materials.get(i)) {
                Some(material) => *material,
                None => manager.materials().default_handle(),
            };
            let dependency = manager.renderer_dependency_for(mesh, material);
            let coloured = manager.add_coloured_mesh(ColouredMesh::new(mesh_name.clone(), mesh, material, dependency));
            // Pushed right away so a later failure keeps what is already registered
            if let Some(composite) = manager.composite_mesh_mut(handle) {
                composite.push(transform, coloured);
            }
            count += 1;
        }
    }

    if manager.log_asset_loading() {
        engine_info!("galaxy3d::GltfLoader", "Loaded {} ({} primitives)", name, count);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "gltf_loader_tests.rs"]
mod tests;
