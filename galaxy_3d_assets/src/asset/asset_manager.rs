/// AssetManager - owns every asset registry and the GPU tables they feed.
///
/// Textures are written into a bindless combined-image-sampler array and
/// materials into one storage buffer of `f32` entries (texture slots as
/// `gpu_index + 0.5`, then scalar values). Both tables are append-only with
/// fixed capacities; running out is an error, not a silent overwrite.
///
/// Every lookup by handle goes through `resolve_*`, which falls back to the
/// registry's default asset, so a missing or malformed asset renders as the
/// default cube / checkerboard instead of failing.

use std::sync::{Arc, Mutex};
use glam::Mat4;
use crate::asset::{
    Asset, AssetContainer, CompatibilityDescriptor, MeshAssembler,
    Texture, TextureHandle, Material, MaterialHandle, Mesh, MeshHandle,
    ColouredMesh, ColouredMeshHandle, CompositeMesh, CompositeMeshHandle,
    IndexBufferBinding, VertexBufferBinding, VertexDataElem, RendererDependencyProvider,
};
use crate::config::AssetConfig;
use crate::error::{Error, Result};
use crate::graphics_device::{
    Buffer, BufferDesc, BufferUsage, DescriptorBinding, DescriptorSet, DescriptorSetDesc,
    DescriptorType, DescriptorWrite, GraphicsDevice, ImageFormat,
};
use crate::loader::obj_loader;
use crate::loader::obj_parser;
use crate::resource::{ImageResource, ResourceManager};
use crate::utils::{SlotCounter, AABB};
use crate::{engine_debug, engine_info};

/// Unit cube used as the default mesh
const DEFAULT_CUBE_OBJ: &str = "
v 0.0 0.0 0.0
v 0.0 0.0 1.0
v 0.0 1.0 0.0
v 0.0 1.0 1.0
v 1.0 0.0 0.0
v 1.0 0.0 1.0
v 1.0 1.0 0.0
v 1.0 1.0 1.0

vn 0.0 0.0 1.0
vn 0.0 0.0 -1.0
vn 0.0 1.0 0.0
vn 0.0 -1.0 0.0
vn 1.0 0.0 0.0
vn -1.0 0.0 0.0

f 1//2 7//2 5//2
f 1//2 3//2 7//2
f 1//6 4//6 3//6
f 1//6 2//6 4//6
f 3//3 8//3 7//3
f 3//3 4//3 8//3
f 5//5 7//5 8//5
f 5//5 8//5 6//5
f 1//4 5//4 6//4
f 1//4 6//4 2//4
f 2//1 6//1 8//1
f 2//1 8//1 4//1
";

const DEFAULT_TEXTURE_SIZE: u32 = 64;

/// Binding of the material value buffer in the material descriptor set
pub const MATERIAL_BUFFER_BINDING: u32 = 0;
/// Binding of the bindless texture array in the material descriptor set
pub const TEXTURE_ARRAY_BINDING: u32 = 1;

/// 64x64 RGBA8 checkerboard: blue columns alternating 255 / 127 every 8 pixels
pub fn default_texture_pixels() -> Vec<u8> {
    let size = DEFAULT_TEXTURE_SIZE as usize;
    let mut data = vec![0u8; size * size * 4];
    for y in 0..size {
        for x in 0..size {
            let px = &mut data[(y * size + x) * 4..][..4];
            px[0] = 0;
            px[1] = 0;
            px[2] = if (x / 8) % 2 == 0 { 255 } else { 127 };
            px[3] = 255;
        }
    }
    data
}

pub struct AssetManager {
    resources: ResourceManager,
    dependencies: RendererDependencyProvider,
    compatibility: CompatibilityDescriptor,
    log_loading: bool,

    textures: AssetContainer<Texture>,
    materials: AssetContainer<Material>,
    meshes: AssetContainer<Mesh>,
    coloured_meshes: AssetContainer<ColouredMesh>,
    composite_meshes: AssetContainer<CompositeMesh>,

    material_buffer: Option<Arc<dyn Buffer>>,
    descriptor_set: Option<Arc<dyn DescriptorSet>>,
    texture_slots: SlotCounter,
    material_entries: SlotCounter,
    dummy_texture: TextureHandle,
}

impl AssetManager {
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>, config: &AssetConfig) -> Self {
        Self {
            resources: ResourceManager::new(device),
            dependencies: RendererDependencyProvider::new(),
            compatibility: config.compatibility.clone(),
            log_loading: config.log_asset_loading,
            textures: AssetContainer::new(),
            materials: AssetContainer::new(),
            meshes: AssetContainer::new(),
            coloured_meshes: AssetContainer::new(),
            composite_meshes: AssetContainer::new(),
            material_buffer: None,
            descriptor_set: None,
            texture_slots: SlotCounter::new("bindless textures", config.max_texture_count),
            material_entries: SlotCounter::new("material entries", config.max_material_entry_count),
            dummy_texture: TextureHandle::INVALID,
        }
    }

    /// Create the GPU tables and the default asset tree
    pub fn initialize(&mut self) -> Result<()> {
        self.resources.initialize()?;
        self.create_material_buffer()?;
        self.create_descriptor_set()?;
        self.create_default_assets()?;
        engine_info!("galaxy3d::AssetManager", "AssetManager initialized");
        Ok(())
    }

    /// Release the GPU tables and every device resource
    pub fn destroy(&mut self) {
        self.descriptor_set = None;
        self.material_buffer = None;
        self.resources.destroy();
        engine_info!("galaxy3d::AssetManager", "AssetManager destroyed");
    }

    // ===== ACCESSORS =====

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    pub fn dependencies(&self) -> &RendererDependencyProvider {
        &self.dependencies
    }

    pub fn compatibility(&self) -> &CompatibilityDescriptor {
        &self.compatibility
    }

    pub fn log_asset_loading(&self) -> bool {
        self.log_loading
    }

    /// Assembler writing into this manager's resource registry
    pub fn assembler(&mut self) -> MeshAssembler<'_> {
        MeshAssembler::new(&mut self.resources, self.log_loading)
    }

    /// Material descriptor set (material buffer + bindless textures)
    pub fn descriptor_set(&self) -> Option<&Arc<dyn DescriptorSet>> {
        self.descriptor_set.as_ref()
    }

    pub fn material_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.material_buffer.as_ref()
    }

    /// Placeholder for material texture slots with no source file
    pub fn dummy_texture(&self) -> TextureHandle {
        self.dummy_texture
    }

    pub fn textures(&self) -> &AssetContainer<Texture> {
        &self.textures
    }

    pub fn materials(&self) -> &AssetContainer<Material> {
        &self.materials
    }

    pub fn meshes(&self) -> &AssetContainer<Mesh> {
        &self.meshes
    }

    pub fn coloured_meshes(&self) -> &AssetContainer<ColouredMesh> {
        &self.coloured_meshes
    }

    pub fn composite_meshes(&self) -> &AssetContainer<CompositeMesh> {
        &self.composite_meshes
    }

    pub fn texture_slots_used(&self) -> u32 {
        self.texture_slots.len()
    }

    pub fn material_entries_used(&self) -> u32 {
        self.material_entries.len()
    }

    // ===== REGISTRATION =====

    /// Register a texture, upload it and bind it to the next bindless slot
    pub fn add_texture(&mut self, texture: Texture) -> Result<TextureHandle> {
        let handle = TextureHandle::new(self.textures.add(texture));
        if !self.textures[handle.id()].valid() {
            return Ok(handle);
        }

        self.prepare_texture(handle)?;
        if self.texture_ready(handle) {
            return Ok(handle);
        }

        self.bind_texture(handle)?;
        Ok(handle)
    }

    /// Register a material and pack it into the material buffer
    pub fn add_material(&mut self, material: Material) -> Result<MaterialHandle> {
        let handle = MaterialHandle::new(self.materials.add(material));
        if !self.materials[handle.id()].valid() {
            return Ok(handle);
        }

        self.prepare_material(handle)?;
        if self.material_ready(handle) {
            return Ok(handle);
        }

        self.write_material(handle)?;
        Ok(handle)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        MeshHandle::new(self.meshes.add(mesh))
    }

    pub fn add_coloured_mesh(&mut self, coloured_mesh: ColouredMesh) -> ColouredMeshHandle {
        ColouredMeshHandle::new(self.coloured_meshes.add(coloured_mesh))
    }

    pub fn add_composite_mesh(&mut self, composite_mesh: CompositeMesh) -> CompositeMeshHandle {
        CompositeMeshHandle::new(self.composite_meshes.add(composite_mesh))
    }

    /// Pipeline variant index for drawing `mesh` with `material`
    pub fn renderer_dependency_for(&mut self, mesh: MeshHandle, material: MaterialHandle) -> usize {
        let transparent = self.materials.resolve(material).has_transparency;
        let layout = &self.meshes.resolve(mesh).layout;
        self.dependencies.add_dependency(layout, transparent)
    }

    // ===== LOOKUP BY NAME =====

    pub fn get_texture(&mut self, name: &str) -> TextureHandle {
        TextureHandle::new(self.textures.translate(name))
    }

    pub fn get_material(&mut self, name: &str) -> MaterialHandle {
        MaterialHandle::new(self.materials.translate(name))
    }

    pub fn get_mesh(&mut self, name: &str) -> MeshHandle {
        MeshHandle::new(self.meshes.translate(name))
    }

    pub fn get_coloured_mesh(&mut self, name: &str) -> ColouredMeshHandle {
        ColouredMeshHandle::new(self.coloured_meshes.translate(name))
    }

    pub fn get_composite_mesh(&mut self, name: &str) -> CompositeMeshHandle {
        CompositeMeshHandle::new(self.composite_meshes.translate(name))
    }

    pub fn get_texture_if_exists(&self, name: &str) -> TextureHandle {
        TextureHandle::new(self.textures.translate_if_exists(name))
    }

    pub fn get_material_if_exists(&self, name: &str) -> MaterialHandle {
        MaterialHandle::new(self.materials.translate_if_exists(name))
    }

    pub fn get_mesh_if_exists(&self, name: &str) -> MeshHandle {
        MeshHandle::new(self.meshes.translate_if_exists(name))
    }

    pub fn get_coloured_mesh_if_exists(&self, name: &str) -> ColouredMeshHandle {
        ColouredMeshHandle::new(self.coloured_meshes.translate_if_exists(name))
    }

    pub fn get_composite_mesh_if_exists(&self, name: &str) -> CompositeMeshHandle {
        CompositeMeshHandle::new(self.composite_meshes.translate_if_exists(name))
    }

    pub fn available_composite_mesh_names(&self) -> Vec<String> {
        self.composite_meshes.available_names()
    }

    // ===== RESOLVE =====

    pub fn resolve_texture(&self, handle: TextureHandle) -> &Texture {
        self.textures.resolve(handle)
    }

    pub fn resolve_material(&self, handle: MaterialHandle) -> &Material {
        self.materials.resolve(handle)
    }

    pub fn resolve_mesh(&self, handle: MeshHandle) -> &Mesh {
        self.meshes.resolve(handle)
    }

    pub fn resolve_coloured_mesh(&self, handle: ColouredMeshHandle) -> &ColouredMesh {
        self.coloured_meshes.resolve(handle)
    }

    pub fn resolve_composite_mesh(&self, handle: CompositeMeshHandle) -> &CompositeMesh {
        self.composite_meshes.resolve(handle)
    }

    pub fn resolve_composite_mesh_mut(&mut self, handle: CompositeMeshHandle) -> &mut CompositeMesh {
        self.composite_meshes.resolve_mut(handle)
    }

    /// The composite itself, without default fallback (loaders fill unloaded composites)
    pub fn composite_mesh_mut(&mut self, handle: CompositeMeshHandle) -> Option<&mut CompositeMesh> {
        self.composite_meshes.get_mut(handle.id())
    }

    // ===== PREPARE / READY =====

    /// Upload the texture's image and sampler (dummies have neither)
    pub fn prepare_texture(&mut self, handle: TextureHandle) -> Result<()> {
        let texture = self.textures.resolve(handle);
        if texture.is_dummy() || !texture.valid() {
            return Ok(());
        }
        let (image, sampler) = (texture.image, texture.sampler);
        self.resources.upload_image(image)?;
        self.resources.upload_sampler(sampler)
    }

    pub fn texture_ready(&self, handle: TextureHandle) -> bool {
        let texture = self.textures.resolve(handle);
        texture.is_dummy()
            || (self.resources.is_image_uploaded(texture.image)
                && self.resources.is_sampler_uploaded(texture.sampler)
                && texture.gpu_index >= 0)
    }

    pub fn prepare_material(&mut self, handle: MaterialHandle) -> Result<()> {
        let textures = self.materials.resolve(handle).textures.clone();
        for texture in textures {
            self.prepare_texture(texture)?;
        }
        Ok(())
    }

    pub fn material_ready(&self, handle: MaterialHandle) -> bool {
        let material = self.materials.resolve(handle);
        material.textures.iter().all(|t| self.texture_ready(*t)) && material.gpu_index >= 0
    }

    /// Upload the index buffer and every bound vertex buffer
    pub fn prepare_mesh(&mut self, handle: MeshHandle) -> Result<()> {
        let buffers: Vec<_> = self.meshes.resolve(handle).bound_buffers().collect();
        for buffer in buffers {
            self.resources.upload_buffer(buffer)?;
        }
        Ok(())
    }

    pub fn mesh_ready(&self, handle: MeshHandle) -> bool {
        self.meshes
            .resolve(handle)
            .bound_buffers()
            .all(|b| self.resources.is_buffer_uploaded(b))
    }

    pub fn prepare_coloured_mesh(&mut self, handle: ColouredMeshHandle) -> Result<()> {
        let coloured = self.coloured_meshes.resolve(handle);
        let (mesh, material) = (coloured.mesh, coloured.material);
        self.prepare_mesh(mesh)?;
        self.prepare_material(material)
    }

    pub fn coloured_mesh_ready(&self, handle: ColouredMeshHandle) -> bool {
        let coloured = self.coloured_meshes.resolve(handle);
        self.mesh_ready(coloured.mesh) && self.material_ready(coloured.material)
    }

    pub fn prepare_composite_mesh(&mut self, handle: CompositeMeshHandle) -> Result<()> {
        let entries: Vec<_> = self.composite_meshes.resolve(handle).entries.iter().map(|e| e.mesh).collect();
        for mesh in entries {
            self.prepare_coloured_mesh(mesh)?;
        }
        Ok(())
    }

    pub fn composite_mesh_ready(&self, handle: CompositeMeshHandle) -> bool {
        self.composite_meshes
            .resolve(handle)
            .entries
            .iter()
            .all(|e| self.coloured_mesh_ready(e.mesh))
    }

    // ===== COMPOSITE MESH QUERIES =====

    fn composite_entry(&self, handle: CompositeMeshHandle, index: usize) -> Option<(Mat4, &ColouredMesh, &Mesh)> {
        let entry = self.composite_meshes.resolve(handle).entries.get(index)?;
        let coloured = self.coloured_meshes.resolve(entry.mesh);
        let mesh = self.meshes.resolve(coloured.mesh);
        Some((entry.transform, coloured, mesh))
    }

    pub fn composite_transform(&self, handle: CompositeMeshHandle, index: usize) -> Option<Mat4> {
        self.composite_meshes.resolve(handle).transform(index)
    }

    /// Bounds of one entry, transformed by its entry transform
    pub fn composite_entry_aabb(&self, handle: CompositeMeshHandle, index: usize) -> Option<AABB> {
        self.composite_entry(handle, index)
            .map(|(transform, _, mesh)| mesh.aabb.transformed(&transform))
    }

    /// Bounds of the whole composite (merge of every transformed entry)
    pub fn composite_aabb(&self, handle: CompositeMeshHandle) -> AABB {
        let count = self.composite_meshes.resolve(handle).len();
        (0..count)
            .filter_map(|i| self.composite_entry_aabb(handle, i))
            .fold(AABB::EMPTY, |acc, b| acc.merged(&b))
    }

    pub fn composite_index_count(&self, handle: CompositeMeshHandle, index: usize) -> Option<u32> {
        self.composite_entry(handle, index).map(|(_, _, mesh)| mesh.index_count)
    }

    pub fn composite_dependency_index(&self, handle: CompositeMeshHandle, index: usize) -> Option<usize> {
        self.composite_entry(handle, index)
            .map(|(_, coloured, _)| coloured.renderer_dependency_index)
    }

    /// First material buffer entry of the entry's material
    pub fn composite_material_index(&self, handle: CompositeMeshHandle, index: usize) -> Option<i32> {
        self.composite_entry(handle, index)
            .map(|(_, coloured, _)| self.materials.resolve(coloured.material).gpu_index)
    }

    pub fn composite_vertex_bindings(
        &self,
        handle: CompositeMeshHandle,
        index: usize,
    ) -> Option<[VertexBufferBinding; VertexDataElem::COUNT]> {
        self.composite_entry(handle, index).map(|(_, _, mesh)| mesh.vertex_buffers)
    }

    pub fn composite_index_binding(&self, handle: CompositeMeshHandle, index: usize) -> Option<IndexBufferBinding> {
        self.composite_entry(handle, index).map(|(_, _, mesh)| mesh.index_buffer)
    }

    // ===== GPU TABLES =====

    fn create_material_buffer(&mut self) -> Result<()> {
        let size = self.material_entries.capacity() as u64 * std::mem::size_of::<f32>() as u64;
        let buffer = self.resources.lock_device()?.create_buffer(BufferDesc {
            size,
            usage: BufferUsage::STORAGE | BufferUsage::TRANSFER_DST,
        })?;
        self.material_buffer = Some(buffer);
        Ok(())
    }

    fn create_descriptor_set(&mut self) -> Result<()> {
        let buffer = self.material_buffer.clone().ok_or_else(not_initialized)?;
        let desc = DescriptorSetDesc {
            bindings: vec![
                DescriptorBinding {
                    binding: MATERIAL_BUFFER_BINDING,
                    descriptor_type: DescriptorType::StorageBuffer,
                    count: 1,
                },
                DescriptorBinding {
                    binding: TEXTURE_ARRAY_BINDING,
                    descriptor_type: DescriptorType::CombinedImageSampler,
                    count: self.texture_slots.capacity(),
                },
            ],
        };

        let mut device = self.resources.lock_device()?;
        let set = device.create_descriptor_set(&desc)?;
        device.write_descriptor_set(&set, &DescriptorWrite::StorageBuffer {
            binding: MATERIAL_BUFFER_BINDING,
            buffer,
        })?;
        drop(device);

        self.descriptor_set = Some(set);
        Ok(())
    }

    /// Write the texture into the next bindless slot
    fn bind_texture(&mut self, handle: TextureHandle) -> Result<()> {
        let set = self.descriptor_set.clone().ok_or_else(not_initialized)?;
        let texture = &self.textures[handle.id()];
        let image = self.resources.image(texture.image).and_then(|r| r.image()).cloned();
        let sampler = self.resources.sampler(texture.sampler).and_then(|r| r.sampler()).cloned();
        let (Some(image), Some(sampler)) = (image, sampler) else {
            return Err(Error::InvalidResource(format!("texture {} is not uploaded", texture.name())));
        };

        let slot = self.texture_slots.reserve(1)?;
        self.resources.lock_device()?.write_descriptor_set(&set, &DescriptorWrite::CombinedImageSampler {
            binding: TEXTURE_ARRAY_BINDING,
            array_element: slot,
            image,
            sampler,
        })?;

        if let Some(texture) = self.textures.get_mut(handle.id()) {
            texture.gpu_index = slot as i32;
        }
        Ok(())
    }

    /// Pack the material's texture slots and values into the material buffer
    fn write_material(&mut self, handle: MaterialHandle) -> Result<()> {
        let material = &self.materials[handle.id()];
        let mut data: Vec<f32> = Vec::with_capacity(material.entry_count());
        for texture in &material.textures {
            data.push(self.textures.resolve(*texture).gpu_index as f32 + 0.5);
        }
        data.extend_from_slice(&material.values);

        if data.is_empty() {
            if let Some(material) = self.materials.get_mut(handle.id()) {
                material.gpu_index = -1;
            }
            return Ok(());
        }

        let buffer = self.material_buffer.clone().ok_or_else(not_initialized)?;
        let entry = self.material_entries.reserve(data.len() as u32)?;
        let offset = entry as u64 * std::mem::size_of::<f32>() as u64;
        {
            let mut device = self.resources.lock_device()?;
            let mut commands = device.begin_transfer()?;
            commands.update_buffer(&buffer, offset, bytemuck::cast_slice(&data))?;
            device.end_transfer(commands)?;
        }

        if let Some(material) = self.materials.get_mut(handle.id()) {
            material.gpu_index = entry as i32;
        }
        Ok(())
    }

    // ===== DEFAULT ASSETS =====

    fn create_default_assets(&mut self) -> Result<()> {
        // Cube
        let obj = obj_parser::parse_obj(DEFAULT_CUBE_OBJ)?;
        let shape = obj
            .shapes
            .first()
            .ok_or_else(|| Error::InitializationFailed("default cube has no shape".to_string()))?;
        let mut cube = Mesh::empty("__defaultCubeMesh".to_string());
        if !obj_loader::assemble_simple_shape(&mut self.assembler(), &obj, shape, &mut cube)? {
            return Err(Error::InitializationFailed("default cube could not be assembled".to_string()));
        }
        let mesh = self.add_mesh(cube);
        self.prepare_mesh(mesh)?;
        self.meshes.set_default(mesh);

        // Checkerboard
        let image = ImageResource::new(
            DEFAULT_TEXTURE_SIZE,
            DEFAULT_TEXTURE_SIZE,
            4,
            ImageFormat::R8G8B8A8_UNORM,
            default_texture_pixels(),
        );
        let image = self.resources.add_image(image);
        self.resources.upload_image(image)?;
        let sampler = self.resources.default_sampler();
        let texture = self.add_texture(Texture::new("__defaultTexture", image, sampler, false))?;
        self.textures.set_default(texture);

        self.dummy_texture = TextureHandle::new(self.textures.add(Texture::dummy("__DummyTexture")));

        let material = Material::new(
            "__defaultMaterial",
            vec![self.dummy_texture; self.compatibility.textures.len()],
            vec![0.5; self.compatibility.values.len()],
        );
        let material = self.add_material(material)?;
        self.materials.set_default(material);

        let dependency = self.renderer_dependency_for(mesh, material);
        let coloured = self.add_coloured_mesh(ColouredMesh::new("__defaultColouredMesh", mesh, material, dependency));
        self.coloured_meshes.set_default(coloured);

        let mut composite = CompositeMesh::empty("__defaultCompositeMesh".to_string());
        composite.push(Mat4::IDENTITY, coloured);
        let composite = self.add_composite_mesh(composite);
        self.composite_meshes.set_default(composite);

        engine_debug!("galaxy3d::AssetManager", "Default assets created");
        Ok(())
    }
}

fn not_initialized() -> Error {
    Error::InitializationFailed("AssetManager::initialize has not been called".to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "asset_manager_tests.rs"]
mod tests;
