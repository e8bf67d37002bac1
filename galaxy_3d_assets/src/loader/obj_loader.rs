/// Wavefront OBJ loading into a composite mesh.
///
/// Every shape becomes one mesh + coloured mesh pair with an identity
/// transform. Attributes are read through indexed views over the parser's
/// flat arrays, so no per-vertex gathering happens before the assembler.

use std::mem::{offset_of, size_of};
use std::path::{Path, PathBuf};
use glam::{Mat4, Vec2, Vec3};
use rustc_hash::FxHashMap;
use crate::asset::{
    Asset, AssetManager, ColouredMesh, CompositeMeshHandle, Material, MaterialHandle, Mesh,
    MeshAssembler, NoTangentView, PrimitiveTopology, Texture, TextureHandle, TextureKind,
    ValueDescriptor,
};
use crate::error::Result;
use crate::loader::obj_parser::{self, ObjData, ObjIndex, ObjMaterial, ObjShape};
use crate::loader::texture_loader;
use crate::utils::{IndexedView, StridedView};
use crate::{engine_error, engine_info};

type AttributeView<'a, T> = IndexedView<StridedView<'a, T>, StridedView<'a, i32>>;

/// One attribute column of the shape's index triplets
fn index_column(shape: &ObjShape, field: usize) -> Result<StridedView<'_, i32>> {
    StridedView::from_bytes(
        bytemuck::cast_slice(&shape.indices),
        field,
        size_of::<ObjIndex>(),
        shape.indices.len(),
    )
}

fn positions_of<'a>(obj: &'a ObjData, shape: &'a ObjShape) -> Result<AttributeView<'a, Vec3>> {
    let indices = index_column(shape, offset_of!(ObjIndex, vertex))?;
    Ok(IndexedView::new(StridedView::from_slice(&obj.positions), indices))
}

/// `None` when the file has no normals (the assembler generates flat ones)
fn normals_of<'a>(obj: &'a ObjData, shape: &'a ObjShape) -> Result<Option<AttributeView<'a, Vec3>>> {
    if obj.normals.is_empty() {
        return Ok(None);
    }
    let indices = index_column(shape, offset_of!(ObjIndex, normal))?;
    Ok(Some(IndexedView::new(StridedView::from_slice(&obj.normals), indices)))
}

fn texcoords_of<'a>(obj: &'a ObjData, shape: &'a ObjShape) -> Result<AttributeView<'a, Vec2>> {
    let indices = index_column(shape, offset_of!(ObjIndex, texcoord))?;
    Ok(IndexedView::new(StridedView::from_slice(&obj.texcoords), indices))
}

/// Position + normal mesh of one shape (used for the built-in cube)
pub(crate) fn assemble_simple_shape(
    assembler: &mut MeshAssembler<'_>,
    obj: &ObjData,
    shape: &ObjShape,
    mesh: &mut Mesh,
) -> Result<bool> {
    if obj.positions.is_empty() {
        engine_error!("galaxy3d::ObjLoader", "Mesh data is missing vertices");
        return Ok(false);
    }
    let positions = positions_of(obj, shape)?;
    let normals = normals_of(obj, shape)?;
    assembler.simple(positions, normals, shape.indices.len() as u32, mesh)
}

/// Position + normal + tangent + texcoord mesh of one shape
pub(crate) fn assemble_full_shape(
    assembler: &mut MeshAssembler<'_>,
    obj: &ObjData,
    shape: &ObjShape,
    mesh: &mut Mesh,
) -> Result<bool> {
    if obj.positions.is_empty() {
        engine_error!("galaxy3d::ObjLoader", "Mesh data is missing vertices");
        return Ok(false);
    }
    if obj.texcoords.is_empty() {
        engine_error!("galaxy3d::ObjLoader", "Mesh data is missing texture coordinates");
        return Ok(false);
    }
    let positions = positions_of(obj, shape)?;
    let texcoords = texcoords_of(obj, shape)?;
    let normals = normals_of(obj, shape)?;
    assembler.full(positions, texcoords, normals, None::<NoTangentView>, shape.indices.len() as u32, mesh)
}

// ============================================================================
// Materials
// ============================================================================

/// First existing `root/file`, then `mtl_dir/file`
fn resolve_texture_file(roots: &[PathBuf], mtl_dir: &Path, file: &str) -> Option<PathBuf> {
    roots
        .iter()
        .map(|root| root.join(file))
        .chain(std::iter::once(mtl_dir.join(file)))
        .find(|candidate| candidate.is_file())
}

fn texture_files(material: &ObjMaterial, kind: TextureKind) -> Vec<&str> {
    match kind {
        TextureKind::Diffuse => vec![material.diffuse_texture.as_str()],
        TextureKind::Normal => vec![material.normal_texture.as_str()],
        TextureKind::CombinedMro => vec![
            material.metallic_texture.as_str(),
            material.roughness_texture.as_str(),
            material.ambient_texture.as_str(),
        ],
    }
}

/// Texture for one descriptor slot of an MTL material
///
/// A file that cannot be found gives an empty placeholder (rendered as the
/// default texture); a slot the MTL leaves empty gives a dummy.
fn load_material_texture(
    manager: &mut AssetManager,
    roots: &[PathBuf],
    mtl_dir: &Path,
    placeholder_name: String,
    files: &[&str],
    srgb: bool,
    mip_mapped: bool,
) -> Result<TextureHandle> {
    let mut paths = Vec::with_capacity(files.len());
    let mut missing = false;
    let mut dummy = false;
    for file in files {
        if file.is_empty() {
            dummy = true;
            continue;
        }
        match resolve_texture_file(roots, mtl_dir, file) {
            Some(path) => paths.push(path),
            None => {
                engine_error!("galaxy3d::ObjLoader", "Required texture was not found on disk: {}", file);
                missing = true;
            }
        }
    }

    if missing {
        return manager.add_texture(Texture::empty(placeholder_name));
    }
    if dummy {
        return manager.add_texture(Texture::dummy(placeholder_name));
    }

    let texture = match paths.as_slice() {
        [single] => texture_loader::handle_texture(manager, single, srgb, mip_mapped)?,
        _ => {
            let refs: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
            texture_loader::handle_texture_combination(manager, &refs, mip_mapped)?
        }
    };
    manager.prepare_texture(texture)?;
    Ok(texture)
}

fn material_values(manager: &AssetManager, material: &ObjMaterial) -> Vec<f32> {
    let compatibility = manager.compatibility();
    let has_diffuse = compatibility.has_texture(TextureKind::Diffuse);
    let has_mro = compatibility.has_texture(TextureKind::CombinedMro);
    let or_one = |present: bool, value: f32| if present { value } else { 1.0 };

    compatibility
        .values
        .iter()
        .map(|value| match value {
            ValueDescriptor::DiffuseR => or_one(has_diffuse, material.diffuse[0]),
            ValueDescriptor::DiffuseG => or_one(has_diffuse, material.diffuse[1]),
            ValueDescriptor::DiffuseB => or_one(has_diffuse, material.diffuse[2]),
            ValueDescriptor::OpacityR => or_one(has_diffuse, material.dissolve),
            ValueDescriptor::RoughnessR => or_one(has_mro, material.roughness),
            ValueDescriptor::MetallicR => or_one(has_mro, material.metallic),
            ValueDescriptor::NormalScaleR => 1.0,
        })
        .collect()
}

fn load_material(
    manager: &mut AssetManager,
    roots: &[PathBuf],
    mtl_dir: &Path,
    composite_name: &str,
    material: &ObjMaterial,
) -> Result<MaterialHandle> {
    let name = format!("{}/{}", composite_name, material.name);
    let descriptors = manager.compatibility().textures.clone();

    let mut textures = Vec::with_capacity(descriptors.len());
    for descriptor in &descriptors {
        let placeholder_name = format!("{}/{}", name, descriptor.kind as u32);
        let files = texture_files(material, descriptor.kind);
        textures.push(load_material_texture(
            manager,
            roots,
            mtl_dir,
            placeholder_name,
            &files,
            descriptor.srgb,
            descriptor.mip_mapped,
        )?);
    }

    let values = material_values(manager, material);
    manager.add_material(Material::new(name, textures, values))
}

// ============================================================================
// Loading
// ============================================================================

/// Fill the (unloaded) composite `handle` from the OBJ file at its path
///
/// Unreadable files are logged and leave the composite empty, so it keeps
/// resolving to the default composite.
pub fn load_obj(manager: &mut AssetManager, roots: &[PathBuf], handle: CompositeMeshHandle) -> Result<()> {
    let Some(composite) = manager.composite_meshes().get(handle.id()) else {
        return Ok(());
    };
    let (name, path) = (composite.name().to_string(), composite.path.clone());
    let path_name = path.to_string_lossy().into_owned();

    let (obj, obj_materials) = match obj_parser::load_obj_file(&path) {
        Ok(parsed) => parsed,
        Err(e) => {
            engine_error!("galaxy3d::ObjLoader", "Loading {} failed: {}", path_name, e);
            return Ok(());
        }
    };
    let mtl_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut materials: FxHashMap<&str, MaterialHandle> = FxHashMap::default();
    for material in &obj_materials {
        let handle = load_material(manager, roots, &mtl_dir, &name, material)?;
        materials.insert(material.name.as_str(), handle);
    }

    for (i, shape) in obj.shapes.iter().enumerate() {
        let sub_name = if shape.name.is_empty() { i.to_string() } else { shape.name.clone() };
        let mesh_name = format!("{}/{}", path_name, sub_name);

        let mut mesh = Mesh::empty(mesh_name.clone());
        mesh.topology = PrimitiveTopology::TriangleList;
        if !assemble_full_shape(&mut manager.assembler(), &obj, shape, &mut mesh)? {
            engine_error!("galaxy3d::ObjLoader", "Submesh {} skipped", mesh_name);
            continue;
        }
        let mesh = manager.add_mesh(mesh);
        manager.prepare_mesh(mesh)?;

        // per-face materials are not supported
        let material = match shape.material.as_deref().and_then(|m| materials.get(m)) {
            Some(material) => *material,
            None => {
                engine_error!("galaxy3d::ObjLoader", "Material not found for submesh {}", mesh_name);
                manager.add_material(Material::empty(format!("{}/missingMaterial", path_name)))?
            }
        };

        let dependency = manager.renderer_dependency_for(mesh, material);
        let coloured = manager.add_coloured_mesh(ColouredMesh::new(mesh_name, mesh, material, dependency));
        // Pushed right away so a later failure keeps what is already registered
        if let Some(composite) = manager.composite_mesh_mut(handle) {
            composite.push(Mat4::IDENTITY, coloured);
        }
    }

    if manager.log_asset_loading() {
        engine_info!("galaxy3d::ObjLoader", "Loaded {} ({} submeshes)", name, obj.shapes.len());
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "obj_loader_tests.rs"]
mod tests;
