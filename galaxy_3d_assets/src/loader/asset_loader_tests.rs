/// Tests for file discovery and extension dispatch

use super::*;
use std::sync::Mutex;
use image::{Rgba, RgbaImage};
use crate::error::Error;
use crate::config::AssetConfig;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::GraphicsDevice;

// ============================================================================
// Helper Functions
// ============================================================================

fn create_asset_manager_with(config: AssetConfig) -> AssetManager {
    let device: Arc<Mutex<dyn GraphicsDevice>> = Arc::new(Mutex::new(MockGraphicsDevice::new()));
    let mut manager = AssetManager::new(device, &config);
    manager.initialize().unwrap();
    manager
}

fn create_asset_manager() -> AssetManager {
    create_asset_manager_with(AssetConfig::default())
}

fn fixture_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("galaxy3d_asset_loader_{}_{}", test, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

const TEXTURED_TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n";

const ALBEDO_MTL: &str = "newmtl painted\nKd 1 1 1\nmap_Kd albedo.png\n";

/// `name`.obj using a diffuse-mapped material from `name`.mtl
fn write_material_obj(dir: &Path, name: &str, with_texcoords: bool) {
    let texcoords = if with_texcoords { "vt 0 0\nvt 1 0\nvt 0 1\n" } else { "" };
    let faces = if with_texcoords { "f 1/1 2/2 3/3\n" } else { "f 1 2 3\n" };
    let obj = format!("mtllib {name}.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\n{texcoords}usemtl painted\n{faces}");
    std::fs::write(dir.join(format!("{}.obj", name)), obj).unwrap();
    std::fs::write(dir.join(format!("{}.mtl", name)), ALBEDO_MTL).unwrap();
    RgbaImage::from_pixel(2, 2, Rgba([200, 10, 10, 255])).save(dir.join("albedo.png")).unwrap();
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_loader_for_extensions() {
    let loader = AssetLoader::new();

    assert_eq!(loader.loader_for(Path::new("a/b.obj")), Some(LoaderKind::Obj));
    assert_eq!(loader.loader_for(Path::new("b.OBJ")), Some(LoaderKind::Obj));
    assert_eq!(loader.loader_for(Path::new("c.glb")), Some(LoaderKind::Glb));
    assert_eq!(loader.loader_for(Path::new("d.gltf")), Some(LoaderKind::Gltf));
    assert_eq!(loader.loader_for(Path::new("e.fbx")), None);
    assert_eq!(loader.loader_for(Path::new("no_extension")), None);
}

#[test]
fn test_relative_name_uses_forward_slashes() {
    let root = Path::new("/assets");
    assert_eq!(
        relative_name(root, &root.join("sub").join("model.obj")),
        Some("sub/model.obj".to_string())
    );
    assert_eq!(relative_name(root, Path::new("/elsewhere/model.obj")), None);
}

// ============================================================================
// collect_files
// ============================================================================

#[test]
fn test_collect_files_registers_known_formats() {
    let root = fixture_dir("collect");
    std::fs::create_dir_all(root.join("sub")).unwrap();
    std::fs::write(root.join("a.obj"), TEXTURED_TRIANGLE).unwrap();
    std::fs::write(root.join("sub").join("b.gltf"), "{}").unwrap();
    std::fs::write(root.join("readme.txt"), "not an asset").unwrap();

    let mut loader = AssetLoader::new();
    loader.add_root_directory(&root);
    let mut manager = create_asset_manager();

    assert_eq!(loader.collect_files(&mut manager).unwrap(), 2);

    let names = manager.available_composite_mesh_names();
    assert!(names.contains(&"a.obj".to_string()));
    assert!(names.contains(&"sub/b.gltf".to_string()));
    assert!(!names.iter().any(|n| n.contains("readme")));

    let handle = manager.get_composite_mesh_if_exists("sub/b.gltf");
    assert_eq!(manager.composite_meshes()[handle.id()].path, root.join("sub").join("b.gltf"));

    // Rescanning does not duplicate entries
    assert_eq!(loader.collect_files(&mut manager).unwrap(), 0);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_collect_files_skips_missing_root() {
    let mut loader = AssetLoader::new();
    loader.add_root_directory("/nonexistent/galaxy3d/root");
    let mut manager = create_asset_manager();

    assert_eq!(loader.collect_files(&mut manager).unwrap(), 0);
}

// ============================================================================
// validate_assets
// ============================================================================

#[test]
fn test_validate_assets_loads_collected_obj() {
    let root = fixture_dir("validate");
    std::fs::write(root.join("tri.obj"), TEXTURED_TRIANGLE).unwrap();
    let mut loader = AssetLoader::new();
    loader.add_root_directory(&root);
    let mut manager = create_asset_manager();
    loader.collect_files(&mut manager).unwrap();

    loader.validate_assets(&mut manager, &["tri.obj"]).unwrap();

    let handle = manager.get_composite_mesh_if_exists("tri.obj");
    assert!(manager.composite_meshes()[handle.id()].valid());
    assert!(manager.composite_mesh_ready(handle));
    assert!(!loader.progress().snapshot().in_progress);

    // Validating again only prepares
    loader.validate_assets(&mut manager, &["tri.obj"]).unwrap();
    assert_eq!(manager.composite_meshes()[handle.id()].len(), 1);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_validate_unknown_name_falls_back_to_default() {
    let loader = AssetLoader::new();
    let mut manager = create_asset_manager();

    loader.validate_assets(&mut manager, &["never/collected.obj"]).unwrap();

    let handle = manager.get_composite_mesh_if_exists("never/collected.obj");
    assert!(handle.is_valid());
    assert_eq!(manager.resolve_composite_mesh(handle).name(), "__defaultCompositeMesh");
}

#[test]
fn test_validate_unknown_extension_is_skipped() {
    let loader = AssetLoader::new();
    let mut manager = create_asset_manager();
    let handle = manager.add_composite_mesh(CompositeMesh::with_path("model.fbx", "/nonexistent/model.fbx"));

    loader.validate_assets(&mut manager, &["model.fbx".to_string()]).unwrap();

    assert!(manager.composite_meshes()[handle.id()].is_empty());
    assert_eq!(loader.progress().snapshot(), crate::loader::LoadProgressSnapshot::default());
}

#[test]
fn test_validate_empty_result_is_not_reloaded() {
    let root = fixture_dir("empty_result");
    // Textured material but no texture coordinates: the only shape is skipped
    write_material_obj(&root, "flat", false);
    let mut loader = AssetLoader::new();
    loader.add_root_directory(&root);
    let mut manager = create_asset_manager();
    loader.collect_files(&mut manager).unwrap();

    loader.validate_assets(&mut manager, &["flat.obj"]).unwrap();
    let handle = manager.get_composite_mesh_if_exists("flat.obj");
    assert!(manager.composite_meshes()[handle.id()].is_empty());
    assert!(manager.composite_meshes()[handle.id()].load_attempted);
    let (slots, entries, materials) = (
        manager.texture_slots_used(),
        manager.material_entries_used(),
        manager.materials().size(),
    );

    loader.validate_assets(&mut manager, &["flat.obj"]).unwrap();
    loader.validate_assets(&mut manager, &["flat.obj"]).unwrap();

    assert_eq!(manager.texture_slots_used(), slots);
    assert_eq!(manager.material_entries_used(), entries);
    assert_eq!(manager.materials().size(), materials);
    assert_eq!(manager.resolve_composite_mesh(handle).name(), "__defaultCompositeMesh");

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_validate_failure_does_not_stop_batch() {
    let root = fixture_dir("batch_failure");
    std::fs::write(root.join("a.obj"), TEXTURED_TRIANGLE).unwrap();
    write_material_obj(&root, "textured", true);
    std::fs::write(root.join("b.obj"), TEXTURED_TRIANGLE).unwrap();
    let mut loader = AssetLoader::new();
    loader.add_root_directory(&root);
    // Only the default texture fits in the bindless table
    let mut manager = create_asset_manager_with(AssetConfig {
        max_texture_count: 1,
        ..AssetConfig::default()
    });
    loader.collect_files(&mut manager).unwrap();

    let result = loader.validate_assets(&mut manager, &["a.obj", "textured.obj", "b.obj"]);

    assert!(matches!(result, Err(Error::CapacityExceeded(_))));
    for name in ["a.obj", "b.obj"] {
        let handle = manager.get_composite_mesh_if_exists(name);
        assert!(manager.composite_meshes()[handle.id()].valid(), "{} not loaded", name);
        assert!(manager.composite_mesh_ready(handle));
    }
    let failed = manager.get_composite_mesh_if_exists("textured.obj");
    assert!(manager.composite_meshes()[failed.id()].is_empty());
    assert_eq!(loader.progress().snapshot(), crate::loader::LoadProgressSnapshot::default());

    std::fs::remove_dir_all(&root).ok();
}
