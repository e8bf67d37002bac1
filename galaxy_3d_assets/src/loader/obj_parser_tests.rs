/// Tests for the OBJ / MTL parser

use super::*;

// ============================================================================
// OBJ
// ============================================================================

#[test]
fn test_parse_attributes_and_triangle() {
    let data = parse_obj(
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1\n",
    )
    .unwrap();

    assert_eq!(data.positions.len(), 3);
    assert_eq!(data.texcoords[2], Vec2::new(0.0, 1.0));
    assert_eq!(data.normals[0], Vec3::Z);
    assert_eq!(data.shapes.len(), 1);
    assert_eq!(data.shapes[0].name, "");
    assert_eq!(
        data.shapes[0].indices[1],
        ObjIndex { vertex: 1, texcoord: 1, normal: 0 }
    );
}

#[test]
fn test_missing_attributes_are_minus_one() {
    let data = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\nf 1 2 3\n").unwrap();

    let indices = &data.shapes[0].indices;
    assert_eq!(indices[0], ObjIndex { vertex: 0, texcoord: -1, normal: 0 });
    assert_eq!(indices[3], ObjIndex { vertex: 0, texcoord: -1, normal: -1 });
}

#[test]
fn test_quad_is_fan_triangulated() {
    let data = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();

    let vertices: Vec<i32> = data.shapes[0].indices.iter().map(|i| i.vertex).collect();
    assert_eq!(vertices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn test_negative_indices_are_relative() {
    let data = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();

    let vertices: Vec<i32> = data.shapes[0].indices.iter().map(|i| i.vertex).collect();
    assert_eq!(vertices, vec![0, 1, 2]);
}

#[test]
fn test_objects_split_shapes_and_keep_material() {
    let text = "\
mtllib scene.mtl
v 0 0 0
v 1 0 0
v 0 1 0
o first
usemtl red
f 1 2 3
o second
usemtl blue
f 3 2 1
usemtl green
f 1 3 2
";
    let data = parse_obj(text).unwrap();

    assert_eq!(data.material_libraries, vec!["scene.mtl".to_string()]);
    assert_eq!(data.shapes.len(), 2);
    assert_eq!(data.shapes[0].name, "first");
    assert_eq!(data.shapes[0].material.as_deref(), Some("red"));
    assert_eq!(data.shapes[1].name, "second");
    assert_eq!(data.shapes[1].indices.len(), 6);
    assert_eq!(data.shapes[1].material.as_deref(), Some("blue"));
}

#[test]
fn test_empty_groups_are_dropped() {
    let data = parse_obj("g empty\nv 0 0 0\nv 1 0 0\nv 0 1 0\ng full\nf 1 2 3\n").unwrap();
    assert_eq!(data.shapes.len(), 1);
    assert_eq!(data.shapes[0].name, "full");
}

#[test]
fn test_single_component_texcoord_defaults_v() {
    let data = parse_obj("vt 0.25\nvt 0.5 0.75 0.0\n").unwrap();
    assert_eq!(data.texcoords, vec![Vec2::new(0.25, 0.0), Vec2::new(0.5, 0.75)]);
}

#[test]
fn test_texcoord_without_components_is_parse_error() {
    assert!(matches!(parse_obj("vt\n"), Err(Error::Parse(_))));
    assert!(matches!(parse_obj("vt 0.5 half\n"), Err(Error::Parse(_))));
}

#[test]
fn test_invalid_number_is_parse_error() {
    let result = parse_obj("v 0 zero 0\n");
    assert!(matches!(result, Err(Error::Parse(_))));
}

#[test]
fn test_zero_index_is_parse_error() {
    let result = parse_obj("v 0 0 0\nf 0 1 1\n");
    assert!(matches!(result, Err(Error::Parse(_))));
}

// ============================================================================
// MTL
// ============================================================================

#[test]
fn test_parse_mtl() {
    let text = "\
newmtl metal
Kd 0.5 0.25 1.0
d 0.75
Pr 0.3
Pm 0.9
map_Kd textures/albedo.png
map_Bump -bm 1.0 textures/normal.png
map_Pr rough.png
map_Pm metal.png
map_Ka ao.png

newmtl glass
Tr 0.4
";
    let materials = parse_mtl(text).unwrap();

    assert_eq!(materials.len(), 2);
    let metal = &materials[0];
    assert_eq!(metal.name, "metal");
    assert_eq!(metal.diffuse, [0.5, 0.25, 1.0]);
    assert_eq!(metal.dissolve, 0.75);
    assert_eq!(metal.roughness, 0.3);
    assert_eq!(metal.metallic, 0.9);
    assert_eq!(metal.diffuse_texture, "textures/albedo.png");
    assert_eq!(metal.normal_texture, "textures/normal.png");
    assert_eq!(metal.roughness_texture, "rough.png");
    assert_eq!(metal.metallic_texture, "metal.png");
    assert_eq!(metal.ambient_texture, "ao.png");

    let glass = &materials[1];
    assert!((glass.dissolve - 0.6).abs() < 1e-6);
    assert_eq!(glass.diffuse_texture, "");
}

#[test]
fn test_mtl_statements_before_newmtl_are_ignored() {
    let materials = parse_mtl("Kd 1 1 1\nnewmtl a\n").unwrap();
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0].diffuse, [0.0; 3]);
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_load_obj_file_reads_material_library() {
    let dir = std::env::temp_dir().join(format!("galaxy3d_obj_parser_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("tri.obj"), "mtllib tri.mtl missing.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl red\nf 1 2 3\n").unwrap();
    std::fs::write(dir.join("tri.mtl"), "newmtl red\nKd 1 0 0\n").unwrap();

    let (data, materials) = load_obj_file(&dir.join("tri.obj")).unwrap();

    assert_eq!(data.shapes.len(), 1);
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0].diffuse, [1.0, 0.0, 0.0]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_load_missing_obj_file_is_io_error() {
    let result = load_obj_file(Path::new("/nonexistent/galaxy3d/missing.obj"));
    assert!(matches!(result, Err(Error::Io(_))));
}
