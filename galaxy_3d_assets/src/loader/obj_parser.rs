/// Wavefront OBJ / MTL text parser.
///
/// Produces flat attribute arrays plus per-shape index triplets (0-based,
/// `-1` where a face vertex omits the attribute), so loaders can read every
/// attribute through an indexed strided view. Polygons are fan-triangulated.

use std::path::{Path, PathBuf};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use crate::engine_warn;
use crate::error::{Error, Result};

/// One face vertex: 0-based attribute indices, `-1` when absent
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ObjIndex {
    pub vertex: i32,
    pub texcoord: i32,
    pub normal: i32,
}

/// A named group of triangles (`o` / `g`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjShape {
    pub name: String,
    /// Three entries per triangle
    pub indices: Vec<ObjIndex>,
    /// First material used by the shape (per-face materials are not kept)
    pub material: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    pub positions: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub shapes: Vec<ObjShape>,
    /// `mtllib` file names, relative to the OBJ file
    pub material_libraries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjMaterial {
    pub name: String,
    pub diffuse: [f32; 3],
    pub dissolve: f32,
    pub roughness: f32,
    pub metallic: f32,
    pub diffuse_texture: String,
    pub normal_texture: String,
    pub roughness_texture: String,
    pub metallic_texture: String,
    pub ambient_texture: String,
}

impl ObjMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse: [0.0; 3],
            dissolve: 1.0,
            roughness: 0.0,
            metallic: 0.0,
            diffuse_texture: String::new(),
            normal_texture: String::new(),
            roughness_texture: String::new(),
            metallic_texture: String::new(),
            ambient_texture: String::new(),
        }
    }
}

fn parse_error(line: usize, what: &str, token: &str) -> Error {
    Error::Parse(format!("line {}: invalid {} '{}'", line + 1, what, token))
}

fn parse_floats<const N: usize>(parts: &mut std::str::SplitWhitespace<'_>, line: usize, what: &str) -> Result<[f32; N]> {
    let mut out = [0.0f32; N];
    for value in out.iter_mut() {
        let token = parts.next().ok_or_else(|| parse_error(line, what, ""))?;
        *value = token.parse().map_err(|_| parse_error(line, what, token))?;
    }
    Ok(out)
}

/// 1-based (or negative relative) OBJ index to 0-based; empty means absent
fn resolve_index(token: &str, count: usize, line: usize) -> Result<i32> {
    if token.is_empty() {
        return Ok(-1);
    }
    let raw: i64 = token.parse().map_err(|_| parse_error(line, "face index", token))?;
    let resolved = match raw {
        0 => return Err(parse_error(line, "face index", token)),
        r if r > 0 => r - 1,
        r => count as i64 + r,
    };
    i32::try_from(resolved)
        .ok()
        .filter(|i| *i >= 0)
        .ok_or_else(|| parse_error(line, "face index", token))
}

fn parse_face_vertex(token: &str, data: &ObjData, line: usize) -> Result<ObjIndex> {
    let mut split = token.split('/');
    let vertex = resolve_index(split.next().unwrap_or(""), data.positions.len(), line)?;
    let texcoord = resolve_index(split.next().unwrap_or(""), data.texcoords.len(), line)?;
    let normal = resolve_index(split.next().unwrap_or(""), data.normals.len(), line)?;
    if vertex < 0 {
        return Err(parse_error(line, "face vertex", token));
    }
    Ok(ObjIndex { vertex, texcoord, normal })
}

/// Rest of the line after the keyword (names may contain spaces)
fn rest_of_line<'a>(line: &'a str, keyword: &str) -> &'a str {
    line[keyword.len()..].trim()
}

/// Parse OBJ text
pub fn parse_obj(text: &str) -> Result<ObjData> {
    let mut data = ObjData::default();
    let mut current = ObjShape::default();
    let mut material: Option<String> = None;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else { continue };

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&mut parts, line_no, "position")?;
                data.positions.push(Vec3::new(x, y, z));
            }
            "vt" => {
                // v defaults to 0 for 1D texture coordinates
                let [u] = parse_floats::<1>(&mut parts, line_no, "texture coordinate")?;
                let v = match parts.next() {
                    Some(token) => token.parse().map_err(|_| parse_error(line_no, "texture coordinate", token))?,
                    None => 0.0,
                };
                data.texcoords.push(Vec2::new(u, v));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&mut parts, line_no, "normal")?;
                data.normals.push(Vec3::new(x, y, z));
            }
            "f" => {
                let face = parts
                    .map(|token| parse_face_vertex(token, &data, line_no))
                    .collect::<Result<Vec<_>>>()?;
                if face.len() < 3 {
                    engine_warn!("galaxy3d::ObjParser", "line {}: face with fewer than 3 vertices ignored", line_no + 1);
                    continue;
                }
                for i in 1..face.len() - 1 {
                    current.indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                }
                if current.material.is_none() {
                    current.material = material.clone();
                }
            }
            "o" | "g" => {
                let name = rest_of_line(line, keyword).to_string();
                if !current.indices.is_empty() {
                    data.shapes.push(std::mem::take(&mut current));
                }
                current.name = name;
            }
            "usemtl" => {
                material = Some(rest_of_line(line, keyword).to_string());
            }
            "mtllib" => {
                data.material_libraries.extend(parts.map(str::to_string));
            }
            _ => {}
        }
    }

    if !current.indices.is_empty() {
        data.shapes.push(current);
    }
    Ok(data)
}

/// Texture file name of a `map_*` statement (options such as `-bm 1.0` are skipped)
fn texture_name(parts: std::str::SplitWhitespace<'_>) -> String {
    parts.last().unwrap_or("").to_string()
}

/// Parse MTL text
pub fn parse_mtl(text: &str) -> Result<Vec<ObjMaterial>> {
    let mut materials: Vec<ObjMaterial> = Vec::new();

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else { continue };

        if keyword == "newmtl" {
            materials.push(ObjMaterial::new(rest_of_line(line, keyword)));
            continue;
        }
        let Some(material) = materials.last_mut() else {
            continue;
        };

        match keyword {
            "Kd" => material.diffuse = parse_floats::<3>(&mut parts, line_no, "diffuse colour")?,
            "d" => material.dissolve = parse_floats::<1>(&mut parts, line_no, "dissolve")?[0],
            "Tr" => material.dissolve = 1.0 - parse_floats::<1>(&mut parts, line_no, "transparency")?[0],
            "Pr" => material.roughness = parse_floats::<1>(&mut parts, line_no, "roughness")?[0],
            "Pm" => material.metallic = parse_floats::<1>(&mut parts, line_no, "metallic")?[0],
            "map_Kd" => material.diffuse_texture = texture_name(parts),
            "map_Bump" | "map_bump" | "bump" | "norm" => material.normal_texture = texture_name(parts),
            "map_Pr" => material.roughness_texture = texture_name(parts),
            "map_Pm" => material.metallic_texture = texture_name(parts),
            "map_Ka" => material.ambient_texture = texture_name(parts),
            _ => {}
        }
    }
    Ok(materials)
}

/// Parse an OBJ file and every material library it references
///
/// Material libraries are looked up next to the OBJ file; a missing or
/// unreadable library is logged and skipped.
pub fn load_obj_file(path: &Path) -> Result<(ObjData, Vec<ObjMaterial>)> {
    let text = std::fs::read_to_string(path)?;
    let data = parse_obj(&text)?;

    let directory = path.parent().map(Path::to_path_buf).unwrap_or_else(PathBuf::new);
    let mut materials = Vec::new();
    for library in &data.material_libraries {
        let mtl_path = directory.join(library);
        match std::fs::read_to_string(&mtl_path).map_err(Error::from).and_then(|t| parse_mtl(&t)) {
            Ok(mut parsed) => materials.append(&mut parsed),
            Err(e) => engine_warn!(
                "galaxy3d::ObjParser",
                "Material library {} skipped: {}",
                mtl_path.display(),
                e
            ),
        }
    }
    Ok((data, materials))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "obj_parser_tests.rs"]
mod tests;
