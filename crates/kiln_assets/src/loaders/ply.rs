//! PLY loader.
//!
//! Decoding (ascii and both binary byte orders) is done by `ply-rs`; this
//! module picks the `vertex` and `face` elements apart, fan-triangulates
//! polygons and hands the arrays to [`TriangleMeshData`].

use glam::Vec3;
use kiln_core::{KilnError, Result};
use kiln_scene::Scene;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, ElementDef, Property, PropertyAccess};

use super::triangle_mesh::TriangleMeshData;

/// Accepted texture coordinate property pairs, in lookup order.
const TEXCOORD_NAMES: [(&str, &str); 3] = [("u", "v"), ("s", "t"), ("texture_u", "texture_v")];

fn scalar(property: &Property) -> Option<f32> {
    Some(match *property {
        Property::Float(v) => v,
        Property::Double(v) => v as f32,
        Property::Char(v) => f32::from(v),
        Property::UChar(v) => f32::from(v),
        Property::Short(v) => f32::from(v),
        Property::UShort(v) => f32::from(v),
        Property::Int(v) => v as f32,
        Property::UInt(v) => v as f32,
        _ => return None,
    })
}

fn index_list(property: Property) -> Option<Vec<u32>> {
    match property {
        Property::ListUChar(v) => Some(v.into_iter().map(u32::from).collect()),
        Property::ListUShort(v) => Some(v.into_iter().map(u32::from).collect()),
        Property::ListUInt(v) => Some(v),
        Property::ListChar(v) => v.into_iter().map(|i| u32::try_from(i).ok()).collect(),
        Property::ListShort(v) => v.into_iter().map(|i| u32::try_from(i).ok()).collect(),
        Property::ListInt(v) => v.into_iter().map(|i| u32::try_from(i).ok()).collect(),
        _ => None,
    }
}

#[derive(Default)]
struct PlyVertex {
    position: Vec3,
    normal: Vec3,
    // Indexed by `TEXCOORD_NAMES`.
    texcoords: [[f32; 2]; 3],
}

impl PropertyAccess for PlyVertex {
    fn new() -> Self {
        Self::default()
    }

    fn set_property(&mut self, key: String, property: Property) {
        let Some(value) = scalar(&property) else { return };
        match key.as_str() {
            "x" => self.position.x = value,
            "y" => self.position.y = value,
            "z" => self.position.z = value,
            "nx" => self.normal.x = value,
            "ny" => self.normal.y = value,
            "nz" => self.normal.z = value,
            other => {
                for (slot, (u, v)) in TEXCOORD_NAMES.iter().enumerate() {
                    if other == *u {
                        self.texcoords[slot][0] = value;
                    } else if other == *v {
                        self.texcoords[slot][1] = value;
                    }
                }
            }
        }
    }
}

#[derive(Default)]
struct PlyFace {
    indices: Vec<u32>,
    invalid: bool,
}

impl PropertyAccess for PlyFace {
    fn new() -> Self {
        Self::default()
    }

    fn set_property(&mut self, key: String, property: Property) {
        if key == "vertex_indices" || key == "vertex_index" {
            match index_list(property) {
                Some(indices) => self.indices = indices,
                None => self.invalid = true,
            }
        }
    }
}

fn ply_error(err: &std::io::Error) -> KilnError {
    KilnError::Ply(err.to_string())
}

fn has_properties(element: &ElementDef, names: &[&str]) -> bool {
    names.iter().all(|name| element.properties.contains_key(*name))
}

/// Decodes a PLY file into a scene holding one mesh (named `name`).
pub fn load(bytes: &[u8], name: &str) -> Result<Scene> {
    let mut reader = bytes;
    let vertex_parser = Parser::<PlyVertex>::new();
    let face_parser = Parser::<PlyFace>::new();
    let skip_parser = Parser::<DefaultElement>::new();

    let header = vertex_parser.read_header(&mut reader).map_err(|e| ply_error(&e))?;

    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    let mut has_normals = false;
    let mut texcoord_slot = None;

    // Payloads are laid out in header order, so every element must be consumed.
    for element in header.elements.values() {
        match element.name.as_str() {
            "vertex" => {
                if !has_properties(element, &["x", "y", "z"]) {
                    return Err(KilnError::Ply(format!("{name}: vertex element lacks x/y/z")));
                }
                has_normals = has_properties(element, &["nx", "ny", "nz"]);
                texcoord_slot = TEXCOORD_NAMES
                    .iter()
                    .position(|(u, v)| has_properties(element, &[*u, *v]));
                vertices = vertex_parser
                    .read_payload_for_element(&mut reader, element, &header)
                    .map_err(|e| ply_error(&e))?;
            }
            "face" => {
                faces = face_parser
                    .read_payload_for_element(&mut reader, element, &header)
                    .map_err(|e| ply_error(&e))?;
            }
            other => {
                log::debug!("{name}: skipping PLY element '{other}' ({} entries)", element.count);
                skip_parser
                    .read_payload_for_element(&mut reader, element, &header)
                    .map_err(|e| ply_error(&e))?;
            }
        }
    }

    let mut data = TriangleMeshData {
        positions: vertices.iter().map(|v| v.position).collect(),
        ..Default::default()
    };
    if has_normals {
        data.normals = vertices.iter().map(|v| v.normal).collect();
    }
    if let Some(slot) = texcoord_slot {
        data.texcoords = vertices.iter().flat_map(|v| v.texcoords[slot]).collect();
    }

    let mut skipped = 0usize;
    for face in &faces {
        if face.invalid {
            return Err(KilnError::Ply(format!("{name}: face has negative or non-integer vertex indices")));
        }
        if face.indices.len() < 3 {
            skipped += 1;
            continue;
        }
        for i in 1..face.indices.len() - 1 {
            data.indices
                .extend_from_slice(&[face.indices[0], face.indices[i], face.indices[i + 1]]);
        }
    }
    if skipped > 0 {
        log::warn!("{name}: skipped {skipped} degenerate faces");
    }

    log::debug!(
        "{name}: {} vertices, {} faces, {} triangles",
        vertices.len(),
        faces.len(),
        data.indices.len() / 3
    );

    let mut mesh = data.build("plymesh")?;
    mesh.name = name.to_string();

    let mut scene = Scene::new();
    scene.add_mesh(mesh);
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_scene::VertexSemantic;

    const QUAD: &str = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property float s
property float t
element face 1
property list uchar int vertex_indices
end_header
0 0 0 0 0
1 0 0 1 0
1 1 0 1 1
0 1 0 0 1
4 0 1 2 3
";

    #[test]
    fn quad_is_fan_triangulated() {
        let scene = load(QUAD.as_bytes(), "quad.ply").unwrap();
        let (_, mesh) = scene.meshes().next().unwrap();
        assert_eq!(mesh.num_triangles(), 2);
        assert_eq!(mesh.name, "quad.ply");
        let uv = mesh.data_stream(VertexSemantic::TexCoord0).unwrap();
        assert_eq!(uv.element_count(), 4);
        assert!(mesh.data_stream(VertexSemantic::Normal).is_none());
        // Second triangle is (0, 2, 3).
        let positions = mesh.data_stream(VertexSemantic::Position).unwrap();
        assert_eq!(positions.value(5), Some(&[0.0, 1.0, 0.0][..]));
    }

    #[test]
    fn garbage_header_is_a_ply_error() {
        assert!(matches!(load(b"not a ply file", "bad.ply"), Err(KilnError::Ply(_))));
    }
}
