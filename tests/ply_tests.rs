//! PLY Loader Tests
//!
//! Tests for:
//! - Binary little- and big-endian payloads
//! - Normals and texture coordinate detection
//! - Unknown elements skipped
//! - Bad face indices

use kiln::assets::loaders::ply;
use kiln::{KilnError, Mesh, Scene, VertexSemantic};

const TRIANGLE_HEADER: &str = "element vertex 3
property float x
property float y
property float z
property float nx
property float ny
property float nz
element face 1
property list uchar int vertex_indices
end_header
";

const TRIANGLE_VERTICES: [[f32; 6]; 3] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [2.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    [0.0, 3.0, 0.0, 0.0, 0.0, 1.0],
];

/// Builds a one-triangle binary PLY file with the given byte order.
fn binary_triangle(little_endian: bool) -> Vec<u8> {
    let format = if little_endian { "binary_little_endian" } else { "binary_big_endian" };
    let mut bytes = format!("ply\nformat {format} 1.0\ncomment written by hand\n{TRIANGLE_HEADER}").into_bytes();

    let f32_bytes = |v: f32| if little_endian { v.to_le_bytes() } else { v.to_be_bytes() };
    let i32_bytes = |v: i32| if little_endian { v.to_le_bytes() } else { v.to_be_bytes() };

    for vertex in TRIANGLE_VERTICES {
        for v in vertex {
            bytes.extend_from_slice(&f32_bytes(v));
        }
    }
    bytes.push(3);
    for index in [0, 1, 2] {
        bytes.extend_from_slice(&i32_bytes(index));
    }
    bytes
}

fn only_mesh(scene: &Scene) -> &Mesh {
    let mut meshes = scene.meshes();
    let (_, mesh) = meshes.next().expect("scene has no mesh");
    assert!(meshes.next().is_none());
    mesh
}

fn ascii(body: &str) -> Vec<u8> {
    format!("ply\nformat ascii 1.0\n{body}").into_bytes()
}

// ============================================================================
// Binary Payloads
// ============================================================================

#[test]
fn binary_little_endian_triangle() {
    let scene = ply::load(&binary_triangle(true), "tri.ply").unwrap();
    let mesh = only_mesh(&scene);

    assert_eq!(mesh.num_triangles(), 1);
    let positions = mesh.data_stream(VertexSemantic::Position).unwrap();
    assert_eq!(positions.value(1), Some(&[2.0, 0.0, 0.0][..]));
    assert_eq!(positions.value(2), Some(&[0.0, 3.0, 0.0][..]));
    let normals = mesh.data_stream(VertexSemantic::Normal).unwrap();
    assert_eq!(normals.value(0), Some(&[0.0, 0.0, 1.0][..]));
    assert!(mesh.validate().is_ok());
}

#[test]
fn both_byte_orders_decode_the_same() {
    let little = ply::load(&binary_triangle(true), "tri.ply").unwrap();
    let big = ply::load(&binary_triangle(false), "tri.ply").unwrap();
    assert_eq!(only_mesh(&little), only_mesh(&big));
}

// ============================================================================
// ASCII Layouts
// ============================================================================

#[test]
fn unknown_elements_are_skipped() {
    let bytes = ascii(
        "element vertex 3
property float x
property float y
property float z
element material 2
property uchar red
property uchar green
element face 1
property list uchar uint vertex_index
end_header
0 0 0
1 0 0
0 1 0
255 0
0 255
3 2 1 0
",
    );
    let scene = ply::load(&bytes, "skip.ply").unwrap();
    let mesh = only_mesh(&scene);
    assert_eq!(mesh.num_triangles(), 1);
    // Winding comes straight from the file.
    let positions = mesh.data_stream(VertexSemantic::Position).unwrap();
    assert_eq!(positions.value(0), Some(&[0.0, 1.0, 0.0][..]));
}

#[test]
fn texture_u_v_names_are_recognized() {
    let bytes = ascii(
        "element vertex 3
property float x
property float y
property float z
property float texture_u
property float texture_v
element face 1
property list uchar int vertex_indices
end_header
0 0 0 0 0
1 0 0 1 0
0 1 0 0 1
3 0 1 2
",
    );
    let scene = ply::load(&bytes, "uv.ply").unwrap();
    let uv = only_mesh(&scene).data_stream(VertexSemantic::TexCoord0).unwrap();
    assert_eq!(uv.value(2), Some(&[0.0, 1.0][..]));
}

#[test]
fn degenerate_faces_are_skipped() {
    let bytes = ascii(
        "element vertex 3
property float x
property float y
property float z
element face 2
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
2 0 1
3 0 1 2
",
    );
    let scene = ply::load(&bytes, "degenerate.ply").unwrap();
    assert_eq!(only_mesh(&scene).num_triangles(), 1);
}

// ============================================================================
// Bad Indices
// ============================================================================

#[test]
fn negative_index_is_a_ply_error() {
    let bytes = ascii(
        "element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 -1 2
",
    );
    assert!(matches!(ply::load(&bytes, "neg.ply"), Err(KilnError::Ply(_))));
}

#[test]
fn out_of_range_index_is_invalid_shape() {
    let bytes = ascii(
        "element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 7
",
    );
    let err = ply::load(&bytes, "range.ply").unwrap_err();
    assert!(matches!(err, KilnError::InvalidShapeParameters { ref shape, .. } if shape == "plymesh"));
}

#[test]
fn faceless_file_has_no_indices() {
    let bytes = ascii(
        "element vertex 1
property float x
property float y
property float z
end_header
0 0 0
",
    );
    assert!(matches!(
        ply::load(&bytes, "points.ply"),
        Err(KilnError::InvalidShapeParameters { .. })
    ));
}
