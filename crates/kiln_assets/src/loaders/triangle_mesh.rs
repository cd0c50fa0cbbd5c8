//! Shared triangle-mesh construction for loaders whose attributes all
//! follow one index buffer (PBRT `trianglemesh`, PLY).

use glam::Vec3;
use kiln_core::errors::{Result, invalid_shape};
use kiln_scene::{Mesh, VertexSemantic};
use smallvec::SmallVec;

/// De-interleaved attribute arrays driven by a single triangle index list.
#[derive(Debug, Clone, Default)]
pub struct TriangleMeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec3>,
    /// Flat `u v` pairs.
    pub texcoords: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TriangleMeshData {
    /// Validates the arrays and builds a mesh with one stream per present attribute.
    ///
    /// Checks run in order: positions present, indices present, index count
    /// divisible by 3, texcoord float count divisible by 2, every index
    /// addressing an element of every active stream.
    pub fn build(&self, shape: &str) -> Result<Mesh> {
        if self.positions.is_empty() {
            return Err(invalid_shape(shape, "mesh has no positions"));
        }
        if self.indices.is_empty() {
            return Err(invalid_shape(shape, "mesh has no indices"));
        }
        if self.indices.len() % 3 != 0 {
            return Err(invalid_shape(
                shape,
                format!("index count {} is not a multiple of 3", self.indices.len()),
            ));
        }
        if self.texcoords.len() % 2 != 0 {
            return Err(invalid_shape(
                shape,
                format!("texcoord float count {} is not a multiple of 2", self.texcoords.len()),
            ));
        }

        let max_index = self.indices.iter().copied().max().unwrap_or(0) as usize;
        let element_counts = [
            ("P", self.positions.len()),
            ("N", self.normals.len()),
            ("S", self.tangents.len()),
            ("uv", self.texcoords.len() / 2),
        ];
        for (i, (name, count)) in element_counts.into_iter().enumerate() {
            // Optional streams only matter when present.
            if i > 0 && count == 0 {
                continue;
            }
            if max_index >= count {
                return Err(invalid_shape(
                    shape,
                    format!("index {max_index} is out of range for '{name}' ({count} elements)"),
                ));
            }
        }

        let mut mesh = Mesh::new();
        mesh.add_triangles(self.indices.len() / 3);

        let mut active: SmallVec<[VertexSemantic; 4]> = SmallVec::new();

        let positions = mesh.add_data_stream(VertexSemantic::Position, 3);
        positions.reserve_values(self.positions.len());
        for p in &self.positions {
            positions.add_value(&p.to_array());
        }
        active.push(VertexSemantic::Position);

        if !self.normals.is_empty() {
            let normals = mesh.add_data_stream(VertexSemantic::Normal, 3);
            normals.reserve_values(self.normals.len());
            for n in &self.normals {
                normals.add_value(&n.to_array());
            }
            active.push(VertexSemantic::Normal);
        }
        if !self.tangents.is_empty() {
            let tangents = mesh.add_data_stream(VertexSemantic::Tangent, 3);
            tangents.reserve_values(self.tangents.len());
            for t in &self.tangents {
                tangents.add_value(&t.to_array());
            }
            active.push(VertexSemantic::Tangent);
        }
        if !self.texcoords.is_empty() {
            mesh.add_data_stream(VertexSemantic::TexCoord0, 2)
                .add_values(&self.texcoords);
            active.push(VertexSemantic::TexCoord0);
        }

        // Every stream shares the same topology.
        let triangles = mesh.triangles().to_vec();
        for semantic in active {
            let Some(stream) = mesh.data_stream_mut(semantic) else { continue };
            let width = stream.elements_per_vertex();
            for (i, triangle) in triangles.iter().enumerate() {
                for (k, &vertex) in triangle.vertices.iter().enumerate() {
                    stream.set_data_index(vertex, self.indices[i * 3 + k] * width);
                }
            }
        }

        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::KilnError;

    fn single_triangle() -> TriangleMeshData {
        TriangleMeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            indices: vec![0, 1, 2],
            ..Default::default()
        }
    }

    #[test]
    fn builds_position_only_mesh() {
        let mesh = single_triangle().build("trianglemesh").unwrap();
        let positions = mesh.data_stream(VertexSemantic::Position).unwrap();
        assert_eq!(positions.element_count(), 3);
        assert_eq!(positions.index_per_vertex(), &[0, 3, 6]);
        assert!(mesh.data_stream(VertexSemantic::Normal).is_none());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut data = single_triangle();
        data.indices = vec![0, 1, 3];
        assert!(matches!(data.build("trianglemesh"), Err(KilnError::InvalidShapeParameters { .. })));
    }

    #[test]
    fn short_normal_stream_is_rejected() {
        let mut data = single_triangle();
        data.normals = vec![Vec3::Z, Vec3::Z];
        assert!(data.build("trianglemesh").is_err());
    }

    #[test]
    fn odd_texcoord_count_is_rejected() {
        let mut data = single_triangle();
        data.texcoords = vec![0.0, 0.0, 1.0];
        assert!(data.build("trianglemesh").is_err());
    }
}
