use std::collections::BTreeMap;

use thiserror::Error;

use crate::{MaterialHandle, NodeHandle};

/// Index of a logical mesh vertex (three per triangle).
pub type VertexIndex = u32;

/// What a vertex data stream describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VertexSemantic {
    Position,
    Normal,
    Tangent,
    TexCoord0,
    TexCoord1,
    Color0,
}

impl VertexSemantic {
    /// Number of floats per element this semantic usually carries.
    #[must_use]
    pub fn default_elements(self) -> u32 {
        match self {
            Self::TexCoord0 | Self::TexCoord1 => 2,
            Self::Position | Self::Normal | Self::Tangent | Self::Color0 => 3,
        }
    }
}

/// A pool of attribute values plus a per-vertex index into it.
///
/// Values are stored as given; nothing is deduplicated.
///
/// Indices address the pool in floats, i.e. element `i` starts at
/// `i * elements_per_vertex`.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexDataStream {
    semantic: VertexSemantic,
    elements_per_vertex: u32,
    values: Vec<f32>,
    index_per_vertex: Vec<u32>,
}

impl VertexDataStream {
    #[must_use]
    pub fn new(semantic: VertexSemantic, elements_per_vertex: u32) -> Self {
        Self {
            semantic,
            elements_per_vertex,
            values: Vec::new(),
            index_per_vertex: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn semantic(&self) -> VertexSemantic {
        self.semantic
    }

    #[inline]
    #[must_use]
    pub fn elements_per_vertex(&self) -> u32 {
        self.elements_per_vertex
    }

    /// Raw pooled values.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of complete elements in the pool.
    #[must_use]
    pub fn element_count(&self) -> usize {
        match self.elements_per_vertex {
            0 => 0,
            n => self.values.len() / n as usize,
        }
    }

    /// Per-vertex offsets into [`values`](Self::values).
    #[inline]
    #[must_use]
    pub fn index_per_vertex(&self) -> &[u32] {
        &self.index_per_vertex
    }

    pub fn reserve_values(&mut self, elements: usize) {
        self.values.reserve(elements * self.elements_per_vertex as usize);
    }

    /// Appends one element and returns its data index.
    pub fn add_value(&mut self, element: &[f32]) -> u32 {
        debug_assert_eq!(element.len(), self.elements_per_vertex as usize);
        let index = self.values.len() as u32;
        self.values.extend_from_slice(element);
        index
    }

    /// Appends raw floats verbatim and returns the data index of the first one.
    pub fn add_values(&mut self, values: &[f32]) -> u32 {
        let index = self.values.len() as u32;
        self.values.extend_from_slice(values);
        index
    }

    /// Points `vertex` at `data_index` in the value pool.
    pub fn set_data_index(&mut self, vertex: VertexIndex, data_index: u32) {
        let slot = vertex as usize;
        if slot >= self.index_per_vertex.len() {
            self.index_per_vertex.resize(slot + 1, 0);
        }
        self.index_per_vertex[slot] = data_index;
    }

    #[must_use]
    pub fn data_index(&self, vertex: VertexIndex) -> Option<u32> {
        self.index_per_vertex.get(vertex as usize).copied()
    }

    /// The element referenced by `vertex`, if both index and element exist.
    #[must_use]
    pub fn value(&self, vertex: VertexIndex) -> Option<&[f32]> {
        let start = self.data_index(vertex)? as usize;
        self.values.get(start..start + self.elements_per_vertex as usize)
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<f32> {
        &mut self.values
    }
}

/// Three logical vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [VertexIndex; 3],
}

/// A contiguous triangle range rendered with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    /// `None` means "no material".
    pub material: Option<MaterialHandle>,
    pub first_triangle: u32,
    pub triangle_count: u32,
}

/// Invariant violations reported by [`Mesh::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("{semantic:?} stream has {found} vertex indices, mesh has {expected} vertices")]
    VertexCountMismatch {
        semantic: VertexSemantic,
        expected: u32,
        found: usize,
    },

    #[error("{semantic:?} stream: vertex {vertex} points at {index}, pool holds {len} floats")]
    IndexOutOfRange {
        semantic: VertexSemantic,
        vertex: VertexIndex,
        index: u32,
        len: usize,
    },

    #[error("triangle {triangle} references vertex {vertex}, mesh has {vertex_count} vertices")]
    DanglingVertex {
        triangle: usize,
        vertex: VertexIndex,
        vertex_count: u32,
    },

    #[error("sub-meshes do not partition the triangle range: expected start {expected}, found {found}")]
    SubMeshGap { expected: u32, found: u32 },

    #[error("sub-meshes cover {covered} triangles, mesh has {total}")]
    SubMeshCoverage { covered: u32, total: u32 },
}

/// Triangle mesh with independent attribute streams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    parent: Option<NodeHandle>,
    streams: BTreeMap<VertexSemantic, VertexDataStream>,
    triangles: Vec<Triangle>,
    vertex_count: u32,
    sub_meshes: Vec<SubMesh>,
}

impl Mesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    pub fn set_parent(&mut self, parent: Option<NodeHandle>) {
        self.parent = parent;
    }

    /// Appends `count` triangles, each with three fresh vertices.
    pub fn add_triangles(&mut self, count: usize) {
        self.triangles.reserve(count);
        for _ in 0..count {
            let first = self.vertex_count;
            self.triangles.push(Triangle {
                vertices: [first, first + 1, first + 2],
            });
            self.vertex_count += 3;
        }
    }

    #[inline]
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    #[must_use]
    pub fn num_triangles(&self) -> u32 {
        self.triangles.len() as u32
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Returns the stream for `semantic`, creating it if needed.
    pub fn add_data_stream(&mut self, semantic: VertexSemantic, elements_per_vertex: u32) -> &mut VertexDataStream {
        self.streams
            .entry(semantic)
            .or_insert_with(|| VertexDataStream::new(semantic, elements_per_vertex))
    }

    #[must_use]
    pub fn data_stream(&self, semantic: VertexSemantic) -> Option<&VertexDataStream> {
        self.streams.get(&semantic)
    }

    pub fn data_stream_mut(&mut self, semantic: VertexSemantic) -> Option<&mut VertexDataStream> {
        self.streams.get_mut(&semantic)
    }

    /// Streams in semantic order.
    pub fn data_streams(&self) -> impl Iterator<Item = &VertexDataStream> {
        self.streams.values()
    }

    #[inline]
    #[must_use]
    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }

    #[inline]
    pub fn sub_meshes_mut(&mut self) -> &mut [SubMesh] {
        &mut self.sub_meshes
    }

    pub fn add_sub_mesh(&mut self, sub_mesh: SubMesh) {
        self.sub_meshes.push(sub_mesh);
    }

    /// Checks stream indices and the sub-mesh partition.
    pub fn validate(&self) -> Result<(), MeshError> {
        for (index, triangle) in self.triangles.iter().enumerate() {
            for &vertex in &triangle.vertices {
                if vertex >= self.vertex_count {
                    return Err(MeshError::DanglingVertex {
                        triangle: index,
                        vertex,
                        vertex_count: self.vertex_count,
                    });
                }
            }
        }

        for stream in self.streams.values() {
            if stream.index_per_vertex.len() != self.vertex_count as usize {
                return Err(MeshError::VertexCountMismatch {
                    semantic: stream.semantic,
                    expected: self.vertex_count,
                    found: stream.index_per_vertex.len(),
                });
            }
            let width = stream.elements_per_vertex as usize;
            for (vertex, &index) in stream.index_per_vertex.iter().enumerate() {
                let in_range = width > 0
                    && (index as usize) % width == 0
                    && index as usize + width <= stream.values.len();
                if !in_range {
                    return Err(MeshError::IndexOutOfRange {
                        semantic: stream.semantic,
                        vertex: vertex as VertexIndex,
                        index,
                        len: stream.values.len(),
                    });
                }
            }
        }

        if self.sub_meshes.is_empty() {
            return Ok(());
        }
        let mut expected = 0;
        for sub_mesh in &self.sub_meshes {
            if sub_mesh.first_triangle != expected {
                return Err(MeshError::SubMeshGap {
                    expected,
                    found: sub_mesh.first_triangle,
                });
            }
            expected += sub_mesh.triangle_count;
        }
        if expected != self.num_triangles() {
            return Err(MeshError::SubMeshCoverage {
                covered: expected,
                total: self.num_triangles(),
            });
        }
        Ok(())
    }
}
