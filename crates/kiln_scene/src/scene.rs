use std::collections::BTreeMap;

use glam::{Affine3A, Vec3};
use kiln_core::transform::normal_matrix;
use slotmap::SlotMap;

use crate::material::Material;
use crate::mesh::{Mesh, SubMesh, VertexSemantic};
use crate::node::Node;
use crate::{MaterialHandle, MeshHandle, NodeHandle};

/// 导入场景
///
/// Sole owner of every node, mesh and material produced by an import job.
/// Tables are append-only: a handle returned by `add_*` stays valid and
/// keeps pointing at the same object for the lifetime of the scene.
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: SlotMap<NodeHandle, Node>,
    meshes: SlotMap<MeshHandle, Mesh>,
    materials: SlotMap<MaterialHandle, Material>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Producer side
    // ========================================================================

    /// Adds a node. A parent handle that resolves to no node in this scene is dropped.
    pub fn add_node(&mut self, mut node: Node) -> NodeHandle {
        if let Some(parent) = node.parent
            && !self.nodes.contains_key(parent)
        {
            log::warn!("Node parent {parent:?} is not part of this scene, adding as root");
            node.parent = None;
        }
        self.nodes.insert(node)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.insert(mesh)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.insert(material)
    }

    // ========================================================================
    // Consumer side (read-only)
    // ========================================================================

    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[must_use]
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    #[must_use]
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshHandle, &Mesh)> {
        self.meshes.iter()
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialHandle, &Material)> {
        self.materials.iter()
    }

    #[inline]
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn num_meshes(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    #[must_use]
    pub fn num_materials(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.meshes.is_empty() && self.materials.is_empty()
    }

    /// Accumulated transform from `node` up to the root.
    #[must_use]
    pub fn world_transform(&self, node: NodeHandle) -> Affine3A {
        let mut world = Affine3A::IDENTITY;
        let mut current = Some(node);
        // Parents are inserted before children; the step bound caps malformed chains.
        let mut steps = 0;
        while let Some(handle) = current {
            let Some(n) = self.nodes.get(handle) else { break };
            world = n.relative_transform * world;
            current = n.parent;
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
        }
        world
    }

    // ========================================================================
    // Flattening
    // ========================================================================

    /// Bakes every mesh into a single mesh in world space.
    ///
    /// - Node transforms are applied to positions, normals and tangents.
    /// - A stream missing from some meshes is padded with one zero element.
    /// - Sub-meshes are re-based; meshes without sub-meshes contribute one
    ///   "no material" sub-mesh so the result stays a full partition.
    ///
    /// Returns `None` if the scene has no meshes.
    #[must_use]
    pub fn merge_all_meshes(&self) -> Option<Mesh> {
        if self.meshes.is_empty() {
            return None;
        }

        let mut layout: BTreeMap<VertexSemantic, u32> = BTreeMap::new();
        for (_, mesh) in &self.meshes {
            for stream in mesh.data_streams() {
                layout.entry(stream.semantic()).or_insert(stream.elements_per_vertex());
            }
        }

        let mut merged = Mesh::new();
        for (&semantic, &elements) in &layout {
            merged.add_data_stream(semantic, elements);
        }

        for (_, mesh) in &self.meshes {
            if merged.name.is_empty() {
                merged.name.clone_from(&mesh.name);
            }
            let world = mesh.parent().map_or(Affine3A::IDENTITY, |n| self.world_transform(n));
            let first_triangle = merged.num_triangles();
            let first_vertex = merged.vertex_count();
            merged.add_triangles(mesh.triangles().len());

            for (&semantic, &elements) in &layout {
                let Some(target) = merged.data_stream_mut(semantic) else { continue };
                let pool_offset = target.values().len() as u32;

                match mesh.data_stream(semantic) {
                    Some(source) if source.elements_per_vertex() == elements => {
                        let values = target.values_mut();
                        if elements == 3 && matches!(semantic, VertexSemantic::Position | VertexSemantic::Normal | VertexSemantic::Tangent) {
                            let normal_mat = normal_matrix(&world);
                            for chunk in source.values().chunks_exact(3) {
                                let v = Vec3::from_slice(chunk);
                                let out = match semantic {
                                    VertexSemantic::Position => world.transform_point3(v),
                                    VertexSemantic::Normal => (normal_mat * v).try_normalize().unwrap_or(v),
                                    _ => world.transform_vector3(v).try_normalize().unwrap_or(v),
                                };
                                values.extend_from_slice(&out.to_array());
                            }
                        } else {
                            values.extend_from_slice(source.values());
                        }

                        for (t, triangle) in mesh.triangles().iter().enumerate() {
                            for (k, &src_vertex) in triangle.vertices.iter().enumerate() {
                                let data = source.data_index(src_vertex).unwrap_or(0);
                                target.set_data_index(first_vertex + (t * 3 + k) as u32, pool_offset + data);
                            }
                        }
                    }
                    _ => {
                        target.add_values(&vec![0.0; elements as usize]);
                        for v in 0..mesh.triangles().len() as u32 * 3 {
                            target.set_data_index(first_vertex + v, pool_offset);
                        }
                    }
                }
            }

            if mesh.sub_meshes().is_empty() {
                merged.add_sub_mesh(SubMesh {
                    material: None,
                    first_triangle,
                    triangle_count: mesh.num_triangles(),
                });
            } else {
                for sub_mesh in mesh.sub_meshes() {
                    merged.add_sub_mesh(SubMesh {
                        first_triangle: first_triangle + sub_mesh.first_triangle,
                        ..*sub_mesh
                    });
                }
            }
        }

        log::debug!(
            "Merged {} meshes into one ({} triangles, {} sub-meshes)",
            self.meshes.len(),
            merged.num_triangles(),
            merged.sub_meshes().len()
        );
        Some(merged)
    }
}
