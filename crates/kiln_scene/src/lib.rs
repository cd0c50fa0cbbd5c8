//! Import scene graph
//!
//! Engine-agnostic output of an import job:
//! - Node: transform hierarchy, created only where geometry needs it
//! - Mesh: triangles plus independent vertex data streams and sub-meshes
//! - Material: hinted key/value properties
//! - Scene: append-only owner of all of the above, addressed by handles

pub mod material;
pub mod mesh;
pub mod node;
pub mod scene;

pub use material::{Material, MaterialProperty, SemanticHint, TextureReference};
pub use mesh::{Mesh, MeshError, SubMesh, Triangle, VertexDataStream, VertexIndex, VertexSemantic};
pub use node::Node;
pub use scene::Scene;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshHandle;
    pub struct MaterialHandle;
}
