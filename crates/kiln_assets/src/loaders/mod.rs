//! Format loaders.

pub mod pbrt;
pub mod ply;
pub mod triangle_mesh;

pub use triangle_mesh::TriangleMeshData;
