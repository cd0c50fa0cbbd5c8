//! Kiln: PBRT scene import.
//!
//! Reads PBRT-style scene descriptions (and the PLY meshes they reference)
//! into an engine-agnostic scene graph of nodes, meshes and materials.
//!
//! ```rust,ignore
//! use kiln::{FileSource, ImportSettings, Importer};
//!
//! let importer = Importer::new(FileSource).with_settings(ImportSettings {
//!     scope_materials: true,
//!     ..Default::default()
//! });
//! let scene = importer.import("scenes/killeroo.pbrt").into_result()?;
//! let merged = scene.merge_all_meshes();
//! ```

pub use kiln_assets as assets;
pub use kiln_core as core;
pub use kiln_scene as scene;

pub use kiln_core::errors::{KilnError, Result};
pub use kiln_core::{ImportSettings, Value};

pub use kiln_scene::{
    Material, MaterialHandle, MaterialProperty, Mesh, MeshError, MeshHandle, Node, NodeHandle, Scene, SemanticHint,
    SubMesh, TextureReference, Triangle, VertexDataStream, VertexSemantic,
};

pub use kiln_assets::{
    Diagnostic, FileSource, ImportReport, Importer, MemorySource, ParamData, ParamType, Parameter, ParseContext,
    SceneFormat, SceneSource, SubSceneLoader,
};

pub use kiln_assets::loaders::pbrt;

/// Common imports for hosts embedding the importer.
pub mod prelude {
    pub use crate::{
        FileSource, ImportReport, ImportSettings, Importer, KilnError, Material, MemorySource, Mesh, Scene,
        SceneSource, VertexSemantic,
    };
}
