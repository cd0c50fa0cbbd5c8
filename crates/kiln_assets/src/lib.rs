//! Scene sources and format loaders.
//!
//! - [`io`]: where scene bytes come from ([`FileSource`], [`MemorySource`])
//! - [`importer`]: format dispatch, nested imports and reporting
//! - [`loaders`]: the PBRT directive interpreter and the PLY reader

pub mod importer;
pub mod io;
pub mod loaders;

pub use importer::{Diagnostic, ImportReport, Importer, SceneFormat, SubSceneLoader};
pub use io::{FileSource, MemorySource, SceneSource};
pub use loaders::pbrt::{ParamData, ParamType, Parameter, ParseContext};
