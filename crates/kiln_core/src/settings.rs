//! Import Settings
//!
//! Knobs that change how an import job interprets a scene file.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kiln_core::ImportSettings;
//!
//! // Defaults follow the reference behavior.
//! let settings = ImportSettings::default();
//!
//! // Restore the active material on AttributeEnd, like most renderers do.
//! let settings = ImportSettings {
//!     scope_materials: true,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

/// Default bound on nested sub-scene imports.
pub const DEFAULT_MAX_INCLUDE_DEPTH: u32 = 16;

/// Configuration for one import job.
///
/// Every field has a default, so partial JSON documents deserialize fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Maximum nesting of sub-scene imports (e.g. `plymesh` files).
    ///
    /// The top-level file is depth 0. Exceeding the bound aborts the whole
    /// import with [`KilnError::ImportFailed`](crate::KilnError::ImportFailed).
    pub max_include_depth: u32,

    /// When `true`, `AttributeBegin`/`AttributeEnd` also save and restore
    /// the active material. When `false` the last parsed material stays
    /// active across attribute blocks.
    pub scope_materials: bool,

    /// When `true`, `Shape` and `Material` directives outside a
    /// `WorldBegin`/`WorldEnd` block are skipped with a warning.
    pub require_world_block: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            scope_materials: false,
            require_world_block: false,
        }
    }
}
