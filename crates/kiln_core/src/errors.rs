//! Error Types
//!
//! This module defines the error types used throughout the importer.
//!
//! # Overview
//!
//! The main error type [`KilnError`] covers every failure mode of an import job:
//! - Directive-level problems that only skip the offending directive
//! - Scope bookkeeping errors that terminate the job
//! - Format, syntax and I/O errors raised while reading source files
//!
//! Use [`KilnError::is_fatal`] to decide whether a failure stops the import
//! or merely drops one directive's output.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, KilnError>`.
//!
//! ```rust,ignore
//! use kiln_core::errors::{KilnError, Result};
//!
//! fn parse_something() -> Result<()> {
//!     Err(KilnError::ImportFailed("nothing to import".into()))
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for Kiln.
#[derive(Error, Debug)]
pub enum KilnError {
    // ========================================================================
    // Recoverable directive errors
    // ========================================================================
    /// A directive argument could not be interpreted (e.g. a bad vector literal).
    #[error("Malformed argument for '{directive}': {reason}")]
    MalformedDirectiveArgument {
        /// Directive name as written in the source
        directive: String,
        /// What was wrong with the argument
        reason: String,
    },

    /// Wrong arity, type or content of a shape's parameters.
    #[error("Invalid shape parameters for '{shape}': {reason}")]
    InvalidShapeParameters {
        /// Shape type, e.g. `trianglemesh`
        shape: String,
        /// What was wrong with the parameters
        reason: String,
    },

    /// A nested scene referenced by a shape could not be imported.
    #[error("Failed to import sub-scene {path:?}: {source}")]
    SubImportFailed {
        /// Resolved path of the nested scene
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: Box<KilnError>,
    },

    /// The shape type is not modeled by the importer.
    #[error("Unsupported shape type: {0}")]
    UnsupportedShapeType(String),

    // ========================================================================
    // Fatal errors
    // ========================================================================
    /// A scope-end directive was seen without a matching begin.
    #[error("Scope underflow: '{directive}' without a matching begin")]
    ScopeUnderflow {
        /// The scope-end directive, e.g. `AttributeEnd`
        directive: &'static str,
    },

    /// The import job cannot continue (e.g. nested import depth exceeded).
    #[error("Import failed: {0}")]
    ImportFailed(String),

    /// Tokenizer or parameter-list syntax error.
    #[error("Syntax error at line {line}: {message}")]
    Syntax {
        /// 1-based source line
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// PLY decoding error.
    #[error("PLY error: {0}")]
    Ply(String),

    /// No loader is registered for the file extension.
    #[error("Unsupported scene format: {0:?}")]
    UnsupportedFormat(PathBuf),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl KilnError {
    /// Returns `true` when the error must terminate the import job.
    ///
    /// Recoverable errors only discard the output of the directive that
    /// produced them; the import continues with the next directive.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::MalformedDirectiveArgument { .. }
            | Self::InvalidShapeParameters { .. }
            | Self::SubImportFailed { .. }
            | Self::UnsupportedShapeType(_) => false,
            Self::ScopeUnderflow { .. }
            | Self::ImportFailed(_)
            | Self::Syntax { .. }
            | Self::Ply(_)
            | Self::UnsupportedFormat(_)
            | Self::IoError(_) => true,
        }
    }
}

// ============================================================================
// Convenient constructors
// ============================================================================

/// Builds a [`KilnError::MalformedDirectiveArgument`].
pub fn malformed(directive: &str, reason: impl Into<String>) -> KilnError {
    KilnError::MalformedDirectiveArgument {
        directive: directive.to_string(),
        reason: reason.into(),
    }
}

/// Builds a [`KilnError::InvalidShapeParameters`].
pub fn invalid_shape(shape: &str, reason: impl Into<String>) -> KilnError {
    KilnError::InvalidShapeParameters {
        shape: shape.to_string(),
        reason: reason.into(),
    }
}

/// Alias for `Result<T, KilnError>`.
pub type Result<T> = std::result::Result<T, KilnError>;
