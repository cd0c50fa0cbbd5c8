//! Core types shared by every Kiln crate.

pub mod errors;
pub mod settings;
pub mod transform;
pub mod value;

pub use errors::{KilnError, Result};
pub use settings::ImportSettings;
pub use value::Value;
