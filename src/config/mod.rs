//! Session configuration
//!
//! Loads YAML session files, merges built-in patterns and command-line
//! overrides, and validates the result before a sequencer is built from it.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
