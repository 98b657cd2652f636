//! Common types and utilities shared by the container reader and the
//! Word decoder.

// Submodule declarations
pub mod binary;
pub mod encoding;
pub mod error;
pub mod html;

// Re-exports for convenience
pub use error::{Error, Result};
