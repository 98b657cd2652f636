//! Error types for doclift.
//!
//! Structural stages never fail loudly: they return `Option` and let the
//! caller move on to the next stage. Only the outermost entry point and the
//! fixture writer surface an [`Error`].

pub mod types;

pub use types::{Error, Result};
