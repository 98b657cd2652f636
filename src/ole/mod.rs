/// Constants for OLE file format
pub mod consts;

/// Compound file reader over an in-memory buffer
mod file;

/// In-memory compound file writer
pub mod writer;

/// Legacy Word document (.doc) reader
///
/// This module provides functionality to extract text from Microsoft Word
/// documents in the legacy binary format (.doc files), which are OLE2-based files.
pub mod doc;

// Re-export public types for convenient access
pub use file::{CompoundFile, DirectoryEntry, EntryKind, is_cfb};
pub use writer::CompoundFileWriter;
