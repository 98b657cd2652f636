//! Doclift - plain text import for legacy Microsoft Word documents
//!
//! This library turns Word 97-2003 binary documents (.doc) into a simple
//! book structure: a title and one chapter of escaped HTML paragraphs.
//!
//! # Features
//!
//! - **OLE2 Reader**: In-memory compound file parsing with loop guards on
//!   every sector chain
//! - **DOC Text**: FIB and piece table decoding, mixed UTF-16LE and
//!   Windows-1252 pieces, field code removal
//! - **Recovery**: Heuristic scan for printable runs when the file
//!   structure is damaged or missing
//! - **OLE2 Writer**: Build compound files in memory, for fixtures and tests
//!
//! Parsing never touches the filesystem and never panics on malformed
//! input. The only error is a document without any recoverable text.
//!
//! # Example - Importing a DOC file
//!
//! ```no_run
//! use doclift::parse_doc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("document.doc")?;
//! let book = parse_doc(&bytes, "document.doc")?;
//!
//! println!("Title: {}", book.title);
//! for chapter in &book.chapters {
//!     println!("{}", chapter.html);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level OLE access
//!
//! ```no_run
//! use doclift::ole::CompoundFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("document.doc")?;
//! let cfb = CompoundFile::parse(&bytes).ok_or("not an OLE2 file")?;
//!
//! // List all streams
//! for entry in cfb.entries() {
//!     println!("Entry: {} ({:?}, {} bytes)", entry.name, entry.kind, entry.size);
//! }
//!
//! // Read a specific stream
//! if let Some(entry) = cfb.find_entry("WordDocument") {
//!     println!("Stream size: {} bytes", cfb.read_stream(entry).len());
//! }
//! # Ok(())
//! # }
//! ```

/// Book structure produced by the importers
pub mod book;

/// Common utilities shared across the crate
pub mod common;

/// Import configuration
pub mod config;

/// DOC import entry points
pub mod import;

/// OLE2 (Object Linking and Embedding) file format support
///
/// This module provides functionality to parse OLE2 structured storage files,
/// which are used by legacy Microsoft Office formats (.doc, .xls, .ppt).
///
/// The `ole` module also contains the `doc` submodule for legacy Word
/// documents, since .doc files are OLE2-based.
pub mod ole;

// Re-export commonly used types for convenience
pub use book::{Chapter, ParsedBook};
pub use common::{Error, Result};
pub use config::{DocImportOptions, FallbackOptions};
pub use import::{parse_doc, parse_doc_with_options};
pub use ole::doc;
