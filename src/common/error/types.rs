//! Unified error type for doclift.
use thiserror::Error;

/// Main error type for doclift operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Neither the piece-table chain nor the heuristic scan produced any
    /// non-whitespace text.
    #[error("could not extract text from DOC")]
    NoTextExtracted,

    /// A structure could not be built from the given input
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Result type for doclift operations.
pub type Result<T> = std::result::Result<T, Error>;
