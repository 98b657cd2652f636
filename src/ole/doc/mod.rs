/// Word (.doc) document support.
///
/// This module extracts plain text from Microsoft Word documents in the
/// legacy binary format (.doc files), which uses OLE2 structured storage.
///
/// # DOC File Structure
///
/// A .doc file is an OLE2 structured storage containing several streams:
/// - **WordDocument**: Main document stream containing the FIB and text
/// - **1Table** or **0Table**: Contains the piece table and formatting
/// - **Data**: Contains embedded objects and images
///
/// Two paths lead to text:
/// - [`package::DocPackage`] follows the FIB and piece table
/// - [`fallback::extract_doc_text_fallback`] scans raw bytes for printable
///   runs when the structure is unusable
pub mod fallback;
pub mod package;
pub mod parts;

pub use package::DocPackage;
