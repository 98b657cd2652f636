/// Structured text extraction for legacy Word documents (.doc).
///
/// A .doc file is an OLE2 compound file with these streams of interest:
/// - **WordDocument**: the FIB followed by the document text
/// - **1Table** or **0Table**: the piece table (CLX), among other things
///
/// [`DocPackage`] resolves the container once and runs the chain
/// FIB → table stream → piece table → text assembly → control-character
/// cleanup. Every step that meets a structure it cannot use yields `None`
/// so the caller can switch to the heuristic scan.
use super::parts::control::clean_doc_text;
use super::parts::fib::Fib;
use super::parts::piece_table::parse_piece_table;
use super::parts::text::extract_text_from_pieces;
use crate::ole::CompoundFile;
use tracing::debug;

/// Name of the main document stream
pub const WORD_DOCUMENT_STREAM: &str = "WordDocument";

/// A Word (.doc) package backed by an in-memory buffer.
///
/// # Examples
///
/// ```rust
/// use doclift::ole::CompoundFileWriter;
/// use doclift::ole::doc::package::DocPackage;
///
/// let mut writer = CompoundFileWriter::new();
/// writer.add_stream("WordDocument", vec![0u8; 64]);
/// let image = writer.finish()?;
///
/// let package = DocPackage::parse(&image).unwrap();
/// assert_eq!(package.word_document().len(), 64);
/// // No FIB, so no structured text
/// assert!(package.extract_text().is_none());
/// # Ok::<(), doclift::Error>(())
/// ```
pub struct DocPackage<'a> {
    /// The underlying compound file
    cfb: CompoundFile<'a>,
    /// Resolved bytes of the WordDocument stream
    word_document: Vec<u8>,
}

impl<'a> DocPackage<'a> {
    /// Open a package from raw bytes.
    ///
    /// Returns `None` when `data` is not a compound file or has no
    /// `WordDocument` stream.
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        let cfb = CompoundFile::parse(data)?;
        Self::from_compound_file(cfb)
    }

    /// Wrap an already parsed compound file.
    pub fn from_compound_file(cfb: CompoundFile<'a>) -> Option<Self> {
        let Some(entry) = cfb.find_entry(WORD_DOCUMENT_STREAM) else {
            debug!("no WordDocument stream");
            return None;
        };
        let word_document = cfb.read_stream(entry);
        Some(Self { cfb, word_document })
    }

    /// Bytes of the WordDocument stream.
    #[inline]
    pub fn word_document(&self) -> &[u8] {
        &self.word_document
    }

    /// The underlying compound file.
    #[inline]
    pub fn compound_file(&self) -> &CompoundFile<'a> {
        &self.cfb
    }

    /// Parse the FIB at the start of the WordDocument stream.
    pub fn fib(&self) -> Option<Fib> {
        Fib::parse(&self.word_document)
    }

    /// Bytes of the table stream named by the FIB.
    pub fn table_stream(&self, fib: &Fib) -> Option<Vec<u8>> {
        let name = fib.table_stream_name();
        let Some(entry) = self.cfb.find_entry(name) else {
            debug!(name, "table stream missing");
            return None;
        };
        Some(self.cfb.read_stream(entry))
    }

    /// Extract the main document text through the piece table.
    ///
    /// The result is already cleaned of control characters. Returns `None`
    /// for encrypted documents, on any structural failure, and when the
    /// text comes out blank.
    pub fn extract_text(&self) -> Option<String> {
        let fib = self.fib()?;
        if fib.encrypted {
            debug!(n_fib = fib.n_fib, "encrypted document, skipping piece table");
            return None;
        }

        let table = self.table_stream(&fib)?;
        let pieces = parse_piece_table(&table, fib.fc_clx, fib.lcb_clx)?;
        debug!(pieces = pieces.len(), ccp_text = fib.ccp_text, "piece table parsed");

        let raw = extract_text_from_pieces(&self.word_document, &pieces, fib.ccp_text);
        let text = clean_doc_text(&raw);
        if text.is_empty() {
            debug!("piece table produced no text");
            return None;
        }
        Some(text)
    }
}
