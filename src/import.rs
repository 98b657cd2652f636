/// DOC import entry points.
///
/// Text is taken from the piece table when the container is intact. When
/// any structural step fails, printable runs are recovered first from the
/// WordDocument stream and then from the whole buffer. Only a document that
/// yields no text at all is an error.
use crate::book::ParsedBook;
use crate::common::{Error, Result};
use crate::config::DocImportOptions;
use crate::ole::doc::fallback::extract_doc_text_fallback;
use crate::ole::doc::package::DocPackage;
use crate::ole::doc::parts::control::clean_doc_text;
use tracing::{debug, info, warn};

/// Import a .doc file with default options.
///
/// # Examples
///
/// ```rust
/// use doclift::{parse_doc, Error};
///
/// // No container and no recoverable text
/// let err = parse_doc(&[0u8; 10], "empty.doc").unwrap_err();
/// assert_eq!(err, Error::NoTextExtracted);
/// assert_eq!(err.to_string(), "could not extract text from DOC");
/// ```
pub fn parse_doc(buffer: &[u8], file_name: &str) -> Result<ParsedBook> {
    parse_doc_with_options(buffer, file_name, &DocImportOptions::default())
}

/// Import a .doc file.
///
/// The book has a single chapter titled after the file name.
pub fn parse_doc_with_options(
    buffer: &[u8],
    file_name: &str,
    options: &DocImportOptions,
) -> Result<ParsedBook> {
    let text = extract_text(buffer, options);
    if text.trim().is_empty() {
        warn!(file_name, len = buffer.len(), "no text recovered");
        return Err(Error::NoTextExtracted);
    }

    let title = title_from_file_name(file_name, &options.untitled_title);
    info!(%title, chars = text.len(), "imported DOC");
    Ok(ParsedBook::single_chapter(title, "", &text))
}

/// Run the structured chain, then the heuristic scans, until one yields
/// non-blank text.
fn extract_text(buffer: &[u8], options: &DocImportOptions) -> String {
    let package = DocPackage::parse(buffer);

    if let Some(package) = &package {
        if let Some(text) = package.extract_text() {
            return text;
        }
        debug!("structured extraction failed, scanning WordDocument stream");
        let text = clean_doc_text(&extract_doc_text_fallback(
            package.word_document(),
            &options.stream_fallback(),
        ));
        if !text.trim().is_empty() {
            return text;
        }
    }

    debug!("scanning whole buffer");
    clean_doc_text(&extract_doc_text_fallback(buffer, &options.buffer_fallback()))
}

/// Derive a title from an uploaded file name.
///
/// Directories (either separator) and a trailing `.doc`, in any case, are
/// removed.
fn title_from_file_name(file_name: &str, untitled: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = match base.len().checked_sub(4) {
        Some(cut) if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".doc") => {
            &base[..cut]
        },
        _ => base,
    };
    let stem = stem.trim();
    if stem.is_empty() {
        untitled.to_string()
    } else {
        stem.to_string()
    }
}
