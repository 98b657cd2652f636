/// Text assembly from DOC piece tables.
///
/// Text in DOC files is stored in a complex way:
/// - The actual text bytes are in the WordDocument stream
/// - The piece table in the Table stream maps character positions to byte offsets
/// - Each piece is either 8-bit (Windows-1252) or 16-bit (UTF-16LE)
///
/// The main document text is the first `ccpText` characters. Footnote,
/// header and annotation text follows it in the same CP space and is left out.
use super::piece_table::PieceDescriptor;
use crate::common::encoding::{decode_utf16le_units, decode_windows_1252};
use tracing::{debug, trace};

/// Concatenate the text of `pieces`, in table order, up to `ccp_text`
/// characters.
///
/// Pieces that point past the end of the stream contribute what is there.
pub fn extract_text_from_pieces(
    word_document: &[u8],
    pieces: &[PieceDescriptor],
    ccp_text: u32,
) -> String {
    let budget = ccp_text as usize;
    let mut text = String::new();
    let mut count = 0usize;

    for piece in pieces {
        if count >= budget {
            break;
        }
        let chars = (piece.length() as usize).min(budget - count);
        if chars == 0 {
            continue;
        }

        let start = piece.file_offset as usize;
        let width = if piece.unicode { 2 } else { 1 };
        let end = start.saturating_add(chars * width).min(word_document.len());
        let Some(bytes) = word_document.get(start..end) else {
            debug!(offset = start, len = word_document.len(), "piece starts past stream end");
            continue;
        };

        let decoded = if piece.unicode {
            let (piece_text, units) = decode_utf16le_units(bytes);
            text.push_str(&piece_text);
            units
        } else {
            text.push_str(&decode_windows_1252(bytes));
            bytes.len()
        };
        if decoded < chars {
            debug!(expected = chars, got = decoded, "piece truncated by stream end");
        }
        count += decoded;
    }

    trace!(chars = count, ccp_text, "pieces assembled");
    text
}
