/// File Information Block (FIB) parser for DOC files.
///
/// The FIB is located at the beginning of the WordDocument stream. Text
/// extraction needs four things from it:
/// - which table stream holds the live piece table (0Table or 1Table)
/// - the length of the main document text
/// - where the CLX (piece table) sits inside the table stream
/// - whether the document is encrypted
use crate::common::binary::{read_u16_le, read_u32_le};
use tracing::debug;

/// wIdent of a Word 97 or later document
pub const WORD_IDENT: u16 = 0xA5EC;

/// Offset of the first variable-length section (after FibBase)
const FIB_BASE_SIZE: usize = 32;

/// Index of ccpText in FibRgLw97
const CCP_TEXT_INDEX: usize = 3;

/// Index of the (fcClx, lcbClx) pair in FibRgFcLcb97
const CLX_PAIR_INDEX: usize = 33;

/// Flags word bits at offset 0x0A
const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE_STREAM: u16 = 0x0200;

/// File Information Block.
///
/// # Structure (simplified)
///
/// - Bytes 0-1: wIdent (magic number, 0xA5EC)
/// - Bytes 2-3: nFib (version number)
/// - Bytes 10-11: flags (encryption, table stream selection, ...)
/// - Bytes 32+: csw + FibRgW97, cslw + FibRgLw97, cbRgFcLcb + FibRgFcLcb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fib {
    /// Magic number
    pub ident: u16,
    /// File format version
    pub n_fib: u16,
    /// Whether to use 1Table (true) or 0Table (false)
    pub which_table_stream: bool,
    /// Whether the document is encrypted or obfuscated
    pub encrypted: bool,
    /// Length of the main document text in characters
    pub ccp_text: u32,
    /// Offset of the CLX in the table stream
    pub fc_clx: u32,
    /// Size of the CLX in bytes
    pub lcb_clx: u32,
}

impl Fib {
    /// Parse a FIB from the WordDocument stream.
    ///
    /// Returns `None` on a wrong ident, or when any of the three
    /// count-prefixed sections runs past the end of the stream or is too
    /// short to hold the field we need.
    pub fn parse(word_document: &[u8]) -> Option<Self> {
        let ident = read_u16_le(word_document, 0)?;
        if ident != WORD_IDENT {
            debug!(ident, "not a Word 97+ FIB");
            return None;
        }
        let n_fib = read_u16_le(word_document, 2)?;
        let flags = read_u16_le(word_document, 0x0A)?;

        let mut offset = FIB_BASE_SIZE;

        // FibRgW97: csw 16-bit words
        let csw = read_u16_le(word_document, offset)? as usize;
        offset = skip_section(word_document, offset + 2, csw * 2)?;

        // FibRgLw97: cslw 32-bit values, ccpText at index 3
        let cslw = read_u16_le(word_document, offset)? as usize;
        let rg_lw = offset + 2;
        offset = skip_section(word_document, rg_lw, cslw * 4)?;
        if cslw <= CCP_TEXT_INDEX {
            debug!(cslw, "FibRgLw too short for ccpText");
            return None;
        }
        let ccp_text = read_u32_le(word_document, rg_lw + CCP_TEXT_INDEX * 4)?;

        // FibRgFcLcb: cbRgFcLcb (fc, lcb) pairs, the CLX pair at index 33
        let cb_rg_fc_lcb = read_u16_le(word_document, offset)? as usize;
        let rg_fc_lcb = offset + 2;
        skip_section(word_document, rg_fc_lcb, cb_rg_fc_lcb * 8)?;
        if cb_rg_fc_lcb <= CLX_PAIR_INDEX {
            debug!(cb_rg_fc_lcb, "FibRgFcLcb too short for the CLX pair");
            return None;
        }
        let clx = rg_fc_lcb + CLX_PAIR_INDEX * 8;
        let fc_clx = read_u32_le(word_document, clx)?;
        let lcb_clx = read_u32_le(word_document, clx + 4)?;

        Some(Self {
            ident,
            n_fib,
            which_table_stream: flags & FLAG_WHICH_TABLE_STREAM != 0,
            encrypted: flags & FLAG_ENCRYPTED != 0,
            ccp_text,
            fc_clx,
            lcb_clx,
        })
    }

    /// Name of the table stream this FIB points at.
    #[inline]
    pub fn table_stream_name(&self) -> &'static str {
        if self.which_table_stream {
            "1Table"
        } else {
            "0Table"
        }
    }
}

/// Check that `len` bytes starting at `start` exist and return the offset
/// just past them.
fn skip_section(data: &[u8], start: usize, len: usize) -> Option<usize> {
    let end = start.checked_add(len)?;
    if end > data.len() {
        debug!(start, len, available = data.len(), "FIB section overruns stream");
        return None;
    }
    Some(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a Word 97 style FIB with the usual section sizes.
    fn build_fib(flags: u16, ccp_text: u32, fc_clx: u32, lcb_clx: u32) -> Vec<u8> {
        let mut data = vec![0u8; FIB_BASE_SIZE];
        data[0..2].copy_from_slice(&WORD_IDENT.to_le_bytes());
        data[2..4].copy_from_slice(&0x00C1u16.to_le_bytes());
        data[0x0A..0x0C].copy_from_slice(&flags.to_le_bytes());

        data.extend_from_slice(&14u16.to_le_bytes());
        data.extend_from_slice(&[0u8; 28]);

        let mut rg_lw = [0u32; 22];
        rg_lw[CCP_TEXT_INDEX] = ccp_text;
        data.extend_from_slice(&22u16.to_le_bytes());
        data.extend(rg_lw.iter().flat_map(|v| v.to_le_bytes()));

        let mut rg_fc_lcb = [0u32; 93 * 2];
        rg_fc_lcb[CLX_PAIR_INDEX * 2] = fc_clx;
        rg_fc_lcb[CLX_PAIR_INDEX * 2 + 1] = lcb_clx;
        data.extend_from_slice(&93u16.to_le_bytes());
        data.extend(rg_fc_lcb.iter().flat_map(|v| v.to_le_bytes()));
        data
    }

    #[test]
    fn test_fib_valid() {
        let fib = Fib::parse(&build_fib(0, 11, 0x20, 0x15)).unwrap();
        assert_eq!(fib.ident, WORD_IDENT);
        assert_eq!(fib.n_fib, 0x00C1);
        assert_eq!(fib.ccp_text, 11);
        assert_eq!(fib.fc_clx, 0x20);
        assert_eq!(fib.lcb_clx, 0x15);
        assert!(!fib.which_table_stream);
        assert!(!fib.encrypted);
        assert_eq!(fib.table_stream_name(), "0Table");
    }

    #[test]
    fn test_fib_table_stream_flag() {
        let fib = Fib::parse(&build_fib(FLAG_WHICH_TABLE_STREAM, 0, 0, 0)).unwrap();
        assert!(fib.which_table_stream);
        assert_eq!(fib.table_stream_name(), "1Table");
    }

    #[test]
    fn test_fib_encrypted_flag() {
        let fib = Fib::parse(&build_fib(FLAG_ENCRYPTED, 0, 0, 0)).unwrap();
        assert!(fib.encrypted);
    }

    #[test]
    fn test_fib_magic_validation() {
        let mut data = build_fib(0, 1, 0, 0);
        data[0] = 0xFF;
        data[1] = 0xFF;
        assert!(Fib::parse(&data).is_none());

        // Word 6/95 ident has a different layout
        data[0..2].copy_from_slice(&0xA5DCu16.to_le_bytes());
        assert!(Fib::parse(&data).is_none());
    }

    #[test]
    fn test_fib_min_size() {
        assert!(Fib::parse(&[0xEC]).is_none());
        assert!(Fib::parse(&build_fib(0, 1, 0, 0)[..40]).is_none());
    }

    #[test]
    fn test_fib_section_overrun() {
        let mut data = build_fib(0, 1, 0, 0);
        // Declare a huge FibRgW97
        data[FIB_BASE_SIZE..FIB_BASE_SIZE + 2].copy_from_slice(&0xFFFFu16.to_le_bytes());
        assert!(Fib::parse(&data).is_none());
    }

    #[test]
    fn test_fib_fc_lcb_too_short_for_clx() {
        let mut data = build_fib(0, 1, 0, 0);
        let cb_offset = FIB_BASE_SIZE + 2 + 28 + 2 + 22 * 4;
        data[cb_offset..cb_offset + 2].copy_from_slice(&10u16.to_le_bytes());
        assert!(Fib::parse(&data).is_none());
    }
}
