/// Piece Table parser for DOC files.
///
/// The piece table maps Character Positions (CP) to File Characters (FC)
/// in the WordDocument stream, handling text stored in different locations
/// and in two encodings.
///
/// References:
/// - [MS-DOC] 2.9.38 Clx
/// - [MS-DOC] 2.9.178 PlcPcd
/// - [MS-DOC] 2.9.177 Pcd
use crate::common::binary::{read_u16_le, read_u32_le};
use tracing::debug;

/// CLX block tag of a Prc (property modifier) block
const CLX_TAG_PRC: u8 = 0x01;
/// CLX block tag of the Pcdt (piece table) block
const CLX_TAG_PCDT: u8 = 0x02;

/// Size of a Pcd in bytes
pub const PIECE_DESCRIPTOR_SIZE: usize = 8;

/// Bit 30 of the raw fc: set when the piece is stored one byte per character
const FC_COMPRESSED: u32 = 0x4000_0000;

/// A text piece - maps a range of CPs to a byte offset in the WordDocument stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceDescriptor {
    /// Start character position (CP)
    pub cp_start: u32,
    /// End character position (CP), exclusive
    pub cp_end: u32,
    /// Byte offset in the WordDocument stream
    pub file_offset: u32,
    /// Whether the text is UTF-16LE (true) or compressed Windows-1252 (false)
    pub unicode: bool,
}

impl PieceDescriptor {
    /// Decode a piece from its CP range and raw fc field.
    ///
    /// A compressed piece stores its fc doubled with bit 30 set, so the
    /// byte offset is the masked value halved.
    pub fn from_raw(cp_start: u32, cp_end: u32, fc_raw: u32) -> Self {
        if fc_raw & FC_COMPRESSED != 0 {
            Self {
                cp_start,
                cp_end,
                file_offset: (fc_raw & !FC_COMPRESSED) >> 1,
                unicode: false,
            }
        } else {
            Self {
                cp_start,
                cp_end,
                file_offset: fc_raw,
                unicode: true,
            }
        }
    }

    /// Get the length in characters.
    #[inline]
    pub fn length(&self) -> u32 {
        self.cp_end.saturating_sub(self.cp_start)
    }
}

/// Parse the piece table out of the CLX stored at `fc_clx..fc_clx + lcb_clx`
/// in the table stream.
///
/// The CLX holds any number of Prc blocks (tag 0x01, u16 size) followed by
/// one Pcdt block (tag 0x02, u32 size, PlcPcd). The PlcPcd is `n + 1` CPs
/// followed by `n` 8-byte Pcds, so its size must be `4 + 12n`.
///
/// Returns `None` when the CLX leaves the stream, a block is truncated, an
/// unknown tag appears, or the PlcPcd size is not of that form.
pub fn parse_piece_table(
    table_stream: &[u8],
    fc_clx: u32,
    lcb_clx: u32,
) -> Option<Vec<PieceDescriptor>> {
    let start = fc_clx as usize;
    let end = start.checked_add(lcb_clx as usize)?;
    let Some(clx) = table_stream.get(start..end) else {
        debug!(fc_clx, lcb_clx, table_len = table_stream.len(), "CLX outside table stream");
        return None;
    };

    let mut offset = 0;
    while offset < clx.len() {
        match clx[offset] {
            CLX_TAG_PRC => {
                let size = read_u16_le(clx, offset + 1)? as usize;
                offset += 3 + size;
            },
            CLX_TAG_PCDT => {
                let size = read_u32_le(clx, offset + 1)? as usize;
                let body_start = offset + 5;
                let body = clx.get(body_start..body_start.checked_add(size)?)?;
                return parse_plc_pcd(body);
            },
            tag => {
                debug!(tag, offset, "unexpected CLX block");
                return None;
            },
        }
    }

    debug!("CLX has no Pcdt block");
    None
}

/// Parse a PlcPcd: `(n + 1)` u32 CPs then `n` Pcds.
fn parse_plc_pcd(plc: &[u8]) -> Option<Vec<PieceDescriptor>> {
    let Some(payload) = plc.len().checked_sub(4) else {
        debug!(size = plc.len(), "PlcPcd too short");
        return None;
    };
    if payload % (4 + PIECE_DESCRIPTOR_SIZE) != 0 {
        debug!(size = plc.len(), "PlcPcd size is not 4 + 12n");
        return None;
    }
    let count = payload / (4 + PIECE_DESCRIPTOR_SIZE);
    let pcd_base = (count + 1) * 4;

    (0..count)
        .map(|i| {
            let cp_start = read_u32_le(plc, i * 4)?;
            let cp_end = read_u32_le(plc, (i + 1) * 4)?;
            // Pcd: u16 flags, u32 fc, u16 prm
            let fc_raw = read_u32_le(plc, pcd_base + i * PIECE_DESCRIPTOR_SIZE + 2)?;
            Some(PieceDescriptor::from_raw(cp_start, cp_end, fc_raw))
        })
        .collect()
}
