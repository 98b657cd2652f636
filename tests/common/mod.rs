//! Synthetic .doc builder for integration tests.
#![allow(dead_code)]

use doclift::ole::CompoundFileWriter;

/// Offset of the first text piece inside WordDocument
pub const TEXT_OFFSET: usize = 0x400;

pub const FLAG_ENCRYPTED: u16 = 0x0100;
pub const FLAG_ONE_TABLE: u16 = 0x0200;

/// Stored form of one text piece.
pub enum Piece<'a> {
    /// UTF-16LE, two bytes per character
    Unicode(&'a str),
    /// Windows-1252, one byte per character
    Compressed(&'a [u8]),
}

impl Piece<'_> {
    fn chars(&self) -> u32 {
        match self {
            Piece::Unicode(s) => s.encode_utf16().count() as u32,
            Piece::Compressed(b) => b.len() as u32,
        }
    }

    fn bytes(&self) -> Vec<u8> {
        match self {
            Piece::Unicode(s) => utf16(s),
            Piece::Compressed(b) => b.to_vec(),
        }
    }
}

pub fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

/// Builder for a minimal Word 97 container.
pub struct DocBuilder<'a> {
    pieces: Vec<Piece<'a>>,
    ccp_text: Option<u32>,
    flags: u16,
    clx_override: Option<Vec<u8>>,
    extra_streams: Vec<(&'static str, Vec<u8>)>,
}

impl<'a> DocBuilder<'a> {
    pub fn new() -> Self {
        Self {
            pieces: Vec::new(),
            ccp_text: None,
            flags: 0,
            clx_override: None,
            extra_streams: Vec::new(),
        }
    }

    pub fn piece(mut self, piece: Piece<'a>) -> Self {
        self.pieces.push(piece);
        self
    }

    /// Main text length; defaults to the total piece length.
    pub fn ccp_text(mut self, ccp_text: u32) -> Self {
        self.ccp_text = Some(ccp_text);
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the generated CLX with arbitrary bytes.
    pub fn clx(mut self, clx: Vec<u8>) -> Self {
        self.clx_override = Some(clx);
        self
    }

    pub fn stream(mut self, name: &'static str, data: Vec<u8>) -> Self {
        self.extra_streams.push((name, data));
        self
    }

    /// The WordDocument and table streams without the container.
    pub fn streams(&self) -> (Vec<u8>, Vec<u8>) {
        let mut text = Vec::new();
        let mut cps = vec![0u32];
        let mut fcs = Vec::new();
        for piece in &self.pieces {
            let offset = (TEXT_OFFSET + text.len()) as u32;
            fcs.push(match piece {
                Piece::Unicode(_) => offset,
                Piece::Compressed(_) => (offset << 1) | 0x4000_0000,
            });
            cps.push(cps.last().copied().unwrap_or(0) + piece.chars());
            text.extend(piece.bytes());
        }

        let clx = match &self.clx_override {
            Some(clx) => clx.clone(),
            None => {
                let mut plc: Vec<u8> = cps.iter().flat_map(|cp| cp.to_le_bytes()).collect();
                for fc in &fcs {
                    plc.extend_from_slice(&0u16.to_le_bytes());
                    plc.extend_from_slice(&fc.to_le_bytes());
                    plc.extend_from_slice(&0u16.to_le_bytes());
                }
                // A property block ahead of the piece table
                let mut clx = vec![0x01, 0x02, 0x00, 0xAB, 0xCD];
                clx.push(0x02);
                clx.extend_from_slice(&(plc.len() as u32).to_le_bytes());
                clx.extend_from_slice(&plc);
                clx
            },
        };
        // CLX sits after some unrelated table data
        let mut table = vec![0u8; 24];
        let fc_clx = table.len() as u32;
        table.extend_from_slice(&clx);

        let ccp_text = self.ccp_text.unwrap_or(cps.last().copied().unwrap_or(0));
        let mut word = fib(self.flags, ccp_text, fc_clx, clx.len() as u32);
        word.resize(TEXT_OFFSET, 0);
        word.extend_from_slice(&text);
        (word, table)
    }

    /// Build the complete compound file image.
    pub fn build(&self) -> Vec<u8> {
        let (word, table) = self.streams();
        let table_name = if self.flags & FLAG_ONE_TABLE != 0 { "1Table" } else { "0Table" };

        let mut writer = CompoundFileWriter::new();
        writer.add_stream("WordDocument", word);
        writer.add_stream(table_name, table);
        for (name, data) in &self.extra_streams {
            writer.add_stream(*name, data.clone());
        }
        writer.finish().expect("fixture fits in the header DIFAT")
    }
}

/// A Word 97 FIB: FibBase, 14 words, 22 longs, 93 fc/lcb pairs.
pub fn fib(flags: u16, ccp_text: u32, fc_clx: u32, lcb_clx: u32) -> Vec<u8> {
    let mut data = vec![0u8; 32];
    data[0..2].copy_from_slice(&0xA5ECu16.to_le_bytes());
    data[2..4].copy_from_slice(&0x00C1u16.to_le_bytes());
    data[0x0A..0x0C].copy_from_slice(&flags.to_le_bytes());

    data.extend_from_slice(&14u16.to_le_bytes());
    data.extend_from_slice(&[0u8; 28]);

    data.extend_from_slice(&22u16.to_le_bytes());
    for i in 0..22 {
        let value: u32 = if i == 3 { ccp_text } else { 0 };
        data.extend_from_slice(&value.to_le_bytes());
    }

    data.extend_from_slice(&93u16.to_le_bytes());
    for i in 0..93 {
        let (fc, lcb) = if i == 33 { (fc_clx, lcb_clx) } else { (0u32, 0u32) };
        data.extend_from_slice(&fc.to_le_bytes());
        data.extend_from_slice(&lcb.to_le_bytes());
    }
    data
}
