//! In-memory compound file writer.
//!
//! Builds version 3 (512-byte sector) compound files holding a flat set of
//! streams directly under the root storage. Streams below the mini stream
//! cutoff go to the mini stream unless that is switched off. The FAT must fit
//! in the 109 header DIFAT slots, which caps the image at roughly 7 MB.
//!
//! Directory entries are linked as a plain right-sibling chain rather than
//! a balanced red-black tree. [`CompoundFile`](super::CompoundFile) only
//! looks entries up by name, so this is enough to produce readable images
//! for tests and fixtures.
//!
//! # Example
//!
//! ```rust
//! use doclift::ole::{CompoundFile, CompoundFileWriter};
//!
//! let mut writer = CompoundFileWriter::new();
//! writer.add_stream("WordDocument", vec![0u8; 600]);
//! let image = writer.finish()?;
//!
//! let cfb = CompoundFile::parse(&image).unwrap();
//! let entry = cfb.find_entry("WordDocument").unwrap();
//! assert_eq!(cfb.read_stream(entry).len(), 600);
//! # Ok::<(), doclift::Error>(())
//! ```
use super::consts::*;
use crate::common::{Error, Result};

const SECTOR_SHIFT: u16 = 9;
const MINI_SECTOR_SHIFT: u16 = 6;
const SECTOR_SIZE: usize = 1 << SECTOR_SHIFT;
const MINI_SECTOR_SIZE: usize = 1 << MINI_SECTOR_SHIFT;
const ENTRIES_PER_SECTOR: usize = SECTOR_SIZE / 4;

/// Header fields that vary between images.
#[derive(Debug, Clone)]
pub(crate) struct HeaderLayout {
    pub num_fat_sectors: u32,
    pub first_dir_sector: u32,
    pub first_minifat_sector: u32,
    pub num_minifat_sectors: u32,
    pub first_difat_sector: u32,
    pub num_difat_sectors: u32,
    /// FAT sector ids for the inline DIFAT; unused slots are written as free
    pub difat: Vec<u32>,
}

/// Encode a 512-byte version 3 header.
pub(crate) fn encode_header(layout: &HeaderLayout) -> Vec<u8> {
    let mut header = vec![0u8; HEADER_SIZE];
    header[0..8].copy_from_slice(MAGIC);
    put_u16(&mut header, 0x18, 0x003E);
    put_u16(&mut header, 0x1A, 0x0003);
    put_u16(&mut header, 0x1C, 0xFFFE);
    put_u16(&mut header, OFFSET_SECTOR_SHIFT, SECTOR_SHIFT);
    put_u16(&mut header, OFFSET_MINI_SECTOR_SHIFT, MINI_SECTOR_SHIFT);
    put_u32(&mut header, OFFSET_NUM_FAT_SECTORS, layout.num_fat_sectors);
    put_u32(&mut header, OFFSET_FIRST_DIR_SECTOR, layout.first_dir_sector);
    put_u32(&mut header, OFFSET_MINI_STREAM_CUTOFF, DEFAULT_MINI_STREAM_CUTOFF);
    put_u32(&mut header, OFFSET_FIRST_MINIFAT_SECTOR, layout.first_minifat_sector);
    put_u32(&mut header, OFFSET_NUM_MINIFAT_SECTORS, layout.num_minifat_sectors);
    put_u32(&mut header, OFFSET_FIRST_DIFAT_SECTOR, layout.first_difat_sector);
    put_u32(&mut header, OFFSET_NUM_DIFAT_SECTORS, layout.num_difat_sectors);
    for slot in 0..HEADER_DIFAT_SLOTS {
        let sector = layout.difat.get(slot).copied().unwrap_or(FREESECT);
        put_u32(&mut header, OFFSET_HEADER_DIFAT + slot * 4, sector);
    }
    header
}

/// Encode one 128-byte directory entry.
///
/// Names longer than 31 UTF-16 code units are cut.
pub(crate) fn encode_directory_entry(
    name: &str,
    entry_type: u8,
    sid_right: u32,
    sid_child: u32,
    start_sector: u32,
    size: u64,
) -> [u8; DIRENTRY_SIZE] {
    let mut slot = [0u8; DIRENTRY_SIZE];
    let units: Vec<u16> = name.encode_utf16().take(31).collect();
    for (i, unit) in units.iter().enumerate() {
        put_u16(&mut slot, i * 2, *unit);
    }
    if entry_type != STGTY_EMPTY {
        put_u16(&mut slot, 0x40, ((units.len() + 1) * 2) as u16);
    }
    slot[0x42] = entry_type;
    slot[0x43] = 1; // black
    put_u32(&mut slot, 0x44, NOSTREAM);
    put_u32(&mut slot, 0x48, sid_right);
    put_u32(&mut slot, 0x4C, sid_child);
    put_u32(&mut slot, 0x74, start_sector);
    slot[0x78..0x80].copy_from_slice(&size.to_le_bytes());
    slot
}

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Where a stream ended up once the image is laid out.
#[derive(Debug, Clone, Copy)]
struct Placement {
    start: u32,
    size: u64,
}

/// Writer for flat compound files.
#[derive(Debug, Clone)]
pub struct CompoundFileWriter {
    /// Streams in insertion order; allocation follows this order
    streams: Vec<(String, Vec<u8>)>,
    /// Whether small streams are placed in the mini stream
    use_mini_stream: bool,
}

impl Default for CompoundFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CompoundFileWriter {
    /// Create an empty writer with the mini stream enabled.
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
            use_mini_stream: true,
        }
    }

    /// Choose whether streams below 4096 bytes go to the mini stream.
    pub fn with_mini_stream(mut self, enabled: bool) -> Self {
        self.use_mini_stream = enabled;
        self
    }

    /// Add a stream under the root storage.
    pub fn add_stream(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> &mut Self {
        self.streams.push((name.into(), data.into()));
        self
    }

    fn is_mini(&self, data: &[u8]) -> bool {
        self.use_mini_stream && !data.is_empty() && data.len() < DEFAULT_MINI_STREAM_CUTOFF as usize
    }

    /// Lay out and serialize the image.
    ///
    /// Sector order: regular streams, mini stream, MiniFAT, directory, FAT.
    pub fn finish(&self) -> Result<Vec<u8>> {
        let mut fat: Vec<u32> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        let mut placements = Vec::with_capacity(self.streams.len());

        // Mini stream contents and MiniFAT
        let mut mini_stream: Vec<u8> = Vec::new();
        let mut minifat: Vec<u32> = Vec::new();

        for (_, data) in &self.streams {
            if data.is_empty() {
                placements.push(Placement { start: ENDOFCHAIN, size: 0 });
            } else if self.is_mini(data) {
                let start = minifat.len() as u32;
                let count = data.len().div_ceil(MINI_SECTOR_SIZE);
                chain(&mut minifat, start, count);
                mini_stream.extend_from_slice(data);
                mini_stream.resize(minifat.len() * MINI_SECTOR_SIZE, 0);
                placements.push(Placement { start, size: data.len() as u64 });
            } else {
                let start = append_chain(&mut fat, &mut body, data);
                placements.push(Placement { start, size: data.len() as u64 });
            }
        }

        let root = if mini_stream.is_empty() {
            Placement { start: ENDOFCHAIN, size: 0 }
        } else {
            let size = mini_stream.len() as u64;
            let start = append_chain(&mut fat, &mut body, &mini_stream);
            Placement { start, size }
        };

        let (first_minifat_sector, num_minifat_sectors) = if minifat.is_empty() {
            (ENDOFCHAIN, 0)
        } else {
            let bytes: Vec<u8> = minifat.iter().flat_map(|v| v.to_le_bytes()).collect();
            let start = append_chain(&mut fat, &mut body, &bytes);
            (start, bytes.len().div_ceil(SECTOR_SIZE) as u32)
        };

        let mut directory = Vec::new();
        let root_child = if self.streams.is_empty() { NOSTREAM } else { 1 };
        directory.extend_from_slice(&encode_directory_entry(
            "Root Entry",
            STGTY_ROOT,
            NOSTREAM,
            root_child,
            root.start,
            root.size,
        ));
        for (i, ((name, _), placement)) in self.streams.iter().zip(&placements).enumerate() {
            let sid = i as u32 + 1;
            let right = if i + 1 < self.streams.len() { sid + 1 } else { NOSTREAM };
            directory.extend_from_slice(&encode_directory_entry(
                name,
                STGTY_STREAM,
                right,
                NOSTREAM,
                placement.start,
                placement.size,
            ));
        }
        while directory.len() % SECTOR_SIZE != 0 {
            directory.extend_from_slice(&encode_directory_entry(
                "",
                STGTY_EMPTY,
                NOSTREAM,
                NOSTREAM,
                0,
                0,
            ));
        }
        let first_dir_sector = append_chain(&mut fat, &mut body, &directory);

        // The FAT has to describe its own sectors as well
        let data_sectors = fat.len();
        let mut num_fat_sectors = 1;
        while num_fat_sectors * ENTRIES_PER_SECTOR < data_sectors + num_fat_sectors {
            num_fat_sectors += 1;
        }
        if num_fat_sectors > HEADER_DIFAT_SLOTS {
            return Err(Error::InvalidFormat(format!(
                "{} FAT sectors needed, at most {} supported",
                num_fat_sectors, HEADER_DIFAT_SLOTS
            )));
        }
        let fat_ids: Vec<u32> = (data_sectors..data_sectors + num_fat_sectors)
            .map(|id| id as u32)
            .collect();
        fat.extend(std::iter::repeat_n(FATSECT, num_fat_sectors));
        fat.resize(num_fat_sectors * ENTRIES_PER_SECTOR, FREESECT);

        let header = encode_header(&HeaderLayout {
            num_fat_sectors: num_fat_sectors as u32,
            first_dir_sector,
            first_minifat_sector,
            num_minifat_sectors,
            first_difat_sector: ENDOFCHAIN,
            num_difat_sectors: 0,
            difat: fat_ids,
        });

        let mut image = header;
        image.extend_from_slice(&body);
        for entry in &fat {
            image.extend_from_slice(&entry.to_le_bytes());
        }
        Ok(image)
    }
}

/// Record a contiguous chain of `count` entries starting at `start`.
fn chain(table: &mut Vec<u32>, start: u32, count: usize) {
    for i in 0..count {
        let next = if i + 1 == count {
            ENDOFCHAIN
        } else {
            start + i as u32 + 1
        };
        table.push(next);
    }
}

/// Append `data` as whole sectors and chain them in the FAT.
fn append_chain(fat: &mut Vec<u32>, body: &mut Vec<u8>, data: &[u8]) -> u32 {
    let start = fat.len() as u32;
    let count = data.len().div_ceil(SECTOR_SIZE).max(1);
    chain(fat, start, count);
    body.extend_from_slice(data);
    body.resize(fat.len() * SECTOR_SIZE, 0);
    start
}
