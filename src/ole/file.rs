use super::consts::*;
use crate::common::binary::{read_u16_le, read_u32_le, u32_words};
use crate::common::encoding::decode_utf16le;
use tracing::{debug, trace};
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw OLE directory entry structure (128 bytes)
///
/// This represents the on-disk format of a directory entry.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
#[allow(dead_code)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    /// Node color (0 = red, 1 = black)
    node_color: u8,
    /// Left sibling SID
    sid_left: U32<LE>,
    /// Right sibling SID
    sid_right: U32<LE>,
    /// Child SID
    sid_child: U32<LE>,
    /// CLSID (16 bytes)
    clsid: [u8; 16],
    /// State bits
    state_bits: U32<LE>,
    /// Creation time (FILETIME)
    creation_time: U64<LE>,
    /// Modified time (FILETIME)
    modified_time: U64<LE>,
    /// Starting sector
    start_sector: U32<LE>,
    /// Stream size
    stream_size: U64<LE>,
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Unused slot
    Empty,
    /// Storage (a sub-directory)
    Storage,
    /// Stream holding bytes
    Stream,
    /// The root storage; its chain holds the mini stream
    Root,
    /// Any other type byte
    Other(u8),
}

impl From<u8> for EntryKind {
    fn from(value: u8) -> Self {
        match value {
            STGTY_EMPTY => EntryKind::Empty,
            STGTY_STORAGE => EntryKind::Storage,
            STGTY_STREAM => EntryKind::Stream,
            STGTY_ROOT => EntryKind::Root,
            other => EntryKind::Other(other),
        }
    }
}

/// A decoded directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Entry name (UTF-16 decoded to UTF-8)
    pub name: String,
    /// Entry type
    pub kind: EntryKind,
    /// First sector of the stream (regular or mini, depending on size)
    pub start_sector: u32,
    /// Size of the stream in bytes
    pub size: u64,
}

/// A parsed compound file over a borrowed buffer.
///
/// All tables are built once in [`CompoundFile::parse`] and never change.
/// The directory is kept as the flat slot array; entries are found by name
/// and the red-black tree links are not followed.
#[derive(Debug, Clone)]
pub struct CompoundFile<'a> {
    /// Whole file contents
    data: &'a [u8],
    /// Sector size (512 or 4096 bytes)
    sector_size: usize,
    /// Mini sector size (typically 64 bytes)
    mini_sector_size: usize,
    /// Streams smaller than this live in the mini stream
    mini_stream_cutoff: u32,
    /// First sector of directory stream
    first_dir_sector: u32,
    /// First sector of the MiniFAT chain
    first_minifat_sector: u32,
    /// First chained DIFAT sector
    first_difat_sector: u32,
    /// File Allocation Table - maps sector to next sector in chain
    fat: Vec<u32>,
    /// Mini FAT - maps mini sector to next mini sector
    minifat: Vec<u32>,
    /// Root entry's stream, addressed in mini sectors
    mini_stream: Vec<u8>,
    /// All directory slots indexed by SID
    entries: Vec<DirectoryEntry>,
}

impl<'a> CompoundFile<'a> {
    /// Parse a compound file.
    ///
    /// Returns `None` when the buffer is shorter than a header, does not
    /// start with the compound file signature, or declares sector sizes that
    /// cannot be right. Damaged tables past the header never fail the parse;
    /// they only leave the affected streams short or empty.
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        if !is_cfb(data) {
            trace!(len = data.len(), "not a compound file");
            return None;
        }

        let sector_shift = read_u16_le(data, OFFSET_SECTOR_SHIFT)?;
        let mini_sector_shift = read_u16_le(data, OFFSET_MINI_SECTOR_SHIFT)?;
        if !(7..=16).contains(&sector_shift)
            || mini_sector_shift == 0
            || mini_sector_shift > sector_shift
        {
            debug!(sector_shift, mini_sector_shift, "implausible sector size");
            return None;
        }

        let num_minifat_sectors = read_u32_le(data, OFFSET_NUM_MINIFAT_SECTORS)?;
        let mut cfb = CompoundFile {
            data,
            sector_size: 1usize << sector_shift,
            mini_sector_size: 1usize << mini_sector_shift,
            mini_stream_cutoff: read_u32_le(data, OFFSET_MINI_STREAM_CUTOFF)?,
            first_dir_sector: read_u32_le(data, OFFSET_FIRST_DIR_SECTOR)?,
            first_minifat_sector: read_u32_le(data, OFFSET_FIRST_MINIFAT_SECTOR)?,
            first_difat_sector: read_u32_le(data, OFFSET_FIRST_DIFAT_SECTOR)?,
            fat: Vec::new(),
            minifat: Vec::new(),
            mini_stream: Vec::new(),
            entries: Vec::new(),
        };

        let fat_sectors = cfb.load_difat();
        cfb.fat = cfb.load_fat(&fat_sectors);
        cfb.entries = cfb.load_directory();
        cfb.load_mini_stream(num_minifat_sectors);

        debug!(
            sector_size = cfb.sector_size,
            fat_entries = cfb.fat.len(),
            minifat_entries = cfb.minifat.len(),
            entries = cfb.entries.len(),
            "compound file parsed"
        );
        Some(cfb)
    }

    /// Collect the FAT sector ids from the header slots and the DIFAT chain.
    ///
    /// The last 4 bytes of every DIFAT sector name the next DIFAT sector.
    fn load_difat(&self) -> Vec<u32> {
        let mut fat_sectors: Vec<u32> = (0..HEADER_DIFAT_SLOTS)
            .filter_map(|i| read_u32_le(self.data, OFFSET_HEADER_DIFAT + i * 4))
            .filter(|&sector| sector <= MAXREGSECT)
            .collect();

        let per_sector = self.sector_size / 4 - 1;
        let mut difat_sector = self.first_difat_sector;
        for _ in 0..MAX_DIFAT_SECTORS {
            if difat_sector > MAXREGSECT {
                break;
            }
            let Some(sector) = self.sector(difat_sector) else {
                debug!(difat_sector, "DIFAT sector out of range");
                break;
            };
            fat_sectors.extend(
                u32_words(sector)
                    .take(per_sector)
                    .filter(|&id| id <= MAXREGSECT),
            );
            difat_sector = read_u32_le(sector, per_sector * 4).unwrap_or(ENDOFCHAIN);
        }

        fat_sectors
    }

    /// Concatenate the FAT sectors into one table.
    fn load_fat(&self, fat_sectors: &[u32]) -> Vec<u32> {
        // A FAT never needs more sectors than it takes to describe the file
        let entries_per_sector = self.sector_size / 4;
        let max_fat_sectors = (self.data.len() / self.sector_size) / entries_per_sector + 1;

        let mut fat = Vec::new();
        for &sector_id in fat_sectors.iter().take(max_fat_sectors) {
            // Stop rather than skip: later entries would shift to wrong indices
            let Some(sector) = self.sector(sector_id) else {
                debug!(sector_id, "FAT sector out of range");
                break;
            };
            fat.extend(u32_words(sector));
        }
        fat
    }

    /// Walk the directory chain and decode every 128-byte slot.
    fn load_directory(&self) -> Vec<DirectoryEntry> {
        let mut entries = Vec::new();
        let mut sector_id = self.first_dir_sector;
        for _ in 0..MAX_DIRECTORY_SECTORS {
            if sector_id > MAXREGSECT {
                break;
            }
            let Some(sector) = self.sector(sector_id) else {
                debug!(sector_id, "directory sector out of range");
                break;
            };
            entries.extend(
                sector
                    .chunks_exact(DIRENTRY_SIZE)
                    .filter_map(|slot| self.parse_directory_entry(slot)),
            );
            sector_id = self.next_sector(sector_id);
        }
        entries
    }

    fn parse_directory_entry(&self, slot: &[u8]) -> Option<DirectoryEntry> {
        let raw = RawDirectoryEntry::read_from_bytes(slot).ok()?;

        let name_len = (raw.name_len.get() as usize).min(raw.name.len());
        let name = decode_utf16le(&raw.name[..name_len]);

        // 512-byte sector files only use the low 32 bits of the size
        let size = if self.sector_size == 512 {
            raw.stream_size.get() & 0xFFFF_FFFF
        } else {
            raw.stream_size.get()
        };

        Some(DirectoryEntry {
            name,
            kind: EntryKind::from(raw.entry_type),
            start_sector: raw.start_sector.get(),
            size,
        })
    }

    /// Read the MiniFAT and the mini stream if the root entry carries one.
    fn load_mini_stream(&mut self, num_minifat_sectors: u32) {
        let Some(root) = self.entries.iter().find(|e| e.kind == EntryKind::Root) else {
            return;
        };
        if root.size == 0 || root.start_sector > MAXREGSECT {
            return;
        }
        let (root_start, root_size) = (root.start_sector, root.size);

        let minifat_limit = match num_minifat_sectors {
            0 => None,
            n => (n as usize).checked_mul(self.sector_size),
        };
        let minifat_bytes = self.read_chain(self.first_minifat_sector, minifat_limit);
        self.minifat = u32_words(&minifat_bytes).collect();
        self.mini_stream = self.read_chain(root_start, Some(clamp_size(root_size)));
    }

    /// Bytes of one regular sector.
    ///
    /// The last sector of a truncated file may come back short; a sector that
    /// starts past the end of the buffer is `None`.
    fn sector(&self, sector_id: u32) -> Option<&'a [u8]> {
        if sector_id > MAXREGSECT {
            return None;
        }
        let start = (sector_id as usize)
            .checked_add(1)?
            .checked_mul(self.sector_size)?;
        if start >= self.data.len() {
            return None;
        }
        let end = start.saturating_add(self.sector_size).min(self.data.len());
        self.data.get(start..end)
    }

    #[inline]
    fn next_sector(&self, sector_id: u32) -> u32 {
        self.fat.get(sector_id as usize).copied().unwrap_or(ENDOFCHAIN)
    }

    /// Follow a FAT chain until end-of-chain, a bad reference or the
    /// iteration cap. At most `limit` bytes are returned.
    fn read_chain(&self, start_sector: u32, limit: Option<usize>) -> Vec<u8> {
        // A chain that visits each sector once never outgrows the file
        let limit = limit.map_or(self.data.len(), |limit| limit.min(self.data.len()));
        let mut data = Vec::new();
        let mut sector_id = start_sector;

        for _ in 0..MAX_CHAIN_STEPS {
            if sector_id > MAXREGSECT || data.len() >= limit {
                break;
            }
            let Some(sector) = self.sector(sector_id) else {
                debug!(sector_id, "stream sector out of range");
                break;
            };
            data.extend_from_slice(sector);
            sector_id = self.next_sector(sector_id);
        }

        data.truncate(limit);
        data
    }

    /// Follow a MiniFAT chain through the mini stream.
    fn read_mini_chain(&self, start_sector: u32, limit: usize) -> Vec<u8> {
        let limit = limit.min(self.mini_stream.len());
        let mut data = Vec::new();
        let mut sector_id = start_sector;

        for _ in 0..MAX_CHAIN_STEPS {
            if sector_id > MAXREGSECT || data.len() >= limit {
                break;
            }
            let start = (sector_id as usize).saturating_mul(self.mini_sector_size);
            if start >= self.mini_stream.len() {
                debug!(sector_id, "mini sector out of range");
                break;
            }
            let end = start
                .saturating_add(self.mini_sector_size)
                .min(self.mini_stream.len());
            data.extend_from_slice(&self.mini_stream[start..end]);
            sector_id = self
                .minifat
                .get(sector_id as usize)
                .copied()
                .unwrap_or(ENDOFCHAIN);
        }

        data.truncate(limit);
        data
    }

    /// Find a stream entry by exact name.
    ///
    /// Storages and the root entry never match.
    pub fn find_entry(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.kind == EntryKind::Stream && entry.name == name)
    }

    /// Resolve the bytes of an entry.
    ///
    /// Streams below the mini stream cutoff are read from the mini stream
    /// when one exists. References that leave the file truncate the result.
    pub fn read_stream(&self, entry: &DirectoryEntry) -> Vec<u8> {
        let size = clamp_size(entry.size);
        if size == 0 {
            return Vec::new();
        }

        let in_mini_stream = entry.kind != EntryKind::Root
            && entry.size < u64::from(self.mini_stream_cutoff)
            && !self.mini_stream.is_empty();

        let data = if in_mini_stream {
            self.read_mini_chain(entry.start_sector, size)
        } else {
            self.read_chain(entry.start_sector, Some(size))
        };
        if data.len() < size {
            debug!(name = %entry.name, expected = size, got = data.len(), "stream truncated");
        }
        data
    }

    /// All directory slots in SID order, empty ones included.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Sector size in bytes.
    pub fn sector_size(&self) -> usize {
        self.sector_size
    }
}

#[inline]
fn clamp_size(size: u64) -> usize {
    usize::try_from(size).unwrap_or(usize::MAX)
}

/// Check if a buffer is an OLE file by checking the header size and magic bytes
pub fn is_cfb(data: &[u8]) -> bool {
    data.len() >= HEADER_SIZE && &data[0..8] == MAGIC
}

#[cfg(test)]
mod tests {
    use super::super::writer::{
        CompoundFileWriter, HeaderLayout, encode_directory_entry, encode_header,
    };
    use super::*;
    use proptest::prelude::*;

    /// Lay out a header followed by raw 512-byte sectors.
    fn raw_image(layout: HeaderLayout, sectors: &[Vec<u8>]) -> Vec<u8> {
        let mut image = encode_header(&layout);
        for sector in sectors {
            let mut sector = sector.clone();
            sector.resize(512, 0);
            image.extend_from_slice(&sector);
        }
        image
    }

    fn fat_sector(entries: &[u32]) -> Vec<u8> {
        let mut fat = entries.to_vec();
        fat.resize(128, FREESECT);
        fat.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn dir_sector(entries: &[[u8; DIRENTRY_SIZE]]) -> Vec<u8> {
        entries.iter().flatten().copied().collect()
    }

    fn layout(first_dir_sector: u32, difat: Vec<u32>) -> HeaderLayout {
        HeaderLayout {
            num_fat_sectors: difat.len() as u32,
            first_dir_sector,
            first_minifat_sector: ENDOFCHAIN,
            num_minifat_sectors: 0,
            first_difat_sector: ENDOFCHAIN,
            num_difat_sectors: 0,
            difat,
        }
    }

    #[test]
    fn test_rejects_short_buffer() {
        assert!(CompoundFile::parse(&[0u8; 10]).is_none());
        let mut data = vec![0u8; 511];
        data[0..8].copy_from_slice(MAGIC);
        assert!(CompoundFile::parse(&data).is_none());
    }

    #[test]
    fn test_rejects_bad_sector_shift() {
        let mut image = CompoundFileWriter::new().finish().unwrap();
        image[OFFSET_SECTOR_SHIFT] = 40;
        assert!(CompoundFile::parse(&image).is_none());
    }

    #[test]
    fn test_regular_and_mini_streams() {
        let big: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let mut writer = CompoundFileWriter::new();
        writer.add_stream("Big", big.clone());
        writer.add_stream("Small", b"tiny stream".to_vec());
        let image = writer.finish().unwrap();

        let cfb = CompoundFile::parse(&image).unwrap();
        assert_eq!(cfb.sector_size(), 512);
        let big_entry = cfb.find_entry("Big").unwrap();
        assert_eq!(cfb.read_stream(big_entry), big);
        let small_entry = cfb.find_entry("Small").unwrap();
        assert_eq!(cfb.read_stream(small_entry), b"tiny stream");
    }

    #[test]
    fn test_small_stream_without_mini_stream() {
        let mut writer = CompoundFileWriter::new().with_mini_stream(false);
        writer.add_stream("Small", b"in a regular sector".to_vec());
        let image = writer.finish().unwrap();

        let cfb = CompoundFile::parse(&image).unwrap();
        let entry = cfb.find_entry("Small").unwrap();
        assert_eq!(cfb.read_stream(entry), b"in a regular sector");
    }

    #[test]
    fn test_find_entry_only_matches_streams() {
        let mut writer = CompoundFileWriter::new();
        writer.add_stream("Data", b"x".to_vec());
        let image = writer.finish().unwrap();

        let cfb = CompoundFile::parse(&image).unwrap();
        assert!(cfb.find_entry("Root Entry").is_none());
        assert!(cfb.find_entry("data").is_none());
        assert!(cfb.find_entry("Data").is_some());
        assert_eq!(cfb.entries()[0].kind, EntryKind::Root);
    }

    #[test]
    fn test_chained_difat_sector() {
        // Sector 0: DIFAT naming FAT sector 1; sector 1: FAT; sector 2: directory;
        // sector 3: stream data
        let mut difat = vec![1u32];
        difat.resize(127, FREESECT);
        difat.push(ENDOFCHAIN);
        let difat_sector: Vec<u8> = difat.iter().flat_map(|v| v.to_le_bytes()).collect();

        let fat = fat_sector(&[DIFSECT, FATSECT, ENDOFCHAIN, ENDOFCHAIN]);
        let dir = dir_sector(&[
            encode_directory_entry("Root Entry", STGTY_ROOT, NOSTREAM, 1, ENDOFCHAIN, 0),
            encode_directory_entry("Payload", STGTY_STREAM, NOSTREAM, NOSTREAM, 3, 4096),
        ]);
        let mut header = layout(2, Vec::new());
        header.first_difat_sector = 0;
        header.num_difat_sectors = 1;
        let mut payload = vec![b'p'; 512];
        payload[0] = b'P';
        let image = raw_image(header, &[difat_sector, fat, dir, payload]);

        let cfb = CompoundFile::parse(&image).unwrap();
        let entry = cfb.find_entry("Payload").unwrap();
        // Only one data sector exists, so the 4096-byte stream is truncated
        let data = cfb.read_stream(entry);
        assert_eq!(data.len(), 512);
        assert_eq!(data[0], b'P');
    }

    #[test]
    fn test_self_referencing_stream_chain_terminates() {
        // Sector 0: FAT, sector 1: directory, sector 2 points at itself
        let fat = fat_sector(&[FATSECT, ENDOFCHAIN, 2]);
        let dir = dir_sector(&[
            encode_directory_entry("Root Entry", STGTY_ROOT, NOSTREAM, 1, ENDOFCHAIN, 0),
            encode_directory_entry("Loop", STGTY_STREAM, NOSTREAM, NOSTREAM, 2, 10_000),
        ]);
        let image = raw_image(layout(1, vec![0]), &[fat, dir, vec![b'A'; 512]]);

        let cfb = CompoundFile::parse(&image).unwrap();
        let entry = cfb.find_entry("Loop").unwrap();
        let data = cfb.read_stream(entry);
        assert!(data.len() <= 10_000);
        assert!(data.iter().all(|&b| b == b'A'));
    }

    #[test]
    fn test_self_referencing_directory_chain_terminates() {
        let fat = fat_sector(&[FATSECT, 1]);
        let dir = dir_sector(&[encode_directory_entry(
            "Root Entry",
            STGTY_ROOT,
            NOSTREAM,
            NOSTREAM,
            ENDOFCHAIN,
            0,
        )]);
        let image = raw_image(layout(1, vec![0]), &[fat, dir]);

        let cfb = CompoundFile::parse(&image).unwrap();
        assert_eq!(cfb.entries().len(), MAX_DIRECTORY_SECTORS * 4);
    }

    #[test]
    fn test_out_of_range_start_sector_yields_empty_stream() {
        let fat = fat_sector(&[FATSECT, ENDOFCHAIN]);
        let dir = dir_sector(&[
            encode_directory_entry("Root Entry", STGTY_ROOT, NOSTREAM, 1, ENDOFCHAIN, 0),
            encode_directory_entry("Gone", STGTY_STREAM, NOSTREAM, NOSTREAM, 9_999, 8192),
        ]);
        let image = raw_image(layout(1, vec![0]), &[fat, dir]);

        let cfb = CompoundFile::parse(&image).unwrap();
        let entry = cfb.find_entry("Gone").unwrap();
        assert!(cfb.read_stream(entry).is_empty());
    }

    proptest! {
        #[test]
        fn prop_non_signature_buffers_are_rejected(
            data in prop::collection::vec(any::<u8>(), 0..2048),
        ) {
            prop_assume!(data.len() < 8 || &data[0..8] != MAGIC);
            prop_assert!(CompoundFile::parse(&data).is_none());
        }

        #[test]
        fn prop_garbage_after_signature_never_panics(
            tail in prop::collection::vec(any::<u8>(), 504..3000),
        ) {
            let mut data = MAGIC.to_vec();
            data.extend_from_slice(&tail);
            if let Some(cfb) = CompoundFile::parse(&data) {
                for entry in cfb.entries() {
                    let _ = cfb.read_stream(entry);
                }
            }
        }
    }
}
