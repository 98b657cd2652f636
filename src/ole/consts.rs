/// Magic bytes that should be at the beginning of every OLE file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Size of the fixed header; anything shorter cannot be a compound file
pub const HEADER_SIZE: usize = 512;

/// Size of a directory entry in bytes
pub const DIRENTRY_SIZE: usize = 128;

/// Number of DIFAT slots stored inline in the header
pub const HEADER_DIFAT_SLOTS: usize = 109;

// Header field offsets
pub const OFFSET_SECTOR_SHIFT: usize = 0x1E;
pub const OFFSET_MINI_SECTOR_SHIFT: usize = 0x20;
pub const OFFSET_NUM_FAT_SECTORS: usize = 0x2C;
pub const OFFSET_FIRST_DIR_SECTOR: usize = 0x30;
pub const OFFSET_MINI_STREAM_CUTOFF: usize = 0x38;
pub const OFFSET_FIRST_MINIFAT_SECTOR: usize = 0x3C;
pub const OFFSET_NUM_MINIFAT_SECTORS: usize = 0x40;
pub const OFFSET_FIRST_DIFAT_SECTOR: usize = 0x44;
pub const OFFSET_NUM_DIFAT_SECTORS: usize = 0x48;
pub const OFFSET_HEADER_DIFAT: usize = 0x4C;

// Sector IDs (from AAF specifications)
/// Maximum regular sector ID
pub const MAXREGSECT: u32 = 0xFFFFFFFA; // -6
/// Denotes a DIFAT sector in a FAT
pub const DIFSECT: u32 = 0xFFFFFFFC; // -4
/// Denotes a FAT sector in a FAT
pub const FATSECT: u32 = 0xFFFFFFFD; // -3
/// End of a virtual stream chain
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE; // -2
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFFFFFF; // -1

/// Unallocated directory entry
pub const NOSTREAM: u32 = 0xFFFFFFFF; // -1

// Object types in storage (from AAF specifications)
/// Empty directory entry
pub const STGTY_EMPTY: u8 = 0;
/// Element is a storage object
pub const STGTY_STORAGE: u8 = 1;
/// Element is a stream object
pub const STGTY_STREAM: u8 = 2;
/// Element is a root storage
pub const STGTY_ROOT: u8 = 5;

// Iteration caps. Every chain walk stops after this many steps so that
// cyclic FAT/DIFAT references cannot hang a call.
/// Maximum number of chained DIFAT sectors followed
pub const MAX_DIFAT_SECTORS: usize = 1_000;
/// Maximum number of directory sectors followed
pub const MAX_DIRECTORY_SECTORS: usize = 10_000;
/// Maximum number of sectors followed when resolving a stream
pub const MAX_CHAIN_STEPS: usize = 100_000;

/// Default mini stream cutoff for version 3 files
pub const DEFAULT_MINI_STREAM_CUTOFF: u32 = 4096;
