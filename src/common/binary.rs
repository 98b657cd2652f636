//! Little-endian reads over untrusted byte slices.
//!
//! Every reader returns `None` instead of panicking when the requested range
//! does not fit, so the structural decoders can bail out with `?`.

use zerocopy::{FromBytes, LE, U16, U32};

/// Read a little-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use doclift::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0), Some(0x1234));
/// assert_eq!(read_u16_le(&data, 2), Some(0x5678));
/// assert_eq!(read_u16_le(&data, 3), None);
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    U16::<LE>::read_from_bytes(data.get(offset..end)?)
        .ok()
        .map(|v| v.get())
}

/// Read a little-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use doclift::common::binary::read_u32_le;
/// let data = [0x78, 0x56, 0x34, 0x12];
/// assert_eq!(read_u32_le(&data, 0), Some(0x12345678));
/// assert_eq!(read_u32_le(&data, 1), None);
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    U32::<LE>::read_from_bytes(data.get(offset..end)?)
        .ok()
        .map(|v| v.get())
}

/// Iterate a byte slice as consecutive little-endian u32 values.
///
/// A trailing partial word is ignored.
#[inline]
pub fn u32_words(data: &[u8]) -> impl Iterator<Item = u32> + '_ {
    data.chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}
