//! Character decoding for the two text encodings a .doc file stores.
//!
//! Word 97+ keeps each run of text either as UTF-16LE or "compressed" as
//! one Windows-1252 byte per character.

use encoding_rs::WINDOWS_1252;

/// Decode UTF-16LE bytes up to the first NUL code unit.
///
/// Used for fixed-width name fields that are NUL padded. A trailing odd
/// byte is ignored and invalid surrogates become U+FFFD.
///
/// # Examples
/// ```
/// use doclift::common::encoding::decode_utf16le;
///
/// assert_eq!(decode_utf16le(b"H\x00i\x00\x00\x00x\x00"), "Hi");
/// ```
#[inline]
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Decode every UTF-16LE code unit in `bytes`, NULs included.
///
/// Returns the decoded text and the number of code units consumed.
#[inline]
pub fn decode_utf16le_units(bytes: &[u8]) -> (String, usize) {
    let units = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]));
    let count = bytes.len() / 2;
    let text = char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    (text, count)
}

/// Decode Windows-1252 bytes, one character per byte.
///
/// `0x80..=0x9F` map to their Windows-1252 code points. The five bytes
/// Windows-1252 leaves undefined, and every other byte, decode to the code
/// point with the same value.
///
/// # Examples
/// ```
/// use doclift::common::encoding::decode_windows_1252;
///
/// assert_eq!(decode_windows_1252(&[0x80, 0x41, 0x93]), "\u{20AC}A\u{201C}");
/// assert_eq!(decode_windows_1252(&[0x81, 0xE9]), "\u{81}\u{E9}");
/// ```
#[inline]
pub fn decode_windows_1252(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf16le() {
        assert_eq!(decode_utf16le(b"H\x00e\x00l\x00l\x00o\x00"), "Hello");
    }

    #[test]
    fn test_decode_utf16le_empty() {
        assert_eq!(decode_utf16le(b""), "");
        assert_eq!(decode_utf16le(b"A"), "");
    }

    #[test]
    fn test_decode_units_keeps_nul_and_counts() {
        let (text, count) = decode_utf16le_units(b"a\x00\x00\x00b\x00\xFF");
        assert_eq!(text, "a\0b");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_decode_units_lone_surrogate() {
        let (text, count) = decode_utf16le_units(&[0x00, 0xD8, 0x41, 0x00]);
        assert_eq!(text, "\u{FFFD}A");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_decode_units_surrogate_pair() {
        // U+1F600 as D83D DE00
        let (text, count) = decode_utf16le_units(&[0x3D, 0xD8, 0x00, 0xDE]);
        assert_eq!(text, "\u{1F600}");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_windows_1252_special_range() {
        assert_eq!(decode_windows_1252(&[0x91, 0x92]), "\u{2018}\u{2019}");
        assert_eq!(decode_windows_1252(&[0x96, 0x97]), "\u{2013}\u{2014}");
        assert_eq!(decode_windows_1252(&[0x8D, 0x8F, 0x90, 0x9D]), "\u{8D}\u{8F}\u{90}\u{9D}");
    }

    #[test]
    fn test_windows_1252_latin1_range() {
        assert_eq!(decode_windows_1252(b"Caf\xE9"), "Caf\u{E9}");
        assert_eq!(decode_windows_1252(&[0x0D, 0x13]), "\r\u{13}");
    }
}
