//! Heuristic text recovery for DOC files whose structure cannot be used.
//!
//! When the container, the FIB or the piece table is damaged (or the input is
//! not a container at all) the text is still usually present as long runs of
//! printable characters. This module scans for such runs, first as UTF-16LE
//! and then as single bytes. Runs shorter than the configured minimum are
//! treated as noise; the scan can still pick up text-shaped binary data.

use crate::config::FallbackOptions;
use tracing::debug;

/// Separator between recovered runs
const RUN_SEPARATOR: &str = "\n\n";

/// Recover text from `bytes` without any structural information.
///
/// The UTF-16LE scan runs first; the single-byte scan only runs when it
/// found nothing. Runs are trimmed, filtered by length and joined by a blank
/// line.
///
/// # Examples
///
/// ```rust
/// use doclift::FallbackOptions;
/// use doclift::ole::doc::fallback::extract_doc_text_fallback;
///
/// let sentence = "The quick brown fox jumps over the lazy dog again and again.";
/// let mut bytes = vec![0u8, 0, 1, 0];
/// bytes.extend(sentence.encode_utf16().flat_map(|u| u.to_le_bytes()));
///
/// let text = extract_doc_text_fallback(&bytes, &FallbackOptions::default());
/// assert_eq!(text, sentence);
/// ```
pub fn extract_doc_text_fallback(bytes: &[u8], options: &FallbackOptions) -> String {
    let runs = utf16_runs(bytes, options.min_utf16_run);
    if !runs.is_empty() {
        debug!(runs = runs.len(), "recovered UTF-16 runs");
        return runs.join(RUN_SEPARATOR);
    }

    let runs = ascii_runs(bytes, options.min_ascii_run);
    debug!(runs = runs.len(), "recovered single-byte runs");
    runs.join(RUN_SEPARATOR)
}

#[inline]
fn is_printable_unit(unit: u16) -> bool {
    matches!(unit, 0x09 | 0x0A | 0x0D) || (unit >= 0x20 && unit != 0xFFFE && unit != 0xFFFF)
}

#[inline]
fn is_printable_byte(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x0A | 0x0D | 0x20..=0x7E)
}

/// Collect printable UTF-16LE runs aligned on even offsets.
fn utf16_runs(bytes: &[u8], min_units: usize) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current: Vec<u16> = Vec::new();

    for pair in bytes.chunks_exact(2) {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        if is_printable_unit(unit) {
            current.push(unit);
        } else {
            push_utf16_run(&mut runs, &current, min_units);
            current.clear();
        }
    }
    push_utf16_run(&mut runs, &current, min_units);
    runs
}

fn push_utf16_run(runs: &mut Vec<String>, units: &[u16], min_units: usize) {
    if units.len() < min_units {
        return;
    }
    let text = String::from_utf16_lossy(units);
    let trimmed = text.trim();
    if trimmed.encode_utf16().count() >= min_units {
        runs.push(trimmed.to_string());
    }
}

/// Collect printable ASCII runs.
fn ascii_runs(bytes: &[u8], min_bytes: usize) -> Vec<String> {
    bytes
        .split(|&b| !is_printable_byte(b))
        .filter(|run| run.len() >= min_bytes)
        .filter_map(|run| {
            // Only printable ASCII reaches here
            let trimmed = std::str::from_utf8(run).ok()?.trim();
            (trimmed.len() >= min_bytes).then(|| trimmed.to_string())
        })
        .collect()
}
