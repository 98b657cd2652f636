//! Cleanup of Word's in-text control characters.
//!
//! Word keeps structure markers inline with the text: paragraph marks, page
//! breaks, table cell marks, object anchors and field delimiters. A field
//! looks like `0x13 instruction 0x14 result 0x15`; only the result is what
//! the reader sees.

/// Field begin mark
const FIELD_BEGIN: char = '\u{13}';
/// Field separator between instruction and result
const FIELD_SEPARATOR: char = '\u{14}';
/// Field end mark
const FIELD_END: char = '\u{15}';

/// Turn raw document text into plain text.
///
/// - field instructions are dropped and field results kept; nested fields
///   inside an instruction stay hidden
/// - `0x0D` paragraph marks and `0x0B` line breaks become `\n`
/// - `0x0C` page/section breaks become a blank line
/// - `0x07` cell and row marks become `\t`
/// - object anchors (`0x01`, `0x08`) and every other control character
///   except tab and newline (`0x1E` included) are removed
///
/// Runs of three or more newlines are collapsed to two and the result is
/// trimmed.
pub fn clean_doc_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // One entry per open field: true while still in its instruction part
    let mut fields: Vec<bool> = Vec::new();

    for ch in text.chars() {
        match ch {
            FIELD_BEGIN => {
                fields.push(true);
                continue;
            },
            FIELD_SEPARATOR => {
                if let Some(in_instruction) = fields.last_mut() {
                    *in_instruction = false;
                }
                continue;
            },
            FIELD_END => {
                fields.pop();
                continue;
            },
            _ => {},
        }

        if fields.iter().any(|&in_instruction| in_instruction) {
            continue;
        }

        match ch {
            '\r' | '\u{0B}' => out.push('\n'),
            '\u{0C}' => out.push_str("\n\n"),
            '\u{07}' => out.push('\t'),
            '\t' | '\n' => out.push(ch),
            c if (c as u32) < 0x20 => {},
            c => out.push(c),
        }
    }

    collapse_newlines(&out).trim().to_string()
}

/// Collapse every run of three or more `\n` to exactly two.
fn collapse_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            run += 1;
            if run > 2 {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(ch);
    }
    out
}
