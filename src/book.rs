/// Book representation shared by the document importers.
///
/// Every importer produces the same shape: a title, an author and a list of
/// chapters whose bodies are escaped HTML, so chapter storage and
/// sanitization downstream never need to know the source format.
use crate::common::html::escape_html;
use serde::{Deserialize, Serialize};

/// One chapter of an imported book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Stable chapter identifier (`chapter_1`, `chapter_2`, ...)
    pub id: String,
    /// Chapter title
    pub title: String,
    /// Chapter body as an `<article>` fragment
    pub html: String,
}

/// An imported book.
///
/// # Examples
///
/// ```rust
/// use doclift::ParsedBook;
///
/// let book = ParsedBook::single_chapter("Notes", "", "First line\n\nSecond <line>");
/// assert_eq!(book.chapters.len(), 1);
/// assert_eq!(
///     book.chapters[0].html,
///     "<article><h2>Notes</h2><p>First line</p><p>Second &lt;line&gt;</p></article>"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBook {
    /// Book title
    pub title: String,
    /// Book author, empty when unknown
    pub author: String,
    /// Chapters in reading order
    pub chapters: Vec<Chapter>,
}

impl ParsedBook {
    /// Build a book holding all of `text` as its only chapter.
    pub fn single_chapter(title: impl Into<String>, author: impl Into<String>, text: &str) -> Self {
        let title = title.into();
        let html = render_article(&title, text);
        Self {
            chapters: vec![Chapter {
                id: "chapter_1".to_string(),
                title: title.clone(),
                html,
            }],
            title,
            author: author.into(),
        }
    }
}

/// Render `text` as `<article><h2>title</h2><p>..</p>...</article>`.
///
/// Paragraphs are separated by blank (or whitespace-only) lines. Lines
/// inside a paragraph are trimmed and kept joined by `\n`.
pub fn render_article(title: &str, text: &str) -> String {
    let mut html = String::with_capacity(text.len() + title.len() + 32);
    html.push_str("<article><h2>");
    html.push_str(&escape_html(title));
    html.push_str("</h2>");
    for paragraph in paragraphs(text) {
        html.push_str("<p>");
        html.push_str(&escape_html(&paragraph));
        html.push_str("</p>");
    }
    html.push_str("</article>");
    html
}

/// Split `text` into blank-line separated blocks.
fn paragraphs(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}
