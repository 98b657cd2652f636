//! HTML escaping for chapter text.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static HTML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build HTML escaper")
});

/// Escape HTML special characters for use in element text or attribute values.
///
/// # Examples
///
/// ```
/// use doclift::common::html::escape_html;
/// assert_eq!(escape_html("a & b"), "a &amp; b");
/// assert_eq!(escape_html("<p class=\"x\">it's</p>"), "&lt;p class=&quot;x&quot;&gt;it&#39;s&lt;/p&gt;");
/// ```
#[inline]
pub fn escape_html(s: &str) -> String {
    HTML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&#39;"])
}
