//! HTML and PDF text extraction.
//!
//! The pipeline only ever consumes plain text and `(text, href)` anchor pairs;
//! this module is the single place that knows about DOMs and PDF streams.

use crate::http::FetchError;
use scraper::{Html, Node, Selector};

/// A hyperlink as found in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Whitespace-collapsed link text.
    pub text: String,
    pub href: Option<String>,
}

/// All anchors in document order.
pub fn anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a").unwrap();
    document
        .select(&anchor_selector)
        .map(|a| Anchor {
            text: a.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" "),
            href: a.value().attr("href").map(str::to_string),
        })
        .collect()
}

/// Visible text fragments in document order, one per text node.
///
/// `script` and `style` contents are skipped, empty fragments dropped.
pub fn text_lines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let Node::Text(text) = node.value() else {
                return None;
            };
            let hidden = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name()))
                .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
            if hidden {
                return None;
            }
            let line = text.trim();
            (!line.is_empty()).then(|| line.to_string())
        })
        .collect()
}

/// Visible page text joined into a single string.
pub fn page_text(html: &str) -> String {
    text_lines(html).join("\n")
}

/// Extract text from a PDF held in memory, keeping the first `max_chars`
/// characters.
///
/// # Errors
///
/// [`FetchError::Pdf`] when the bytes are not a readable PDF.
pub fn pdf_text(bytes: &[u8], max_chars: usize) -> Result<String, FetchError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| FetchError::Pdf(e.to_string()))?;
    Ok(text.chars().take(max_chars).collect())
}
