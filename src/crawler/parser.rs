//! HTML link extraction
//!
//! This module turns an HTML document into the anchors it contains, in
//! document order. It does not resolve or filter anything; that is the
//! extractor's job.

use scraper::{Html, Selector};
use std::fmt;

/// An anchor found in an HTML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// The raw `href` attribute (empty if the anchor has none)
    pub href: String,

    /// The anchor's text content, each text node trimmed and concatenated
    pub text: String,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r#"<a href="{}">{}</a>"#, self.href, self.text)
    }
}

/// Parses HTML content and extracts every `<a>` element
///
/// The HTML5 parser recovers from malformed markup, so any text yields a
/// document; a page with no anchors yields an empty list.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
///
/// # Returns
///
/// The anchors in document order
///
/// # Example
///
/// ```
/// use sumi_sitemap::crawler::parse_links;
///
/// let html = r#"<html><body><a href="/page">A <b>link</b></a></body></html>"#;
/// let links = parse_links(html);
/// assert_eq!(links[0].href, "/page");
/// assert_eq!(links[0].text, "Alink");
/// ```
pub fn parse_links(html: &str) -> Vec<Link> {
    let document = Html::parse_document(html);

    let Ok(anchor_selector) = Selector::parse("a") else {
        return Vec::new();
    };

    document
        .select(&anchor_selector)
        .map(|element| Link {
            href: element.value().attr("href").unwrap_or_default().to_string(),
            text: element.text().map(str::trim).collect(),
        })
        .collect()
}
