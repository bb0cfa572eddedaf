//! XML sitemap rendering (sitemaps.org protocol)

use crate::output::{OutputError, OutputResult, Sitemap};
use quick_xml::se::Serializer;
use serde::Serialize;

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Serialize)]
#[serde(rename = "urlset")]
struct UrlSet<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    url: Vec<UrlEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct UrlEntry<'a> {
    loc: &'a str,
}

/// Renders the sitemap as a `<urlset>` document
///
/// Each URL becomes one `<url><loc>` entry, in discovery order. The output
/// is indented by two spaces and ends with a newline.
pub fn render_xml(sitemap: &Sitemap) -> OutputResult<String> {
    let urlset = UrlSet {
        xmlns: SITEMAP_NAMESPACE,
        url: sitemap.iter().map(|loc| UrlEntry { loc }).collect(),
    };

    let mut body = String::new();
    let mut serializer = Serializer::new(&mut body);
    serializer.indent(' ', 2);
    urlset
        .serialize(serializer)
        .map_err(|e| OutputError::Format(e.to_string()))?;

    Ok(format!("{}\n{}\n", XML_DECLARATION, body))
}
