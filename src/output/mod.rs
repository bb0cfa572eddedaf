//! Output module for the generated sitemap
//!
//! This module handles:
//! - The [`Sitemap`] result type
//! - Rendering it as a sitemaps.org XML document or plain text
//! - Writing the rendered sitemap to stdout or a file
//! - Recording and printing crawl statistics

pub mod stats;
mod xml;

pub use stats::{print_statistics, CrawlStatistics, CrawlStats};
pub use xml::render_xml;

use crate::config::OutputFormat;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Every URL reachable from the root, in discovery order
///
/// Each entry is a canonical URL and appears exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sitemap {
    urls: Vec<String>,
}

impl Sitemap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL; only the collector calls this
    pub(crate) fn push(&mut self, url: String) {
        self.urls.push(url);
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

/// Renders the sitemap as one URL per line
pub fn render_text(sitemap: &Sitemap) -> String {
    let mut text = String::new();
    for url in sitemap.iter() {
        text.push_str(url);
        text.push('\n');
    }
    text
}

/// Renders the sitemap and writes it to a file, or to stdout when no path
/// is given
///
/// # Arguments
///
/// * `sitemap` - The sitemap to write
/// * `format` - XML or plain text
/// * `path` - Destination file; stdout when `None`
pub fn write_sitemap(
    sitemap: &Sitemap,
    format: OutputFormat,
    path: Option<&Path>,
) -> OutputResult<()> {
    let rendered = match format {
        OutputFormat::Xml => render_xml(sitemap)?,
        OutputFormat::Text => render_text(sitemap),
    };

    match path {
        Some(path) => {
            std::fs::write(path, rendered)?;
            tracing::info!("Wrote {} URLs to {}", sitemap.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
