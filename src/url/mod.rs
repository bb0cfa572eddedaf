//! URL handling module for Sumi-Sitemap
//!
//! This module provides root URL parsing, URL canonicalization and host
//! matching. A [`CanonicalUrl`] is the identity of a node in the crawl graph.

mod domain;
mod normalize;

use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

// Re-export main functions
pub use domain::{extract_host, same_host};
pub use normalize::{canonicalize, parse_root_url};

/// An absolute URL with its fragment and trailing path slash removed
///
/// Equality and hashing use the canonical string only, so two URLs that
/// canonicalize to the same string are the same crawl node.
#[derive(Debug, Clone)]
pub struct CanonicalUrl {
    url: Url,
    key: String,
}

impl CanonicalUrl {
    pub(crate) fn from_parts(url: Url, key: String) -> Self {
        Self { url, key }
    }

    /// The canonical string form, used as the dedup key and sitemap entry
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The URL to fetch
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    pub fn into_url(self) -> Url {
        self.url
    }
}

impl PartialEq for CanonicalUrl {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CanonicalUrl {}

impl Hash for CanonicalUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}
