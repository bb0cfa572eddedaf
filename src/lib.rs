//! Sumi-Sitemap: a concurrent single-host sitemap generator
//!
//! This crate crawls every page reachable from a root URL on the same host,
//! using a bounded pool of rate-limited workers, and returns the discovered
//! URLs in discovery order.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Sumi-Sitemap operations
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to fetch {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("unreadable page body at {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("crawl did not finish within {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("bad root URL: {0}")]
    UrlError(#[from] UrlError),

    #[error("malformed URL: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client setup failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("could not write sitemap: {0}")]
    Output(#[from] output::OutputError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("crawl pipeline closed unexpectedly: {0}")]
    ChannelClosed(&'static str),
}

/// Problems with the configuration file or crawl options
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Validation(String),

    #[error("bad URL in config: {0}")]
    InvalidUrl(String),
}

/// Problems with the root URL
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("cannot parse {0}")]
    Parse(String),

    #[error("unsupported scheme: {0}")]
    InvalidScheme(String),

    #[error("URL has no host")]
    MissingDomain,
}

/// Result type alias for Sumi-Sitemap operations
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Result of configuration loading and validation
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result of root URL parsing
pub type UrlResult<T> = std::result::Result<T, UrlError>;

pub use config::Config;
pub use crawler::{generate, generate_with_stats, CrawlOptions};
pub use output::Sitemap;
pub use url::{canonicalize, parse_root_url, CanonicalUrl};
