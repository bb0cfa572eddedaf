//! Configuration module for Sumi-Sitemap
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Command-line flags override values loaded here.
//!
//! # Example
//!
//! ```no_run
//! use sumi_sitemap::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitemap.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, OutputFormat, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, MAX_RATE, MAX_WORKERS};
pub(crate) use validation::validate_user_agent_config;
