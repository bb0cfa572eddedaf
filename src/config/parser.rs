use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads a TOML configuration file, applying defaults and validation
///
/// Missing sections and keys fall back to their defaults, so an empty file
/// is a valid configuration.
///
/// # Arguments
///
/// * `path` - Location of the TOML file
///
/// # Returns
///
/// * `Ok(Config)` - The validated configuration
/// * `Err(ConfigError)` - The file could not be read, parsed or validated
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_sitemap::config::load_config;
///
/// let config = load_config(Path::new("sitemap.toml")).unwrap();
/// println!("Workers: {}", config.crawler.workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Returns the hex-encoded SHA-256 of a configuration file
///
/// The hash is logged at startup so that two runs can be told apart by the
/// configuration they used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    Ok(fingerprint(&content))
}

/// Reads the file once and returns the validated config with its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok((config, fingerprint(content.as_bytes())))
}

fn fingerprint(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}
