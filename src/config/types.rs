use serde::Deserialize;

/// Main configuration structure for Sumi-Sitemap
///
/// Every section is optional in the TOML file and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of parallel fetch workers
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Maximum requests per second for each worker
    #[serde(default = "default_rate")]
    pub rate: u32,

    /// Overall deadline for the crawl (seconds)
    #[serde(default, rename = "timeout-secs")]
    pub timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            rate: default_rate(),
            timeout_secs: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(default = "default_crawler_name", rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(default = "default_crawler_version", rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(default, rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Output format for the sitemap
    #[serde(default)]
    pub format: OutputFormat,

    /// File to write the sitemap to (stdout when absent)
    #[serde(default)]
    pub path: Option<String>,
}

/// Sitemap output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// sitemaps.org XML document
    #[default]
    Xml,
    /// One URL per line
    Text,
}

fn default_workers() -> u32 {
    16
}

fn default_rate() -> u32 {
    1
}

fn default_crawler_name() -> String {
    "SumiSitemap".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
