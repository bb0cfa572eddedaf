//! Crawler module for sitemap generation
//!
//! A crawl is a loop of three concurrent stages:
//! - the scheduler, which buffers candidate URLs in FIFO order
//! - the extractor, a pool of rate-limited workers that fetch pages and
//!   extract same-host links
//! - the collector, which deduplicates links, builds the sitemap and detects
//!   completion through the outstanding-work counter
//!
//! All stages share one cancellation token that fires when the crawl returns.

mod collector;
mod counter;
mod extractor;
mod fetcher;
mod parser;
mod queue;
mod scheduler;
mod visited;

pub use collector::collect;
pub use counter::WorkCounter;
pub use extractor::{crawl_page, resolve_links, Discovery, Extractor};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use parser::{parse_links, Link};
pub use queue::FifoQueue;
pub use scheduler::{schedule, Scheduler};
pub use visited::VisitedSet;

use crate::config::{validate_user_agent_config, Config, CrawlerConfig, UserAgentConfig};
use crate::output::{CrawlStatistics, CrawlStats, Sitemap};
use crate::url::{parse_root_url, CanonicalUrl};
use crate::{ConfigError, Result, SitemapError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Parameters of a single crawl
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Number of parallel fetch workers
    pub workers: usize,

    /// Maximum requests per second for each worker
    pub rate: u32,

    /// Overall deadline; the crawl is cancelled when it expires
    pub timeout: Option<Duration>,

    /// Identification sent with every request
    pub user_agent: UserAgentConfig,
}

impl CrawlOptions {
    pub fn new(workers: usize, rate: u32) -> Self {
        Self {
            workers,
            rate,
            ..Self::default()
        }
    }

    /// Builds options from a loaded configuration file
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.crawler.workers as usize,
            rate: config.crawler.rate,
            timeout: config.crawler.timeout_secs.map(Duration::from_secs),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Checks that the options describe a runnable crawl
    ///
    /// Any positive worker count and rate is accepted; the tighter bounds
    /// of the config file apply only to values loaded through it.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Validation(
                "workers must be at least 1".to_string(),
            ));
        }

        if self.rate == 0 {
            return Err(ConfigError::Validation(
                "rate must be at least 1 request per second".to_string(),
            ));
        }

        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::Validation(
                "timeout must be greater than 0".to_string(),
            ));
        }

        validate_user_agent_config(&self.user_agent)
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        let crawler = CrawlerConfig::default();
        Self {
            workers: crawler.workers as usize,
            rate: crawler.rate,
            timeout: None,
            user_agent: UserAgentConfig::default(),
        }
    }
}

/// Crawls every same-host page reachable from `root`
///
/// # Arguments
///
/// * `root` - The root URL; `http://` is assumed when no scheme is given
/// * `options` - Worker count, rate and optional deadline
///
/// # Returns
///
/// * `Ok(Sitemap)` - Every reachable URL in discovery order
/// * `Err(SitemapError)` - The root did not parse, a fetch failed at the
///   transport level, or the deadline expired
///
/// # Example
///
/// ```no_run
/// use sumi_sitemap::{generate, CrawlOptions};
///
/// # async fn run() -> sumi_sitemap::Result<()> {
/// let sitemap = generate("example.com", &CrawlOptions::new(4, 2)).await?;
/// for url in sitemap.iter() {
///     println!("{}", url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn generate(root: &str, options: &CrawlOptions) -> Result<Sitemap> {
    generate_with_stats(root, options)
        .await
        .map(|(sitemap, _)| sitemap)
}

/// Same as [`generate`], also returning the crawl statistics
pub async fn generate_with_stats(
    root: &str,
    options: &CrawlOptions,
) -> Result<(Sitemap, CrawlStatistics)> {
    options.validate()?;
    let root = parse_root_url(root)?;

    tracing::info!(
        "Crawling {} with {} workers at {} requests/second each",
        root,
        options.workers,
        options.rate
    );

    let stats = Arc::new(CrawlStats::new());
    let crawl = run_crawl(root, options, Arc::clone(&stats));

    let sitemap = match options.timeout {
        Some(limit) => tokio::time::timeout(limit, crawl)
            .await
            .map_err(|_| SitemapError::Timeout { elapsed: limit })??,
        None => crawl.await?,
    };

    let mut statistics = stats.snapshot();
    statistics.workers = options.workers;
    Ok((sitemap, statistics))
}

/// Wires the three stages together and waits for the collector
///
/// Every spawned task is cancelled when this future completes or is dropped.
async fn run_crawl(
    root: CanonicalUrl,
    options: &CrawlOptions,
    stats: Arc<CrawlStats>,
) -> Result<Sitemap> {
    let cancel = CancellationToken::new();
    let _shutdown = cancel.clone().drop_guard();

    let client = build_http_client(&options.user_agent)?;
    let counter = Arc::new(WorkCounter::new());

    let (to_crawl, candidates) = mpsc::channel(1);
    let urls = schedule(cancel.clone(), candidates);

    let discoveries = Extractor::new(
        client,
        Arc::clone(&counter),
        Arc::clone(&stats),
        options.workers,
        options.rate,
    )
    .extract(cancel.clone(), urls);

    collect(root, discoveries, to_crawl, counter, &stats).await
}
