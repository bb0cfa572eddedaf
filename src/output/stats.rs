//! Crawl statistics
//!
//! Workers and the collector record events into [`CrawlStats`] while the
//! crawl runs; a [`CrawlStatistics`] snapshot is taken when it finishes.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by every crawl task
#[derive(Debug)]
pub struct CrawlStats {
    started_at: DateTime<Utc>,
    pages_fetched: AtomicU64,
    non_success_pages: AtomicU64,
    links_discovered: AtomicU64,
    duplicate_links: AtomicU64,
    unique_urls: AtomicU64,
}

impl CrawlStats {
    /// Starts a new set of counters, stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            pages_fetched: AtomicU64::new(0),
            non_success_pages: AtomicU64::new(0),
            links_discovered: AtomicU64::new(0),
            duplicate_links: AtomicU64::new(0),
            unique_urls: AtomicU64::new(0),
        }
    }

    /// Records a page fetched with a 2xx status
    pub fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a page that answered with a non-2xx status
    pub fn record_non_success(&self) {
        self.non_success_pages.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the crawlable links found on one page
    pub fn record_links(&self, count: usize) {
        self.links_discovered
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicate_links.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unique(&self) {
        self.unique_urls.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a snapshot, stamping it with the current time as its end
    pub fn snapshot(&self) -> CrawlStatistics {
        CrawlStatistics {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            non_success_pages: self.non_success_pages.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            duplicate_links: self.duplicate_links.load(Ordering::Relaxed),
            unique_urls: self.unique_urls.load(Ordering::Relaxed),
            workers: 0,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Pages fetched with a 2xx status
    pub pages_fetched: u64,

    /// Pages that answered with any other status
    pub non_success_pages: u64,

    /// Same-host links found across all pages, duplicates included
    pub links_discovered: u64,

    /// Links that pointed at an already visited URL
    pub duplicate_links: u64,

    /// URLs in the sitemap
    pub unique_urls: u64,

    /// Size of the worker pool
    pub workers: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlStatistics {
    /// Wall-clock time the crawl took
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Stdout is reserved for the sitemap itself.
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    eprintln!("=== Crawl Statistics ===\n");

    eprintln!("Overview:");
    eprintln!("  Started: {}", stats.started_at.to_rfc3339());
    eprintln!("  Finished: {}", stats.finished_at.to_rfc3339());
    eprintln!(
        "  Duration: {:.1}s",
        stats.duration().num_milliseconds() as f64 / 1000.0
    );
    eprintln!("  Workers: {}", stats.workers);
    eprintln!();

    eprintln!("Pages:");
    eprintln!("  Fetched: {}", stats.pages_fetched);
    eprintln!("  Non-2xx: {}", stats.non_success_pages);
    eprintln!();

    eprintln!("Links:");
    eprintln!("  Discovered: {}", stats.links_discovered);
    eprintln!("  Duplicates: {}", stats.duplicate_links);
    eprintln!("  Unique URLs: {}", stats.unique_urls);
    eprintln!();

    let attempted = stats.pages_fetched + stats.non_success_pages;
    let success_rate = if attempted > 0 {
        (stats.pages_fetched as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    eprintln!(
        "Success Rate: {:.1}% ({} / {} pages returned 2xx)",
        success_rate, stats.pages_fetched, attempted
    );
}
