//! Worker pool that fetches pages and emits discovered links
//!
//! Each worker pulls one URL at a time from the scheduler, fetches it,
//! extracts the same-host links and sends them to the collector as
//! [`Discovery`] events. Workers pace themselves independently.

use crate::crawler::counter::WorkCounter;
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::parser::{parse_links, Link};
use crate::output::CrawlStats;
use crate::url::{canonicalize, same_host, CanonicalUrl};
use crate::SitemapError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Event sent from a worker to the collector
#[derive(Debug)]
pub enum Discovery {
    /// A same-host link found on a crawled page
    Link(CanonicalUrl),

    /// A fatal crawl error; the worker that sent it has stopped
    Failed(SitemapError),
}

/// Fixed-size pool of rate-limited fetch workers
pub struct Extractor {
    client: Client,
    counter: Arc<WorkCounter>,
    stats: Arc<CrawlStats>,
    workers: usize,
    period: Duration,
}

impl Extractor {
    /// Creates a new worker pool description
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `counter` - Outstanding-work counter shared with the collector
    /// * `stats` - Live crawl statistics
    /// * `workers` - Number of parallel workers
    /// * `rate` - Maximum requests per second for each worker
    pub fn new(
        client: Client,
        counter: Arc<WorkCounter>,
        stats: Arc<CrawlStats>,
        workers: usize,
        rate: u32,
    ) -> Self {
        Self {
            client,
            counter,
            stats,
            workers,
            period: rate_period(rate),
        }
    }

    /// Spawns the workers and returns the stream of discovery events
    ///
    /// The stream closes once every worker has returned, which happens when
    /// `urls` closes, a worker hits a fatal error, or the crawl is cancelled.
    pub fn extract(
        self,
        cancel: CancellationToken,
        urls: async_channel::Receiver<Url>,
    ) -> mpsc::Receiver<Discovery> {
        let (events, discoveries) = mpsc::channel(1);

        for id in 1..=self.workers {
            let worker = Worker {
                id,
                client: self.client.clone(),
                counter: Arc::clone(&self.counter),
                stats: Arc::clone(&self.stats),
                cancel: cancel.clone(),
                urls: urls.clone(),
                events: events.clone(),
                period: self.period,
            };
            tokio::spawn(worker.run());
        }

        tracing::debug!(
            "Spawned {} workers, one request every {:?} each",
            self.workers,
            self.period
        );

        discoveries
    }
}

/// Time between two requests of one worker
fn rate_period(rate: u32) -> Duration {
    (Duration::from_secs(1) / rate.max(1)).max(Duration::from_nanos(1))
}

struct Worker {
    id: usize,
    client: Client,
    counter: Arc<WorkCounter>,
    stats: Arc<CrawlStats>,
    cancel: CancellationToken,
    urls: async_channel::Receiver<Url>,
    events: mpsc::Sender<Discovery>,
    period: Duration,
}

impl Worker {
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            let url = tokio::select! {
                _ = self.cancel.cancelled() => return,
                next = self.urls.recv() => match next {
                    Ok(url) => url,
                    Err(_) => {
                        tracing::debug!("[Worker {}] No more URLs, exiting", self.id);
                        return;
                    }
                },
            };

            tracing::info!("[Worker {}] Crawling {}", self.id, url);

            let crawled = tokio::select! {
                _ = self.cancel.cancelled() => return,
                crawled = crawl_page(&self.client, &url, &self.stats) => crawled,
            };

            match crawled {
                Ok(links) => {
                    if !self.emit(links).await {
                        return;
                    }
                }
                Err(e) => {
                    tracing::error!("[Worker {}] Failed to crawl {}: {}", self.id, url, e);
                    tokio::select! {
                        _ = self.cancel.cancelled() => {}
                        _ = self.events.send(Discovery::Failed(e)) => {}
                    }
                    return;
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }
        }
    }

    /// Emits a page's links, returning false if the worker should stop
    ///
    /// The whole batch is added to the counter before the first event goes
    /// out, and the page's own unit is retired only after the last one.
    async fn emit(&self, links: Vec<CanonicalUrl>) -> bool {
        self.counter.add(links.len());

        for link in links {
            tokio::select! {
                _ = self.cancel.cancelled() => return false,
                sent = self.events.send(Discovery::Link(link)) => {
                    if sent.is_err() {
                        return false;
                    }
                }
            }
        }

        self.counter.done();
        true
    }
}

/// Fetches a page and returns its same-host links
///
/// A non-2xx response is logged and yields no links. Transport and body
/// decoding failures are returned as errors.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `page_url` - The page to crawl
/// * `stats` - Live crawl statistics
pub async fn crawl_page(
    client: &Client,
    page_url: &Url,
    stats: &CrawlStats,
) -> Result<Vec<CanonicalUrl>, SitemapError> {
    let body = match fetch_page(client, page_url).await? {
        FetchResult::Success {
            final_url, body, ..
        } => {
            if final_url != page_url.as_str() {
                tracing::debug!("{} redirected to {}", page_url, final_url);
            }
            body
        }
        FetchResult::HttpError { status_code } => {
            tracing::warn!("non-2xx status code for {}: {}", page_url, status_code);
            stats.record_non_success();
            return Ok(Vec::new());
        }
    };

    stats.record_page();

    let links = resolve_links(page_url, parse_links(&body));
    stats.record_links(links.len());
    Ok(links)
}

/// Resolves raw anchors against their page and keeps the crawlable ones
///
/// A link survives when it resolves, stays on the page's host, and uses an
/// `http`-family scheme. Survivors are canonicalized.
pub fn resolve_links(page_url: &Url, links: Vec<Link>) -> Vec<CanonicalUrl> {
    links
        .into_iter()
        .filter_map(|link| {
            let resolved = match page_url.join(&link.href) {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::warn!(
                        "Error parsing link href {:?} from {}: {}",
                        link.href,
                        page_url,
                        e
                    );
                    return None;
                }
            };

            let resolved = canonicalize(resolved);
            let target = resolved.as_url();
            let crawlable = same_host(target, page_url) && target.scheme().starts_with("http");

            if !crawlable {
                tracing::trace!("Skipping {} found on {}", resolved, page_url);
            }
            crawlable.then_some(resolved)
        })
        .collect()
}
