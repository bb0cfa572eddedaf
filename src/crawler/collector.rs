//! Collector: dedup, result accumulation and termination detection
//!
//! The collector is the only owner of the visited set and the sitemap. It
//! drains discovery events from the workers, re-injects novel URLs into the
//! scheduler, and closes the scheduler input once the outstanding-work
//! counter drains to zero.

use crate::crawler::counter::WorkCounter;
use crate::crawler::extractor::Discovery;
use crate::crawler::visited::VisitedSet;
use crate::output::{CrawlStats, Sitemap};
use crate::url::CanonicalUrl;
use crate::{Result, SitemapError};
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

/// Drains discovery events until the crawl completes
///
/// The root is recorded and scheduled before the first event is read.
///
/// # Arguments
///
/// * `root` - The canonical root URL
/// * `discoveries` - Events emitted by the worker pool
/// * `to_crawl` - Scheduler input; dropped once no work is outstanding
/// * `counter` - Outstanding-work counter shared with the workers
/// * `stats` - Live crawl statistics
///
/// # Returns
///
/// * `Ok(Sitemap)` - Every reachable URL, in discovery order
/// * `Err(SitemapError)` - The first fatal error reported by a worker
pub async fn collect(
    root: CanonicalUrl,
    mut discoveries: mpsc::Receiver<Discovery>,
    to_crawl: mpsc::Sender<Url>,
    counter: Arc<WorkCounter>,
    stats: &CrawlStats,
) -> Result<Sitemap> {
    let mut visited = VisitedSet::new();
    let mut sitemap = Sitemap::new();

    visited.insert(root.as_str().to_string());
    sitemap.push(root.as_str().to_string());
    stats.record_unique();

    counter.add(1);
    if to_crawl.send(root.as_url().clone()).await.is_err() {
        return Err(first_failure(&mut discoveries, "scheduler input").await);
    }

    // Created after the root's unit is added so it cannot fire early
    let drained = counter.wait_for_zero();
    tokio::pin!(drained);
    let mut to_crawl = Some(to_crawl);

    loop {
        tokio::select! {
            _ = &mut drained, if to_crawl.is_some() => {
                tracing::debug!("No outstanding work, closing scheduler input");
                to_crawl = None;
            }

            event = discoveries.recv() => match event {
                Some(Discovery::Link(link)) => {
                    if visited.contains(link.as_str()) {
                        counter.done();
                        stats.record_duplicate();
                        continue;
                    }

                    visited.insert(link.as_str().to_string());
                    sitemap.push(link.as_str().to_string());
                    stats.record_unique();
                    tracing::debug!("Discovered {}", link);

                    let handed_off = match to_crawl.as_ref() {
                        Some(sender) => sender.send(link.into_url()).await.is_ok(),
                        None => false,
                    };
                    if !handed_off {
                        return Err(first_failure(&mut discoveries, "scheduler input").await);
                    }
                }
                Some(Discovery::Failed(e)) => {
                    tracing::error!("Aborting crawl: {}", e);
                    return Err(e);
                }
                None if to_crawl.is_none() => break,
                None => return Err(SitemapError::ChannelClosed("discovery stream")),
            },
        }
    }

    tracing::info!("Crawl complete: {} URLs", sitemap.len());
    Ok(sitemap)
}

/// Explains why the scheduler stopped accepting URLs
///
/// The scheduler only goes away early once every worker has exited, and a
/// worker that exits on an error reports it first. Remaining events are
/// drained until that report shows up; `ChannelClosed` is returned only if
/// the stream ends without one.
async fn first_failure(
    discoveries: &mut mpsc::Receiver<Discovery>,
    closed: &'static str,
) -> SitemapError {
    while let Some(event) = discoveries.recv().await {
        if let Discovery::Failed(e) = event {
            tracing::error!("Aborting crawl: {}", e);
            return e;
        }
    }

    SitemapError::ChannelClosed(closed)
}
