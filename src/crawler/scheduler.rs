//! Scheduler between the collector and the worker pool
//!
//! This module handles:
//! - Accepting every candidate URL the collector pushes, without blocking it
//! - Handing URLs directly to an idle worker when nothing is queued
//! - Buffering the rest in an unbounded FIFO queue
//! - Closing the worker input once the collector is done and the queue is empty

use crate::crawler::queue::FifoQueue;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Scheduler owns the pending-URL queue and feeds the worker pool
///
/// The scheduler runs as a single task that combines two steps:
/// - accept: receive a candidate from the collector and either hand it
///   straight to a ready worker or enqueue it
/// - drain: offer the head of the queue to the workers
///
/// URLs leave the scheduler in the order they were accepted.
pub struct Scheduler {
    /// Candidate URLs pushed by the collector
    input: mpsc::Receiver<Url>,

    /// URLs handed to the worker pool
    output: async_channel::Sender<Url>,

    /// URLs waiting for a free worker
    queue: FifoQueue<Url>,

    /// Crawl-wide shutdown signal
    cancel: CancellationToken,
}

impl Scheduler {
    /// Creates a new scheduler and the receiver the workers pull from
    ///
    /// # Arguments
    ///
    /// * `cancel` - The crawl-wide cancellation token
    /// * `input` - Candidate URLs pushed by the collector
    ///
    /// # Returns
    ///
    /// The scheduler and the receiving end of its output stream
    pub fn new(
        cancel: CancellationToken,
        input: mpsc::Receiver<Url>,
    ) -> (Self, async_channel::Receiver<Url>) {
        let (output, scheduled) = async_channel::bounded(1);

        let scheduler = Self {
            input,
            output,
            queue: FifoQueue::new(),
            cancel,
        };

        (scheduler, scheduled)
    }

    /// Runs the scheduler until its work is done or the crawl is cancelled
    ///
    /// The output stream closes when this returns, which happens when:
    /// 1. The input is closed and the queue is empty
    /// 2. The crawl is cancelled (queued URLs are abandoned)
    /// 3. Every worker has gone away
    pub async fn run(mut self) {
        let mut input_open = true;

        loop {
            if !input_open && self.queue.is_empty() {
                tracing::debug!("Scheduler input closed and queue drained, closing worker input");
                return;
            }

            let head = self.queue.front().cloned();
            let has_head = head.is_some();

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    tracing::debug!(
                        "Scheduler cancelled with {} URLs still queued",
                        self.queue.len()
                    );
                    return;
                }

                delivered = offer(&self.output, head), if has_head => {
                    if !delivered {
                        tracing::debug!("All workers have exited, scheduler stopping");
                        return;
                    }
                    self.queue.dequeue();
                    tracing::trace!("Dispatched queued URL, {} remaining", self.queue.len());
                }

                received = self.input.recv(), if input_open => match received {
                    Some(url) => self.accept(url),
                    None => {
                        tracing::debug!("Scheduler input closed, {} URLs left to drain", self.queue.len());
                        input_open = false;
                    }
                },
            }
        }
    }

    /// Accepts one candidate URL
    ///
    /// The URL is handed directly to a worker only when nothing is queued
    /// ahead of it, which keeps dispatch in acceptance order.
    fn accept(&mut self, url: Url) {
        if !self.queue.is_empty() {
            self.enqueue(url);
            return;
        }

        match self.output.try_send(url) {
            Ok(()) => tracing::trace!("Handed URL directly to a worker"),
            Err(async_channel::TrySendError::Full(url)) => self.enqueue(url),
            Err(async_channel::TrySendError::Closed(url)) => {
                tracing::debug!("Dropping {}: worker pool has shut down", url);
            }
        }
    }

    fn enqueue(&mut self, url: Url) {
        tracing::trace!("Queueing {}", url);
        self.queue.enqueue(url);
    }

    /// Returns the number of URLs waiting in the queue
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}

/// Offers the queue head to the workers; resolves to false if they are gone
async fn offer(output: &async_channel::Sender<Url>, head: Option<Url>) -> bool {
    match head {
        Some(url) => output.send(url).await.is_ok(),
        None => std::future::pending().await,
    }
}

/// Spawns a scheduler task
///
/// # Arguments
///
/// * `cancel` - The crawl-wide cancellation token
/// * `input` - Candidate URLs pushed by the collector
///
/// # Returns
///
/// The stream of scheduled URLs for the worker pool
pub fn schedule(
    cancel: CancellationToken,
    input: mpsc::Receiver<Url>,
) -> async_channel::Receiver<Url> {
    let (scheduler, scheduled) = Scheduler::new(cancel, input);
    tokio::spawn(scheduler.run());
    scheduled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn create_test_url(n: usize) -> Url {
        Url::parse(&format!("https://example.com/page{}", n)).unwrap()
    }

    async fn drain(scheduled: async_channel::Receiver<Url>) -> Vec<Url> {
        let mut urls = Vec::new();
        while let Ok(url) = scheduled.recv().await {
            urls.push(url);
        }
        urls
    }

    #[test]
    fn test_new_scheduler() {
        let (_tx, rx) = mpsc::channel(1);
        let (scheduler, _scheduled) = Scheduler::new(CancellationToken::new(), rx);
        assert_eq!(scheduler.queue_len(), 0);
    }

    #[tokio::test]
    async fn test_fifo_order_and_close() {
        let (tx, rx) = mpsc::channel(1);
        let scheduled = schedule(CancellationToken::new(), rx);

        for n in 0..5 {
            tx.send(create_test_url(n)).await.unwrap();
        }
        drop(tx);

        let urls = tokio::time::timeout(Duration::from_secs(1), drain(scheduled))
            .await
            .expect("scheduler output should close after input closes");

        let expected: Vec<Url> = (0..5).map(create_test_url).collect();
        assert_eq!(urls, expected);
    }

    #[tokio::test]
    async fn test_push_never_blocks_without_consumers() {
        let (tx, rx) = mpsc::channel(1);
        let _scheduled = schedule(CancellationToken::new(), rx);

        let push_all = async {
            for n in 0..1000 {
                tx.send(create_test_url(n)).await.unwrap();
            }
        };

        tokio::time::timeout(Duration::from_secs(2), push_all)
            .await
            .expect("scheduler should accept every URL even when no worker is pulling");
    }

    #[tokio::test]
    async fn test_interleaved_consumer() {
        let (tx, rx) = mpsc::channel(1);
        let scheduled = schedule(CancellationToken::new(), rx);

        let consumer = tokio::spawn(drain(scheduled));

        for n in 0..50 {
            tx.send(create_test_url(n)).await.unwrap();
            if n % 7 == 0 {
                tokio::task::yield_now().await;
            }
        }
        drop(tx);

        let urls = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer should finish")
            .unwrap();

        let expected: Vec<Url> = (0..50).map(create_test_url).collect();
        assert_eq!(urls, expected);
    }

    #[tokio::test]
    async fn test_multiple_consumers_receive_everything_once() {
        let (tx, rx) = mpsc::channel(1);
        let scheduled = schedule(CancellationToken::new(), rx);

        let consumers: Vec<_> = (0..4)
            .map(|_| tokio::spawn(drain(scheduled.clone())))
            .collect();
        drop(scheduled);

        for n in 0..100 {
            tx.send(create_test_url(n)).await.unwrap();
        }
        drop(tx);

        let mut all = Vec::new();
        for consumer in consumers {
            all.extend(consumer.await.unwrap());
        }
        all.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        all.dedup();
        assert_eq!(all.len(), 100);
    }

    #[tokio::test]
    async fn test_cancel_closes_output() {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(1);
        let scheduled = schedule(cancel.clone(), rx);

        for n in 0..10 {
            tx.send(create_test_url(n)).await.unwrap();
        }

        cancel.cancel();

        let urls = tokio::time::timeout(Duration::from_secs(1), drain(scheduled))
            .await
            .expect("cancelled scheduler should close its output");

        // At most the URL already sitting in the handoff slot gets through
        assert!(urls.len() <= 1);
    }
}
