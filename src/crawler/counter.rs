//! Outstanding-work counter used for termination detection
//!
//! The counter holds one unit for every URL that has been scheduled but whose
//! links have not all been accounted for yet. Workers and the collector
//! adjust it concurrently; the collector waits for it to return to zero.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Atomic counter with an async "wait until zero"
#[derive(Debug, Default)]
pub struct WorkCounter {
    outstanding: AtomicUsize,
    zero: Notify,
}

impl WorkCounter {
    /// Creates a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` units of outstanding work
    pub fn add(&self, n: usize) {
        if n > 0 {
            self.outstanding.fetch_add(n, Ordering::SeqCst);
        }
    }

    /// Retires one unit of outstanding work, waking waiters when it hits zero
    pub fn done(&self) {
        let previous =
            self.outstanding
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        match previous {
            Ok(1) => self.zero.notify_waiters(),
            Ok(_) => {}
            Err(_) => tracing::error!("Outstanding-work counter retired below zero"),
        }
    }

    /// Returns the current number of outstanding units
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Waits until the counter reads zero
    ///
    /// Returns immediately if the counter is already zero. Safe to call while
    /// other tasks add and retire work.
    pub async fn wait_for_zero(&self) {
        loop {
            let notified = self.zero.notified();
            tokio::pin!(notified);
            // Register before reading so a concurrent notify_waiters is not missed
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }
}
