//! Scheduler pairing the frontier with the concurrency limiter
//!
//! A worker first takes a permit from the global semaphore and then pulls
//! one frontier item. The permit travels inside the returned
//! [`ScheduledFetch`] and is released when that value is dropped, whichever
//! way the worker leaves the iteration.

use crate::crawler::frontier::{Frontier, FrontierItem};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A URL ready to be processed, holding one concurrency permit
#[derive(Debug)]
pub struct ScheduledFetch {
    /// The URL to fetch
    pub url: String,

    /// The semaphore permit for this fetch
    _permit: OwnedSemaphorePermit,
}

/// Hands frontier items to workers under a concurrency cap
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    limiter: Arc<Semaphore>,

    /// Queue of URLs to crawl
    frontier: Arc<Frontier>,

    /// Total permits
    max_concurrent: usize,
}

impl Scheduler {
    /// Creates a scheduler over `frontier` allowing `max_concurrent` fetches
    pub fn new(frontier: Arc<Frontier>, max_concurrent: usize) -> Self {
        Self {
            limiter: Arc::new(Semaphore::new(max_concurrent)),
            frontier,
            max_concurrent,
        }
    }

    /// Gets the next URL to fetch
    ///
    /// Waits for a permit, then for a frontier item.
    ///
    /// # Returns
    ///
    /// * `Some(ScheduledFetch)` - A URL with its permit
    /// * `None` - A STOP item was received; the caller should exit
    pub async fn next(&self) -> Option<ScheduledFetch> {
        let permit = self.limiter.clone().acquire_owned().await.ok()?;

        match self.frontier.dequeue().await {
            FrontierItem::Url(url) => Some(ScheduledFetch {
                url,
                _permit: permit,
            }),
            FrontierItem::Stop => None,
        }
    }

    /// Permits currently available
    pub fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Permits currently held by workers
    pub fn permits_in_use(&self) -> usize {
        self.max_concurrent
            .saturating_sub(self.limiter.available_permits())
    }

    /// Total number of permits
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}
