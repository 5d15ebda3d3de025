//! Crawl frontier: the FIFO of URLs still to visit
//!
//! The frontier is shared by every worker. Besides the queue itself it keeps
//! a count of URLs that were enqueued but not yet marked complete, which is
//! what [`Frontier::join`] waits on. Shutdown pushes one STOP item per worker
//! to the front of the queue.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{Notify, Semaphore};

/// An item handed out by [`Frontier::dequeue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontierItem {
    /// A URL to crawl; must be acknowledged with [`Frontier::task_done`]
    Url(String),

    /// Instructs the receiving worker to exit
    Stop,
}

/// Shared FIFO queue with completion tracking
pub struct Frontier {
    /// Queued items, STOP items at the front once shutdown starts
    queue: Mutex<VecDeque<FrontierItem>>,

    /// One permit per queued item
    items: Semaphore,

    /// URLs enqueued but not yet completed
    pending: AtomicUsize,

    /// Woken when `pending` drops to zero
    drained: Notify,

    /// Set once shutdown has begun
    closed: AtomicBool,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            items: Semaphore::new(0),
            pending: AtomicUsize::new(0),
            drained: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    fn lock_queue(&self) -> MutexGuard<'_, VecDeque<FrontierItem>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a URL to the tail of the queue
    ///
    /// After shutdown has begun this is a no-op.
    ///
    /// # Returns
    ///
    /// * `true` - The URL was queued
    /// * `false` - The frontier is closed
    pub fn enqueue(&self, url: impl Into<String>) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }

        self.pending.fetch_add(1, Ordering::AcqRel);
        self.lock_queue().push_back(FrontierItem::Url(url.into()));
        self.items.add_permits(1);
        true
    }

    /// Takes the next item, waiting while the queue is empty
    ///
    /// Every item is returned to exactly one caller. The call is
    /// cancellation-safe: dropping the future never loses an item.
    pub async fn dequeue(&self) -> FrontierItem {
        loop {
            match self.items.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return FrontierItem::Stop,
            }

            if let Some(item) = self.lock_queue().pop_front() {
                return item;
            }
        }
    }

    /// Marks one dequeued URL as fully processed
    ///
    /// Must be called once per [`FrontierItem::Url`] after any URLs it led to
    /// have been enqueued. Extra calls are ignored.
    pub fn task_done(&self) {
        let previous = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match previous {
            Ok(1) => self.drained.notify_waiters(),
            Ok(_) => {}
            Err(_) => tracing::warn!("task_done called with no pending frontier items"),
        }
    }

    /// Waits until every enqueued URL has been marked complete
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Closes the frontier and delivers one STOP item per worker
    ///
    /// STOP items go to the front of the queue so that waiting workers see
    /// them before any leftover URLs. Only the first call floods.
    ///
    /// # Returns
    ///
    /// * `true` - This call closed the frontier
    /// * `false` - Shutdown had already begun
    pub fn shutdown(&self, workers: usize) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }

        {
            let mut queue = self.lock_queue();
            for _ in 0..workers {
                queue.push_front(FrontierItem::Stop);
            }
        }
        self.items.add_permits(workers);

        tracing::debug!("Frontier closed, {} stop signals queued", workers);
        true
    }

    /// Returns true once shutdown has begun
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of items waiting in the queue (STOP items included)
    pub fn len(&self) -> usize {
        self.lock_queue().len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock_queue().is_empty()
    }

    /// URLs enqueued but not yet completed
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}
