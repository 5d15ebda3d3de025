//! Crawl registry: visited set, counters, and page budget
//!
//! All state that workers mutate besides the frontier lives here, behind
//! atomic operations. The visited check, the budget reservation and the
//! visited insert happen under one lock in [`CrawlRegistry::admit`], so two
//! workers can never both win the same URL and `pages_crawled` never passes
//! `max_pages`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Outcome of asking to crawl a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The URL is ours; carries the 1-based page number within the budget
    Admitted(usize),

    /// Another worker already took this URL
    AlreadyVisited,

    /// No budget left
    BudgetExhausted,
}

/// Shared per-crawl state
#[derive(Debug)]
pub struct CrawlRegistry {
    visited: Mutex<HashSet<String>>,
    pages_crawled: AtomicUsize,
    products_found: AtomicUsize,
    pages_failed: AtomicUsize,
    pages_timed_out: AtomicUsize,
    max_pages: usize,
    budget_exhausted: AtomicBool,
}

impl CrawlRegistry {
    /// Creates an empty registry with the given page budget
    pub fn new(max_pages: usize) -> Self {
        Self {
            visited: Mutex::new(HashSet::new()),
            pages_crawled: AtomicUsize::new(0),
            products_found: AtomicUsize::new(0),
            pages_failed: AtomicUsize::new(0),
            pages_timed_out: AtomicUsize::new(0),
            max_pages,
            budget_exhausted: AtomicBool::new(false),
        }
    }

    fn lock_visited(&self) -> MutexGuard<'_, HashSet<String>> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true if the URL was already taken
    pub fn is_visited(&self, url: &str) -> bool {
        self.lock_visited().contains(url)
    }

    /// Inserts the URL into the visited set
    ///
    /// # Returns
    ///
    /// * `true` - This call inserted it
    /// * `false` - It was already present
    pub fn try_visit(&self, url: &str) -> bool {
        self.lock_visited().insert(url.to_string())
    }

    /// Reserves one page of budget with a compare-and-increment
    ///
    /// # Returns
    ///
    /// * `Some(n)` - Reserved; `n` is the new `pages_crawled`
    /// * `None` - `pages_crawled` already equals `max_pages`
    pub fn try_reserve_budget(&self) -> Option<usize> {
        self.pages_crawled
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_pages).then_some(n + 1)
            })
            .ok()
            .map(|previous| previous + 1)
    }

    /// Atomically checks, reserves budget for, and marks a URL visited
    ///
    /// A URL that is refused for lack of budget is not marked visited.
    pub fn admit(&self, url: &str) -> Admission {
        let mut visited = self.lock_visited();

        if visited.contains(url) {
            return Admission::AlreadyVisited;
        }

        match self.try_reserve_budget() {
            Some(page_number) => {
                visited.insert(url.to_string());
                Admission::Admitted(page_number)
            }
            None => Admission::BudgetExhausted,
        }
    }

    /// Returns true while new pages may still be crawled
    pub fn has_budget(&self) -> bool {
        !self.is_exhausted() && self.pages_crawled() < self.max_pages
    }

    /// Sets the budget-exhausted flag
    ///
    /// # Returns
    ///
    /// * `true` - This call set it
    /// * `false` - It was already set
    pub fn mark_exhausted(&self) -> bool {
        !self.budget_exhausted.swap(true, Ordering::AcqRel)
    }

    /// Returns true once the budget-exhausted flag is set
    pub fn is_exhausted(&self) -> bool {
        self.budget_exhausted.load(Ordering::Acquire)
    }

    /// Counts a recorded product; returns the new total
    pub fn record_product(&self) -> usize {
        self.products_found.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Counts a page whose render failed
    pub fn record_failure(&self) {
        self.pages_failed.fetch_add(1, Ordering::AcqRel);
    }

    /// Counts a page whose render timed out
    pub fn record_timeout(&self) {
        self.pages_timed_out.fetch_add(1, Ordering::AcqRel);
    }

    pub fn pages_crawled(&self) -> usize {
        self.pages_crawled.load(Ordering::Acquire)
    }

    pub fn products_found(&self) -> usize {
        self.products_found.load(Ordering::Acquire)
    }

    pub fn pages_failed(&self) -> usize {
        self.pages_failed.load(Ordering::Acquire)
    }

    pub fn pages_timed_out(&self) -> usize {
        self.pages_timed_out.load(Ordering::Acquire)
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Number of URLs in the visited set
    pub fn visited_count(&self) -> usize {
        self.lock_visited().len()
    }
}
