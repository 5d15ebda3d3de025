//! Crawl report produced when a crawl returns
//!
//! This module holds the final counters of a run and knows how to log and
//! print them.

use std::fmt;
use std::time::Duration;

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Every queued URL was processed
    FrontierExhausted,

    /// The page budget ran out
    BudgetExhausted,

    /// An external stop signal was received
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FrontierExhausted => "frontier exhausted",
            Self::BudgetExhausted => "page budget exhausted",
            Self::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Final statistics of one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages actually dispatched to the renderer
    pub pages_crawled: usize,

    /// Product URLs recorded
    pub products_found: usize,

    /// Pages whose render failed
    pub pages_failed: usize,

    /// Pages whose render timed out
    pub pages_timed_out: usize,

    /// Configured page budget
    pub max_pages: usize,

    /// Why the crawl ended
    pub stop_reason: StopReason,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,

    /// Concurrency permits still held when the crawl returned
    pub permits_in_use: usize,
}

impl CrawlReport {
    /// Pages that rendered successfully
    pub fn pages_succeeded(&self) -> usize {
        self.pages_crawled
            .saturating_sub(self.pages_failed + self.pages_timed_out)
    }

    /// Pages per second over the whole run
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.pages_crawled as f64 / secs
    }

    /// Emits the summary line through tracing
    pub fn log_summary(&self, output: &str) {
        tracing::info!(
            "Crawling complete ({}). Crawled {} pages. Found {} products. Results saved to {}",
            self.stop_reason,
            self.pages_crawled,
            self.products_found,
            output
        );

        if self.pages_failed > 0 || self.pages_timed_out > 0 {
            tracing::warn!(
                "{} pages failed to render, {} timed out",
                self.pages_failed,
                self.pages_timed_out
            );
        }
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");
    println!("Stopped: {}", report.stop_reason);
    println!(
        "Pages crawled: {} / {}",
        report.pages_crawled, report.max_pages
    );
    println!("  Rendered: {}", report.pages_succeeded());
    println!("  Failed: {}", report.pages_failed);
    println!("  Timed out: {}", report.pages_timed_out);
    println!("Products found: {}", report.products_found);
    println!(
        "Elapsed: {:.1}s ({:.2} pages/sec)",
        report.elapsed.as_secs_f64(),
        report.pages_per_second()
    );
}
