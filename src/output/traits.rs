//! Output sink trait and errors
//!
//! This module defines the interface the crawler uses to record confirmed
//! product URLs.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Formats one product record, newline included
pub fn format_record(domain: &str, url: &str) -> String {
    format!("{},{}\n", domain, url)
}

/// Append-only destination for product URLs
///
/// Implementations are shared by every worker and must accept concurrent
/// calls. Each record has to land as a single unit; two records may be
/// reordered but never interleaved.
#[async_trait]
pub trait ProductSink: Send + Sync {
    /// Records a product URL discovered on `domain`
    ///
    /// # Arguments
    ///
    /// * `domain` - The registered domain being crawled
    /// * `url` - The absolute product URL
    async fn record_product(&self, domain: &str, url: &str) -> OutputResult<()>;
}
