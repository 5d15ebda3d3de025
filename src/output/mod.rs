//! Output module for recording products and reporting crawl results
//!
//! This module handles:
//! - The product sink interface used by the workers
//! - The append-only `product_urls.txt` file sink
//! - The final crawl report

mod file_sink;
pub mod stats;
mod traits;

pub use file_sink::FileSink;
pub use stats::{print_report, CrawlReport, StopReason};
pub use traits::{format_record, OutputError, OutputResult, ProductSink};
