//! Configuration module for the product crawler
//!
//! This module loads the optional TOML settings file, validates it, and reads
//! the `patterns.json` registry of product patterns.
//!
//! # Example
//!
//! ```no_run
//! use product_crawler::config::{load_config, load_patterns};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! let patterns = load_patterns(&config.files.patterns).unwrap();
//! println!("{} domains registered", patterns.len());
//! ```

mod parser;
mod patterns;
mod types;
mod validation;

// Re-export types
pub use patterns::{load_patterns, PatternStore};
pub use types::{BrowserSettings, Config, CrawlerConfig, FilesConfig, DEFAULT_USER_AGENT};
pub use validation::{validate, MAX_CONCURRENT_LIMIT};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
