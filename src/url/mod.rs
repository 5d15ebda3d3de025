//! URL handling module for the product crawler
//!
//! This module provides the domain gate and the product classifier used for
//! every discovered link, plus link resolution helpers.

mod domain;
mod matcher;
mod normalize;

use crate::config::PatternStore;
use crate::ConfigError;

// Re-export main functions
pub use domain::{extract_domain, is_same_domain};
pub use matcher::is_product_url;
pub use normalize::{is_http, resolve_link};

/// The domain being crawled and its product pattern
///
/// Loaded once before the crawl starts and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpec {
    domain: String,
    pattern: Option<String>,
}

impl DomainSpec {
    /// Creates a domain spec from its parts
    pub fn new(domain: impl Into<String>, pattern: Option<String>) -> Self {
        Self {
            domain: domain.into(),
            pattern: pattern.filter(|p| !p.is_empty()),
        }
    }

    /// Resolves the domain of `start_url` and looks up its product pattern
    ///
    /// # Returns
    ///
    /// * `Ok(DomainSpec)` - Domain parsed and a non-empty pattern registered
    /// * `Err(ConfigError::InvalidUrl)` - The start URL has no parsable domain
    /// * `Err(ConfigError::PatternNotFound)` - No pattern for that domain
    pub fn for_start_url(start_url: &str, patterns: &PatternStore) -> Result<Self, ConfigError> {
        let parsed = ::url::Url::parse(start_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", start_url, e)))?;

        let domain = extract_domain(&parsed).ok_or_else(|| {
            ConfigError::InvalidUrl(format!("Could not parse domain from {}", start_url))
        })?;

        let pattern = patterns
            .pattern_for(&domain)
            .ok_or_else(|| ConfigError::PatternNotFound {
                domain: domain.clone(),
                path: patterns.source().display().to_string(),
            })?;

        tracing::info!(
            "Loaded pattern '{}' for domain '{}' from '{}'",
            pattern,
            domain,
            patterns.source().display()
        );

        Ok(Self::new(domain, Some(pattern.to_string())))
    }

    /// The registered domain
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The product pattern, if one is loaded
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Returns true if `url` is on the registered domain (www-insensitive)
    pub fn is_same_domain(&self, url: &str) -> bool {
        is_same_domain(url, &self.domain)
    }

    /// Returns true if `url` contains the product pattern
    pub fn is_product_url(&self, url: &str) -> bool {
        is_product_url(self.pattern(), url)
    }

    /// Returns true if a discovered URL is worth considering at all
    pub fn is_candidate(&self, url: &str) -> bool {
        is_http(url) && self.is_same_domain(url)
    }
}
