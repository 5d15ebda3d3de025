//! Product pattern registry loaded from `patterns.json`
//!
//! The file maps a domain to the URL substring that marks its product pages:
//!
//! ```json
//! { "shop.test": "/p/", "www.example.com": "/product/" }
//! ```
//!
//! It is produced out-of-band and is only ever read here.

use crate::ConfigError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Domain to product-pattern mapping
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    patterns: HashMap<String, String>,
    source: PathBuf,
}

impl PatternStore {
    /// Builds a store from an in-memory map
    pub fn from_map(patterns: HashMap<String, String>, source: impl Into<PathBuf>) -> Self {
        Self {
            patterns,
            source: source.into(),
        }
    }

    /// Returns the non-empty pattern registered for `domain`
    pub fn pattern_for(&self, domain: &str) -> Option<&str> {
        self.patterns
            .get(domain)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }

    /// The file this store was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of registered domains
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if no domain is registered
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Loads the pattern file
///
/// # Returns
///
/// * `Ok(PatternStore)` - File read and parsed
/// * `Err(ConfigError::Io)` - File missing or unreadable
/// * `Err(ConfigError::Json)` - File is not a JSON object of strings
pub fn load_patterns(path: &Path) -> Result<PatternStore, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let patterns: HashMap<String, String> = serde_json::from_str(&content)?;

    tracing::debug!(
        "Loaded {} domain patterns from {}",
        patterns.len(),
        path.display()
    );

    Ok(PatternStore::from_map(patterns, path))
}
