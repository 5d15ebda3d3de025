use serde::Deserialize;
use std::path::PathBuf;

/// Default browser user agent, a desktop Chrome on Windows
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for the product crawler
///
/// Every section and key is optional in the TOML file; missing values fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub browser: BrowserSettings,
    pub files: FilesConfig,
}

/// Crawler budget configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages to fetch
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum number of concurrent page fetches (and workers)
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,

    /// Upper bound for rendering a single page (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_concurrent: 5,
            page_timeout_secs: 60,
        }
    }
}

/// Browser launch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a visible window
    pub headless: bool,

    /// User agent presented to the site
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept invalid TLS certificates
    #[serde(rename = "ignore-https-errors")]
    pub ignore_https_errors: bool,

    /// Explicit Chrome/Chromium binary; auto-detected when unset
    pub executable: Option<PathBuf>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            ignore_https_errors: true,
            executable: None,
        }
    }
}

/// Input and output file locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Domain to product-pattern mapping (JSON)
    pub patterns: PathBuf,

    /// Append-only product URL list
    pub output: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            patterns: PathBuf::from("patterns.json"),
            output: PathBuf::from("product_urls.txt"),
        }
    }
}
