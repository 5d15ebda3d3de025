//! Rendering collaborator interface
//!
//! The crawler never talks to a browser directly. It asks a [`Renderer`] for
//! a page and receives a typed [`FetchResult`]; a successful fetch yields a
//! [`PageHandle`] from which anchor hrefs are read before it is closed.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a renderer or an open page
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Failed to open page: {0}")]
    PageCreation(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Link extraction failed: {0}")]
    Extraction(String),
}

/// Result of a fetch operation
pub enum FetchResult {
    /// The page finished loading within the timeout
    Success(Box<dyn PageHandle>),

    /// The page did not finish loading in time
    Timeout,

    /// The page could not be opened or navigated
    Failed(RenderError),
}

impl std::fmt::Debug for FetchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(_) => f.write_str("Success"),
            Self::Timeout => f.write_str("Timeout"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// A rendered page
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Returns the raw `href` value of every anchor on the page
    async fn extract_hrefs(&self) -> Result<Vec<String>, RenderError>;

    /// Releases the page; failures are logged by the implementation
    async fn close(self: Box<Self>);
}

/// Loads pages, e.g. in a headless browser
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Loads `url`, giving up after `timeout`
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult;
}
