//! Page processor
//!
//! Handles one dequeued URL: admits it against the visited set and budget,
//! renders it, and classifies every link found on the page. Product links are
//! written to the sink; other same-domain links go back to the frontier.

use crate::crawler::frontier::Frontier;
use crate::crawler::registry::{Admission, CrawlRegistry};
use crate::crawler::renderer::{FetchResult, Renderer};
use crate::output::ProductSink;
use crate::url::{resolve_link, DomainSpec};
use crate::{CrawlerError, UrlError};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// State shared by every worker of one crawl
pub(crate) struct CrawlContext {
    pub domain: DomainSpec,
    pub registry: CrawlRegistry,
    pub frontier: Arc<Frontier>,
    pub renderer: Arc<dyn Renderer>,
    pub sink: Arc<dyn ProductSink>,
    pub shutdown: CancellationToken,
    pub workers: usize,
    pub page_timeout: Duration,
}

impl CrawlContext {
    /// Stops the crawl because the page budget ran out
    ///
    /// Only the first caller floods the frontier; later calls do nothing.
    pub fn trigger_budget_shutdown(&self) {
        if self.registry.mark_exhausted() {
            tracing::info!(
                "Reached maximum page limit ({}). Stopping crawl.",
                self.registry.max_pages()
            );
            self.frontier.shutdown(self.workers);
            self.shutdown.cancel();
        }
    }
}

/// Processes a single frontier URL
///
/// The caller marks the frontier item complete afterwards, whatever this
/// returns.
pub(crate) async fn process_page(ctx: &CrawlContext, url: &str) -> crate::Result<()> {
    if ctx.registry.is_exhausted() {
        tracing::debug!("Budget exhausted, dropping {}", url);
        return Ok(());
    }

    if ctx.registry.is_visited(url) || !ctx.domain.is_candidate(url) {
        tracing::trace!("Skipping {}", url);
        return Ok(());
    }

    match ctx.registry.admit(url) {
        Admission::Admitted(page_number) => {
            tracing::info!(
                "Crawling ({}/{}): {}",
                page_number,
                ctx.registry.max_pages(),
                url
            );
        }
        Admission::AlreadyVisited => return Ok(()),
        Admission::BudgetExhausted => {
            ctx.trigger_budget_shutdown();
            return Ok(());
        }
    }

    let base = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;

    let page = match ctx.renderer.fetch(url, ctx.page_timeout).await {
        FetchResult::Success(page) => page,
        FetchResult::Timeout => {
            ctx.registry.record_timeout();
            tracing::warn!(
                "Timeout while loading {} after {}s",
                url,
                ctx.page_timeout.as_secs()
            );
            return Ok(());
        }
        FetchResult::Failed(e) => {
            ctx.registry.record_failure();
            tracing::warn!("Error crawling {}: {}", url, e);
            return Ok(());
        }
    };

    let hrefs = AssertUnwindSafe(page.extract_hrefs()).catch_unwind().await;
    page.close().await;

    let hrefs = match hrefs {
        Ok(hrefs) => hrefs,
        Err(panic) => std::panic::resume_unwind(panic),
    };

    let hrefs = hrefs.map_err(|source| CrawlerError::Render {
        url: url.to_string(),
        source,
    })?;

    tracing::debug!("Found {} links on {}", hrefs.len(), url);

    for href in &hrefs {
        let Some(link) = resolve_link(&base, href) else {
            continue;
        };

        if ctx.registry.is_visited(&link) || !ctx.domain.is_candidate(&link) {
            continue;
        }

        if ctx.domain.is_product_url(&link) {
            record_product(ctx, &link).await;
        } else if ctx.registry.has_budget() {
            ctx.frontier.enqueue(link);
        }
    }

    Ok(())
}

async fn record_product(ctx: &CrawlContext, link: &str) {
    if !ctx.registry.try_visit(link) {
        return;
    }

    let total = ctx.registry.record_product();
    tracing::info!("Found product URL: {} (total products: {})", link, total);

    if let Err(e) = ctx.sink.record_product(ctx.domain.domain(), link).await {
        tracing::error!("Failed to record product {}: {}", link, e);
    }
}
