//! Crawler coordinator - main crawl orchestration logic
//!
//! This module owns the lifecycle of one crawl:
//! - Creating the frontier, registry and shutdown token
//! - Seeding the frontier and spawning the worker pool
//! - Waiting for natural exhaustion, budget exhaustion or cancellation
//! - Draining every worker and building the final report

use crate::config::{Config, CrawlerConfig};
use crate::crawler::browser::ChromiumRenderer;
use crate::crawler::frontier::Frontier;
use crate::crawler::processor::CrawlContext;
use crate::crawler::registry::CrawlRegistry;
use crate::crawler::renderer::Renderer;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::worker::run_worker;
use crate::output::{CrawlReport, FileSink, ProductSink, StopReason};
use crate::url::DomainSpec;
use crate::{CrawlerError, UrlError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Limits applied to one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Maximum number of pages dispatched to the renderer
    pub max_pages: usize,

    /// Number of workers, and of pages rendered at once
    pub max_concurrent: usize,

    /// Per-page render timeout
    pub page_timeout: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_concurrent: config.max_concurrent,
            page_timeout: Duration::from_secs(config.page_timeout_secs),
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    start_url: String,
    domain: DomainSpec,
    options: CrawlOptions,
    renderer: Arc<dyn Renderer>,
    sink: Arc<dyn ProductSink>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `start_url` - The seed URL; it is normalised before being queued
    /// * `domain` - The domain and product pattern to crawl for
    /// * `options` - Page budget, worker count and page timeout
    /// * `renderer` - Loads pages
    /// * `sink` - Receives product URLs
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlerError)` - The start URL could not be parsed
    pub fn new(
        start_url: &str,
        domain: DomainSpec,
        options: CrawlOptions,
        renderer: Arc<dyn Renderer>,
        sink: Arc<dyn ProductSink>,
    ) -> Result<Self, CrawlerError> {
        let start_url = Url::parse(start_url)
            .map_err(|e| UrlError::Parse(format!("{}: {}", start_url, e)))?
            .to_string();

        Ok(Self {
            start_url,
            domain,
            options: CrawlOptions {
                max_concurrent: options.max_concurrent.max(1),
                ..options
            },
            renderer,
            sink,
        })
    }

    /// The normalised seed URL
    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    /// Runs one crawl to completion
    ///
    /// Returns once every worker has exited. Cancelling `cancel` stops the
    /// crawl after the pages currently rendering finish.
    pub async fn run(&self, cancel: &CancellationToken) -> CrawlReport {
        let workers = self.options.max_concurrent;
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl of {} (max pages: {}, workers: {})",
            self.start_url,
            self.options.max_pages,
            workers
        );

        let frontier = Arc::new(Frontier::new());
        let scheduler = Arc::new(Scheduler::new(frontier.clone(), workers));
        let ctx = Arc::new(CrawlContext {
            domain: self.domain.clone(),
            registry: CrawlRegistry::new(self.options.max_pages),
            frontier: frontier.clone(),
            renderer: self.renderer.clone(),
            sink: self.sink.clone(),
            shutdown: cancel.child_token(),
            workers,
            page_timeout: self.options.page_timeout,
        });

        frontier.enqueue(self.start_url.clone());

        let mut pool = JoinSet::new();
        for id in 0..workers {
            pool.spawn(run_worker(id, ctx.clone(), scheduler.clone()));
        }

        tokio::select! {
            _ = frontier.join() => {
                tracing::info!("Frontier is empty, crawl complete");
            }
            _ = ctx.shutdown.cancelled() => {
                if cancel.is_cancelled() {
                    tracing::warn!("Crawl cancelled, waiting for in-flight pages");
                }
            }
        }

        frontier.shutdown(workers);
        ctx.shutdown.cancel();

        while let Some(result) = pool.join_next().await {
            if let Err(e) = result {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        let registry = &ctx.registry;
        let stop_reason = if registry.is_exhausted() {
            StopReason::BudgetExhausted
        } else if cancel.is_cancelled() {
            StopReason::Cancelled
        } else if registry.pages_crawled() >= registry.max_pages() {
            StopReason::BudgetExhausted
        } else {
            StopReason::FrontierExhausted
        };

        let report = CrawlReport {
            pages_crawled: registry.pages_crawled(),
            products_found: registry.products_found(),
            pages_failed: registry.pages_failed(),
            pages_timed_out: registry.pages_timed_out(),
            max_pages: registry.max_pages(),
            stop_reason,
            elapsed: start_time.elapsed(),
            permits_in_use: scheduler.permits_in_use(),
        };

        tracing::info!(
            "Crawl finished ({}): {} pages crawled, {} products in {:?}",
            report.stop_reason,
            report.pages_crawled,
            report.products_found,
            report.elapsed
        );

        report
    }
}

/// Runs a complete crawl with the production browser and file sink
///
/// This function orchestrates the entire crawl process:
///
/// 1. Load the pattern file and resolve the start URL's domain
/// 2. Launch the browser
/// 3. Run the worker pool until it stops
/// 4. Close the browser
///
/// Nothing is crawled and the output file is left untouched when step 1
/// fails.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `start_url` - The seed URL
/// * `cancel` - External stop signal
///
/// # Example
///
/// ```no_run
/// use product_crawler::config::Config;
/// use product_crawler::crawler::run_crawl;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let report = run_crawl(&config, "https://shop.test/", &CancellationToken::new()).await?;
/// println!("{} products", report.products_found);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    start_url: &str,
    cancel: &CancellationToken,
) -> Result<CrawlReport, CrawlerError> {
    let patterns = crate::config::load_patterns(&config.files.patterns)?;
    let domain = DomainSpec::for_start_url(start_url, &patterns)?;

    let renderer = Arc::new(
        ChromiumRenderer::launch(&config.browser)
            .await
            .map_err(|e| CrawlerError::Browser(format!("{:#}", e)))?,
    );
    let sink = Arc::new(FileSink::new(&config.files.output));

    let report = match Coordinator::new(
        start_url,
        domain,
        CrawlOptions::from(&config.crawler),
        renderer.clone(),
        sink,
    ) {
        Ok(coordinator) => Ok(coordinator.run(cancel).await),
        Err(e) => Err(e),
    };

    renderer.close().await;
    report
}
