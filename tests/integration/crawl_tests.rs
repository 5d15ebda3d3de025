//! Integration tests for the crawler
//!
//! These tests drive the full worker pool against an in-memory site served
//! by a fake renderer, and write products through the real file sink.

use async_trait::async_trait;
use product_crawler::config::{load_patterns, Config};
use product_crawler::crawler::{
    run_crawl, Coordinator, CrawlOptions, FetchResult, PageHandle, RenderError, Renderer,
};
use product_crawler::output::FileSink;
use product_crawler::{ConfigError, CrawlerError, DomainSpec, StopReason};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// In-memory site
///
/// Pages listed in `pages` return their links. When `generate` is set, any
/// other `/n/<i>` page links to two children and one product, which makes the
/// site effectively unbounded.
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, Vec<String>>,
    slow: HashSet<String>,
    broken: HashSet<String>,
    panicking: HashSet<String>,
    generate: bool,
    delay: Duration,
    fetch_log: Mutex<Vec<String>>,
    open_pages: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: AtomicUsize,
}

impl FakeSite {
    fn with_pages(pages: &[(&str, &[&str])]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, links)| {
                    (
                        url.to_string(),
                        links.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    fn links_for(&self, url: &str) -> Vec<String> {
        if let Some(links) = self.pages.get(url) {
            return links.clone();
        }
        if !self.generate {
            return Vec::new();
        }
        let index: usize = url
            .rsplit('/')
            .next()
            .and_then(|tail| tail.parse().ok())
            .unwrap_or(0);
        vec![
            format!("/n/{}", index * 2 + 1),
            format!("/n/{}", index * 2 + 2),
            format!("/p/{}", index),
        ]
    }

    fn fetched(&self) -> Vec<String> {
        self.fetch_log.lock().unwrap().clone()
    }
}

struct FakePage {
    links: Vec<String>,
    panics: bool,
    open_pages: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
}

#[async_trait]
impl PageHandle for FakePage {
    async fn extract_hrefs(&self) -> Result<Vec<String>, RenderError> {
        if self.panics {
            panic!("renderer crashed while serialising the DOM");
        }
        Ok(self.links.clone())
    }

    async fn close(self: Box<Self>) {
        self.open_pages.fetch_sub(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Renderer for FakeSite {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult {
        self.fetch_log.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.slow.contains(url) {
            let load = tokio::time::sleep(Duration::from_secs(30));
            let _ = tokio::time::timeout(timeout, load).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            return FetchResult::Timeout;
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.broken.contains(url) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            return FetchResult::Failed(RenderError::Navigation(
                "net::ERR_CONNECTION_RESET".to_string(),
            ));
        }

        self.open_pages.fetch_add(1, Ordering::SeqCst);
        FetchResult::Success(Box::new(FakePage {
            links: self.links_for(url),
            panics: self.panicking.contains(url),
            open_pages: self.open_pages.clone(),
            in_flight: self.in_flight.clone(),
        }))
    }
}

fn shop_domain() -> DomainSpec {
    DomainSpec::new("shop.test", Some("/p/".to_string()))
}

fn options(max_pages: usize, max_concurrent: usize) -> CrawlOptions {
    CrawlOptions {
        max_pages,
        max_concurrent,
        page_timeout: Duration::from_millis(200),
    }
}

fn read_records(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_budget_limited_crawl_records_seed_products() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("product_urls.txt");
    let site = Arc::new(FakeSite::with_pages(&[(
        "https://shop.test/",
        &["/c/1", "/c/2", "/c/3", "/p/1", "/p/2"],
    )]));

    let coordinator = Coordinator::new(
        "https://shop.test/",
        shop_domain(),
        options(3, 2),
        site.clone(),
        Arc::new(FileSink::new(&output)),
    )
    .unwrap();

    let report = coordinator.run(&CancellationToken::new()).await;

    let mut records = read_records(&output);
    records.sort();
    assert_eq!(
        records,
        vec![
            "shop.test,https://shop.test/p/1",
            "shop.test,https://shop.test/p/2",
        ]
    );
    assert!(report.pages_crawled <= 3);
    assert_eq!(report.products_found, 2);
    assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(report.permits_in_use, 0);
    assert!(site.fetched().len() <= 3);
    assert_eq!(site.open_pages.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_pattern_is_fatal_and_leaves_output_untouched() {
    let dir = TempDir::new().unwrap();
    let patterns = dir.path().join("patterns.json");
    std::fs::write(&patterns, r#"{"other.test": "/p/", "shop.test": ""}"#).unwrap();

    let mut config = Config::default();
    config.files.patterns = patterns.clone();
    config.files.output = dir.path().join("product_urls.txt");

    let store = load_patterns(&patterns).unwrap();
    assert!(matches!(
        DomainSpec::for_start_url("https://shop.test/", &store),
        Err(ConfigError::PatternNotFound { .. })
    ));

    let result = run_crawl(&config, "https://shop.test/", &CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(CrawlerError::Config(ConfigError::PatternNotFound { .. }))
    ));
    assert!(!config.files.output.exists());
}

#[tokio::test]
async fn test_unreadable_patterns_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.files.patterns = dir.path().join("missing.json");
    config.files.output = dir.path().join("product_urls.txt");

    let result = run_crawl(&config, "https://shop.test/", &CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(CrawlerError::Config(ConfigError::Io(_)))
    ));
    assert!(!config.files.output.exists());
}

#[tokio::test]
async fn test_start_url_without_domain_is_fatal() {
    let dir = TempDir::new().unwrap();
    let patterns = dir.path().join("patterns.json");
    std::fs::write(&patterns, r#"{"shop.test": "/p/"}"#).unwrap();

    let mut config = Config::default();
    config.files.patterns = patterns;
    config.files.output = dir.path().join("product_urls.txt");

    let result = run_crawl(&config, "file:///tmp/index.html", &CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(CrawlerError::Config(ConfigError::InvalidUrl(_)))
    ));
    assert!(!config.files.output.exists());
}

#[tokio::test]
async fn test_timed_out_page_is_counted_and_pool_continues() {
    let mut site = FakeSite::with_pages(&[
        ("https://shop.test/", &["/slow", "/a", "/b"]),
        ("https://shop.test/a", &["/p/a"]),
        ("https://shop.test/b", &["/p/b"]),
    ]);
    site.slow.insert("https://shop.test/slow".to_string());
    let site = Arc::new(site);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("product_urls.txt");

    let coordinator = Coordinator::new(
        "https://shop.test/",
        shop_domain(),
        options(10, 2),
        site.clone(),
        Arc::new(FileSink::new(&output)),
    )
    .unwrap();

    let report = coordinator.run(&CancellationToken::new()).await;

    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(report.pages_crawled, 4);
    assert_eq!(report.pages_timed_out, 1);
    assert_eq!(report.products_found, 2);
    assert_eq!(read_records(&output).len(), 2);
    assert_eq!(
        site.fetched()
            .iter()
            .filter(|u| u.as_str() == "https://shop.test/slow")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_failed_render_is_counted_and_pool_continues() {
    let mut site = FakeSite::with_pages(&[
        ("https://shop.test/", &["/down", "/a"]),
        ("https://shop.test/a", &["/p/a"]),
    ]);
    site.broken.insert("https://shop.test/down".to_string());
    let site = Arc::new(site);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("product_urls.txt");

    let coordinator = Coordinator::new(
        "https://shop.test/",
        shop_domain(),
        options(10, 2),
        site.clone(),
        Arc::new(FileSink::new(&output)),
    )
    .unwrap();

    let report = coordinator.run(&CancellationToken::new()).await;

    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.products_found, 1);
    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(
        read_records(&output),
        vec!["shop.test,https://shop.test/p/a"]
    );
}

#[tokio::test]
async fn test_racing_workers_never_visit_twice() {
    let urls: Vec<String> = (0..30).map(|i| format!("https://shop.test/c/{}", i)).collect();
    let mut site = FakeSite::default();
    site.pages
        .insert("https://shop.test/".to_string(), urls.clone());
    for url in &urls {
        site.pages.insert(url.clone(), urls.clone());
    }
    site.delay = Duration::from_millis(5);
    let site = Arc::new(site);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("product_urls.txt");

    let coordinator = Coordinator::new(
        "https://shop.test/",
        shop_domain(),
        options(100, 8),
        site.clone(),
        Arc::new(FileSink::new(&output)),
    )
    .unwrap();

    let report = coordinator.run(&CancellationToken::new()).await;

    let fetched = site.fetched();
    let unique: HashSet<_> = fetched.iter().collect();
    assert_eq!(fetched.len(), unique.len());
    assert_eq!(fetched.len(), 31);
    assert_eq!(report.pages_crawled, 31);
    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    assert!(site.max_in_flight.load(Ordering::SeqCst) <= 8);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_unbounded_site_stops_at_budget() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("product_urls.txt");
    let site = Arc::new(FakeSite {
        generate: true,
        delay: Duration::from_millis(2),
        ..Default::default()
    });

    let coordinator = Coordinator::new(
        "https://shop.test/n/0",
        shop_domain(),
        options(20, 4),
        site.clone(),
        Arc::new(FileSink::new(&output)),
    )
    .unwrap();

    let report = coordinator.run(&CancellationToken::new()).await;

    assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(report.pages_crawled, 20);
    assert_eq!(site.fetched().len(), 20);
    assert_eq!(report.permits_in_use, 0);
    assert_eq!(site.open_pages.load(Ordering::SeqCst), 0);
    assert!(site.max_in_flight.load(Ordering::SeqCst) <= 4);

    let records = read_records(&output);
    let unique: HashSet<_> = records.iter().collect();
    assert_eq!(records.len(), unique.len());
    assert_eq!(records.len(), report.products_found);
    assert!(records.iter().all(|r| r.starts_with("shop.test,https://shop.test/p/")));
}

#[tokio::test]
async fn test_external_cancellation_drains_workers() {
    let site = Arc::new(FakeSite {
        generate: true,
        delay: Duration::from_millis(20),
        ..Default::default()
    });
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("product_urls.txt");

    let coordinator = Coordinator::new(
        "https://shop.test/n/0",
        shop_domain(),
        options(10_000, 3),
        site.clone(),
        Arc::new(FileSink::new(&output)),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        trigger.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(10), coordinator.run(&cancel))
        .await
        .expect("crawl should stop after cancellation");

    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert!(report.pages_crawled < 10_000);
    assert_eq!(report.permits_in_use, 0);
    assert_eq!(site.open_pages.load(Ordering::SeqCst), 0);
    assert_eq!(site.in_flight.load(Ordering::SeqCst), 0);
    assert_eq!(read_records(&output).len(), report.products_found);
}

#[tokio::test]
async fn test_foreign_and_non_http_links_are_ignored() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("product_urls.txt");
    let site = Arc::new(FakeSite::with_pages(&[(
        "https://shop.test/",
        &[
            "https://other.test/p/1",
            "https://other.test/c/1",
            "mailto:sales@shop.test",
            "javascript:void(0)",
            "ftp://shop.test/p/2",
            "https://www.shop.test/p/9",
            "https://www.shop.test/c/9",
        ],
    )]));

    let coordinator = Coordinator::new(
        "https://shop.test/",
        shop_domain(),
        options(10, 2),
        site.clone(),
        Arc::new(FileSink::new(&output)),
    )
    .unwrap();

    let report = coordinator.run(&CancellationToken::new()).await;

    assert_eq!(
        read_records(&output),
        vec!["shop.test,https://www.shop.test/p/9"]
    );
    assert_eq!(
        site.fetched(),
        vec!["https://shop.test/", "https://www.shop.test/c/9"]
    );
    assert_eq!(report.pages_crawled, 2);
}

#[tokio::test]
async fn test_product_pages_are_not_crawled() {
    let site = Arc::new(FakeSite::with_pages(&[
        ("https://shop.test/", &["/p/1", "/c/1"]),
        ("https://shop.test/c/1", &["/p/1", "/p/2"]),
    ]));
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("product_urls.txt");

    let coordinator = Coordinator::new(
        "https://shop.test/",
        shop_domain(),
        options(10, 1),
        site.clone(),
        Arc::new(FileSink::new(&output)),
    )
    .unwrap();

    let report = coordinator.run(&CancellationToken::new()).await;

    assert_eq!(
        site.fetched(),
        vec!["https://shop.test/", "https://shop.test/c/1"]
    );
    assert_eq!(
        read_records(&output),
        vec![
            "shop.test,https://shop.test/p/1",
            "shop.test,https://shop.test/p/2",
        ]
    );
    assert_eq!(report.products_found, 2);
}

#[tokio::test]
async fn test_page_is_closed_when_link_extraction_panics() {
    let mut site = FakeSite::with_pages(&[
        ("https://shop.test/", &["/boom", "/a"]),
        ("https://shop.test/a", &["/p/a"]),
    ]);
    site.panicking.insert("https://shop.test/boom".to_string());
    let site = Arc::new(site);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("product_urls.txt");

    let coordinator = Coordinator::new(
        "https://shop.test/",
        shop_domain(),
        options(10, 2),
        site.clone(),
        Arc::new(FileSink::new(&output)),
    )
    .unwrap();

    let report = coordinator.run(&CancellationToken::new()).await;

    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(report.permits_in_use, 0);
    assert_eq!(site.open_pages.load(Ordering::SeqCst), 0);
    assert_eq!(site.in_flight.load(Ordering::SeqCst), 0);
    assert_eq!(
        read_records(&output),
        vec!["shop.test,https://shop.test/p/a"]
    );
}
