//! Product Crawler main entry point
//!
//! This is the command-line interface for the product page crawler.

use clap::Parser;
use product_crawler::config::{load_config_with_hash, load_patterns, validate, Config};
use product_crawler::crawler::run_crawl;
use product_crawler::output::print_report;
use product_crawler::DomainSpec;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Product Crawler: finds product pages on an e-commerce site
///
/// Starting from one URL, renders pages in a headless browser and follows
/// same-domain links, writing every link that contains the domain's product
/// pattern to the output file.
#[derive(Parser, Debug)]
#[command(name = "product-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Finds product pages on a single e-commerce domain", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Maximum number of pages to crawl
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Maximum number of pages rendered at once
    #[arg(long, value_name = "N")]
    max_concurrent: Option<usize>,

    /// JSON file mapping domains to product URL patterns
    #[arg(long, value_name = "PATH")]
    patterns: Option<PathBuf>,

    /// File product URLs are appended to
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Optional TOML settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seconds to wait for a page to load
    #[arg(long, value_name = "SECS")]
    page_timeout: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and the pattern file, then exit without crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line flags on top of file or default settings
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = max_pages;
        }
        if let Some(max_concurrent) = self.max_concurrent {
            config.crawler.max_concurrent = max_concurrent;
        }
        if let Some(page_timeout) = self.page_timeout {
            config.crawler.page_timeout_secs = page_timeout;
        }
        if let Some(patterns) = &self.patterns {
            config.files.patterns = patterns.clone();
        }
        if let Some(output) = &self.output {
            config.files.output = output.clone();
        }
        if self.headed {
            config.browser.headless = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);

    if let Err(e) = validate(&config) {
        tracing::error!("Invalid settings: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config, &cli.start_url)?;
    } else {
        handle_crawl(config, &cli.start_url).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("product_crawler=info,warn"),
            1 => EnvFilter::new("product_crawler=debug,info"),
            2 => EnvFilter::new("product_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: resolves the domain and pattern, then exits
fn handle_dry_run(config: &Config, start_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Product Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max concurrent pages: {}", config.crawler.max_concurrent);
    println!("  Page timeout: {}s", config.crawler.page_timeout_secs);

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    println!("  User agent: {}", config.browser.user_agent);
    println!("  Ignore HTTPS errors: {}", config.browser.ignore_https_errors);
    if let Some(executable) = &config.browser.executable {
        println!("  Executable: {}", executable.display());
    }

    println!("\nFiles:");
    println!("  Patterns: {}", config.files.patterns.display());
    println!("  Output: {}", config.files.output.display());

    let patterns = load_patterns(&config.files.patterns)?;
    let domain = DomainSpec::for_start_url(start_url, &patterns)?;

    println!("\nTarget:");
    println!("  Start URL: {}", start_url);
    println!("  Domain: {}", domain.domain());
    println!("  Product pattern: {}", domain.pattern().unwrap_or_default());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, start_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            interrupt.cancel();
        }
    });

    match run_crawl(&config, start_url, &cancel).await {
        Ok(report) => {
            report.log_summary(&config.files.output.display().to_string());
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
