//! Headless Chromium renderer
//!
//! Pages are opened as tabs of one shared browser. After navigation the
//! renderer waits for the network to go quiet so client-side rendered links
//! are present, then the live DOM is serialised and parsed for anchors.

use crate::config::BrowserSettings;
use crate::crawler::parser::extract_hrefs;
use crate::crawler::renderer::{FetchResult, PageHandle, RenderError, Renderer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Interval between load-state checks
const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long the resource count must stay unchanged to count as network idle
const NETWORK_QUIET_PERIOD: Duration = Duration::from_millis(500);

const LOAD_STATE_SCRIPT: &str = r#"
    (function() {
        return {
            readyState: document.readyState,
            resources: performance.getEntriesByType('resource').length
        };
    })()
"#;

static PROFILE_SEQUENCE: AtomicUsize = AtomicUsize::new(0);

/// Browser profile directory, removed when dropped
#[derive(Debug)]
struct ProfileDir {
    path: PathBuf,
}

impl ProfileDir {
    /// Creates a fresh profile directory under `base`
    fn create(base: &Path) -> Result<Self> {
        let path = base.join(format!(
            "product_crawler_chrome_{}_{}",
            std::process::id(),
            PROFILE_SEQUENCE.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&path).context("Failed to create browser user data directory")?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if self.path.exists() {
            debug!("Removing browser profile {}", self.path.display());
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!(
                    "Failed to remove browser profile {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadState {
    ready_state: String,
    resources: usize,
}

/// Tracks load-state samples until the page has settled
///
/// A page is settled once the document is complete and no new resource has
/// finished loading for [`NETWORK_QUIET_PERIOD`].
#[derive(Debug, Default)]
struct NetworkQuiet {
    last_resources: Option<usize>,
    quiet_since: Option<Instant>,
}

impl NetworkQuiet {
    /// Records one sample; returns true once the page has settled
    fn observe(&mut self, complete: bool, resources: usize, now: Instant) -> bool {
        if !complete {
            self.last_resources = None;
            self.quiet_since = None;
            return false;
        }

        if self.last_resources != Some(resources) {
            self.last_resources = Some(resources);
            self.quiet_since = Some(now);
            return false;
        }

        self.quiet_since
            .is_some_and(|since| now.duration_since(since) >= NETWORK_QUIET_PERIOD)
    }
}

/// Renderer backed by a Chromium instance driven over CDP
pub struct ChromiumRenderer {
    browser: RwLock<Browser>,
    handler: Mutex<Option<JoinHandle<()>>>,
    profile: Mutex<Option<ProfileDir>>,
}

impl ChromiumRenderer {
    /// Launches the browser described by `settings`
    ///
    /// The profile directory is removed again if the launch fails.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let profile = ProfileDir::create(&std::env::temp_dir())?;

        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .user_data_dir(profile.path())
            .arg(format!("--user-agent={}", settings.user_agent))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--disable-notifications")
            .arg("--mute-audio");

        if !settings.headless {
            builder = builder.with_head();
        }

        if settings.ignore_https_errors {
            builder = builder.arg("--ignore-certificate-errors");
        }

        if let Some(executable) = &settings.executable {
            builder = builder.chrome_executable(executable);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    let message = e.to_string();
                    // chromiumoxide does not know every CDP event Chrome sends
                    if message.contains("data did not match any variant")
                        || message.contains("Failed to deserialize WS response")
                    {
                        trace!("Ignored CDP message: {}", message);
                    } else {
                        error!("Browser handler error: {:?}", e);
                    }
                }
            }
            debug!("Browser handler task completed");
        });

        info!(
            "Browser launched (headless: {}, ignoring HTTPS errors: {})",
            settings.headless, settings.ignore_https_errors
        );

        Ok(Self {
            browser: RwLock::new(browser),
            handler: Mutex::new(Some(handler_task)),
            profile: Mutex::new(Some(profile)),
        })
    }

    /// Closes the browser, waits for its event handler and removes the
    /// profile directory
    pub async fn close(&self) {
        info!("Closing browser...");
        {
            let mut browser = self.browser.write().await;
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser cleanly: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser process: {}", e);
            }
        }

        if let Some(handle) = self.handler.lock().await.take() {
            if let Err(e) = handle.await {
                warn!("Browser handler task failed: {}", e);
            }
        }

        // Chrome has exited, so its files are no longer locked
        drop(self.profile.lock().await.take());
        info!("Browser closed");
    }
}

/// Navigates and waits until the page is complete and the network is quiet
async fn navigate(page: &Page, url: &str) -> Result<(), RenderError> {
    page.goto(url)
        .await
        .map_err(|e| RenderError::Navigation(e.to_string()))?;

    let mut quiet = NetworkQuiet::default();
    loop {
        match page.evaluate(LOAD_STATE_SCRIPT).await {
            Ok(result) => match result.into_value::<LoadState>() {
                Ok(state) => {
                    let complete = state.ready_state == "complete";
                    if quiet.observe(complete, state.resources, Instant::now()) {
                        return Ok(());
                    }
                }
                Err(e) => debug!("Unreadable load state for {}: {}", url, e),
            },
            Err(e) => debug!("Failed to check load state for {}: {}, retrying", url, e),
        }
        tokio::time::sleep(SETTLE_POLL_INTERVAL).await;
    }
}

async fn close_page(page: Page, url: &str) {
    if let Err(e) = page.close().await {
        debug!("Failed to close page for {}: {}", url, e);
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult {
        let page = {
            let browser = self.browser.read().await;
            match browser.new_page("about:blank").await {
                Ok(page) => page,
                Err(e) => return FetchResult::Failed(RenderError::PageCreation(e.to_string())),
            }
        };

        let navigation = tokio::time::timeout(timeout, navigate(&page, url)).await;

        match navigation {
            Ok(Ok(())) => FetchResult::Success(Box::new(ChromiumPage {
                page,
                url: url.to_string(),
            })),
            Ok(Err(e)) => {
                close_page(page, url).await;
                FetchResult::Failed(e)
            }
            Err(_) => {
                close_page(page, url).await;
                FetchResult::Timeout
            }
        }
    }
}

/// An open browser tab
struct ChromiumPage {
    page: Page,
    url: String,
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn extract_hrefs(&self) -> Result<Vec<String>, RenderError> {
        let html = self
            .page
            .content()
            .await
            .map_err(|e| RenderError::Extraction(e.to_string()))?;
        Ok(extract_hrefs(&html))
    }

    async fn close(self: Box<Self>) {
        let ChromiumPage { page, url } = *self;
        close_page(page, &url).await;
    }
}
