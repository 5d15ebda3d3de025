//! Crawler module for page rendering and crawl coordination
//!
//! This module contains the core crawling logic, including:
//! - The frontier queue and the visited/budget registry
//! - The concurrency limiter and worker pool
//! - Rendering pages in a headless browser and extracting links
//! - Overall crawl coordination and termination

mod browser;
mod coordinator;
mod frontier;
mod parser;
mod processor;
mod registry;
mod renderer;
mod scheduler;
mod worker;

pub use browser::ChromiumRenderer;
pub use coordinator::{run_crawl, Coordinator, CrawlOptions};
pub use frontier::{Frontier, FrontierItem};
pub use parser::extract_hrefs;
pub use registry::{Admission, CrawlRegistry};
pub use renderer::{FetchResult, PageHandle, RenderError, Renderer};
pub use scheduler::{ScheduledFetch, Scheduler};
