//! Crawl worker loop
//!
//! Every worker is identical: take a permit and a URL from the scheduler,
//! process the page, mark the item complete, release the permit. A worker
//! leaves the loop on a STOP item or when the crawl token is cancelled.

use crate::crawler::processor::{process_page, CrawlContext};
use crate::crawler::scheduler::Scheduler;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Runs one worker until it is told to stop
pub(crate) async fn run_worker(id: usize, ctx: Arc<CrawlContext>, scheduler: Arc<Scheduler>) {
    tracing::debug!("Worker {} started", id);

    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.shutdown.cancelled() => {
                tracing::debug!("Worker {} cancelled", id);
                break;
            }
            next = scheduler.next() => next,
        };

        let Some(scheduled) = next else {
            tracing::debug!("Worker {} received stop signal", id);
            break;
        };

        let outcome = AssertUnwindSafe(process_page(&ctx, &scheduled.url))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Error processing {}: {}", scheduled.url, e),
            Err(panic) => tracing::error!(
                "Worker {} panicked while processing {}: {}",
                id,
                scheduled.url,
                panic_message(panic.as_ref())
            ),
        }

        ctx.frontier.task_done();
        drop(scheduled);
    }

    tracing::debug!("Worker {} exited", id);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
