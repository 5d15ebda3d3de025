//! Append-only text file sink
//!
//! Writes `<domain>,<url>` lines to a plain text file. The file is opened in
//! append mode for every record and is only created by the first write, so a
//! run that records nothing leaves the file system untouched.

use crate::output::traits::{format_record, OutputResult, ProductSink};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Product sink backed by an append-only file
pub struct FileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSink {
    /// Creates a sink for `path` without touching the file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The output file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProductSink for FileSink {
    async fn record_product(&self, domain: &str, url: &str) -> OutputResult<()> {
        let line = format_record(domain, url);

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!("Recorded product {}", url);
        Ok(())
    }
}
