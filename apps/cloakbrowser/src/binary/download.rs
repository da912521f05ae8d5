//! HTTP download of release archives.
//!
//! Archives are roughly 200 MB, so the response body is streamed straight
//! to disk. One wall-clock deadline covers the whole transfer; when it
//! fires the request is dropped and nothing is resumed.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::releases::USER_AGENT;
use crate::errors::{CloakError, IoContext, Result};

const MB: u64 = 1024 * 1024;

/// Logs coarse download progress in steps of at least ten percent.
///
/// Progress is only reported when the total size is known from the
/// `Content-Length` header.
#[derive(Debug)]
pub struct DownloadProgress {
    total: Option<u64>,
    downloaded: u64,
    last_logged_pct: Option<u64>,
}

impl DownloadProgress {
    /// Minimum percentage between two progress lines.
    pub const STEP_PCT: u64 = 10;

    /// Creates a tracker for a body of `total` bytes, if known.
    #[must_use]
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total: total.filter(|t| *t > 0),
            downloaded: 0,
            last_logged_pct: None,
        }
    }

    /// Records `len` more bytes and returns the percentage to log, if any.
    pub fn advance(&mut self, len: u64) -> Option<u64> {
        self.downloaded += len;
        let total = self.total?;
        let pct = (self.downloaded.saturating_mul(100) / total).min(100);
        let due = self
            .last_logged_pct
            .is_none_or(|last| pct >= last + Self::STEP_PCT);
        if due {
            self.last_logged_pct = Some(pct);
            Some(pct)
        } else {
            None
        }
    }

    /// Bytes recorded so far.
    #[must_use]
    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }
}

/// Downloads `url` to `dest`, aborting once `timeout` has elapsed.
///
/// The destination file is flushed and closed before this returns `Ok`.
///
/// # Errors
///
/// Returns a `Network` error if:
/// - The connection fails or the server returns a non-success status
/// - The response body is empty or breaks off
/// - The deadline fires
///
/// Returns a `Filesystem` error if the destination cannot be written.
pub async fn download_file(url: &str, dest: &Path, timeout: Duration) -> Result<()> {
    info!("Downloading from {url}");

    match tokio::time::timeout(timeout, transfer(url, dest)).await {
        Ok(result) => result,
        Err(_) => Err(CloakError::network(format!(
            "Download timed out after {}s: {url}",
            timeout.as_secs()
        ))),
    }
}

async fn transfer(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CloakError::network_with_source("Failed to create HTTP client", e))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CloakError::network_with_source(format!("Failed to connect to {url}"), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CloakError::network(format!("HTTP error {status}: {url}")));
    }

    let mut progress = DownloadProgress::new(response.content_length());

    let mut file = tokio::fs::File::create(dest)
        .await
        .fs_context("Failed to create file", dest)?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            CloakError::network_with_source(format!("Failed to read response body from {url}"), e)
        })?;
        file.write_all(&chunk)
            .await
            .fs_context("Failed to write to", dest)?;

        if let Some(pct) = progress.advance(chunk.len() as u64) {
            info!(
                "Download progress: {pct}% ({}/{} MB)",
                progress.downloaded() / MB,
                progress.total.unwrap_or(0) / MB
            );
        }
    }

    file.flush().await.fs_context("Failed to flush", dest)?;
    file.sync_all().await.fs_context("Failed to sync", dest)?;
    drop(file);

    if progress.downloaded() == 0 {
        return Err(CloakError::network(format!(
            "Server returned an empty response body: {url}"
        )));
    }

    info!("Download complete: {} MB", progress.downloaded() / MB);
    Ok(())
}
