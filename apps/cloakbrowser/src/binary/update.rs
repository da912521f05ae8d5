//! Background and explicit update checks.
//!
//! The background check runs at most once per interval, never blocks the
//! caller and never fails it. It is skipped entirely when auto-update is
//! disabled, a local binary override is set, or a custom distribution
//! server is configured (the operator then controls updates).
//!
//! When a newer release exists it is downloaded into its own version
//! directory and recorded in the `latest_version` marker; the next
//! [`ensure_binary`](super::BinaryManager::ensure_binary) call picks it up.
//! The current build is never touched.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::BinaryManager;
use super::paths::CachePaths;
use super::releases::{fetch_releases, latest_chromium_version, latest_remote_version};
use super::version::is_newer;
use crate::errors::{IoContext, Result};

impl BinaryManager {
    /// Returns whether a background update check is due.
    #[must_use]
    pub fn should_check_for_update(&self) -> bool {
        let config = &self.config;
        if !config.auto_update || config.binary_override.is_some() || config.custom_download_source
        {
            return false;
        }
        let Ok(paths) = self.cache_paths() else {
            return false;
        };
        read_last_check(&paths.last_check_file()).is_none_or(|last| {
            now_millis().saturating_sub(last) >= duration_millis(config.update_check_interval)
        })
    }

    /// Starts a detached update check if one is due.
    ///
    /// The last-check timestamp is written before the task is spawned, so
    /// repeated calls within the interval start nothing. Failures inside
    /// the task are logged and discarded. Returns the task handle, which
    /// callers are free to drop.
    pub fn maybe_check_for_update(&self) -> Option<JoinHandle<()>> {
        if !self.should_check_for_update() {
            return None;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime, skipping background update check");
            return None;
        };

        let Ok(paths) = self.cache_paths() else {
            return None;
        };
        if let Err(e) = record_check(&paths) {
            self.report_background_failure(&e);
            return None;
        }

        let manager = self.clone();
        Some(runtime.spawn(async move {
            if let Err(e) = manager.background_update(&paths).await {
                manager.report_background_failure(&e);
            }
        }))
    }

    /// Checks for a newer Chromium release and stages it.
    ///
    /// Unlike the background check this ignores the rate limit and the
    /// auto-update setting and propagates every failure. Returns the newer
    /// version now available for use, or `None` if already up to date.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the platform is unsupported or unavailable
    /// - `Network` if the release feed or the download fails
    /// - `Integrity` if the new archive lacks the binary
    /// - `Filesystem` for local I/O failures
    pub async fn check_for_update(&self) -> Result<Option<String>> {
        if self.config.binary_override.is_some() {
            info!("Local binary override is set, skipping update check");
            return Ok(None);
        }
        let paths = self.cache_paths()?;
        record_check(&paths)?;

        let releases = fetch_releases(&self.config.releases_url, self.config.releases_timeout).await?;
        match latest_chromium_version(&releases) {
            Some(latest) => self.stage_if_newer(&paths, &latest).await,
            None => {
                info!("No Chromium releases found in feed");
                Ok(None)
            }
        }
    }

    async fn background_update(&self, paths: &CachePaths) -> Result<()> {
        let Some(latest) =
            latest_remote_version(&self.config.releases_url, self.config.releases_timeout).await
        else {
            return Ok(());
        };
        if let Some(version) = self.stage_if_newer(paths, &latest).await? {
            info!("Chromium {version} staged; it will be used on next launch");
        }
        Ok(())
    }

    async fn stage_if_newer(&self, paths: &CachePaths, latest: &str) -> Result<Option<String>> {
        let baseline = &self.config.baseline_version;
        if !is_newer(latest, baseline) {
            debug!("Latest release {latest} is not newer than {baseline}");
            return Ok(None);
        }

        if paths.is_version_staged(latest) {
            debug!("Chromium {latest} already staged");
        } else {
            info!("Downloading Chromium {latest} in the background");
            self.stage_version(paths, latest).await?;
        }
        write_state(&paths.version_marker(), latest)?;
        Ok(Some(latest.to_string()))
    }

    fn report_background_failure(&self, error: &crate::CloakError) {
        if self.config.debug {
            warn!("Background update check failed: {error}");
        } else {
            debug!("Background update check failed: {error}");
        }
    }
}

fn record_check(paths: &CachePaths) -> Result<()> {
    write_state(&paths.last_check_file(), &now_millis().to_string())
}

/// Reads the stored timestamp; absent, corrupt or future values count as never checked.
fn read_last_check(path: &Path) -> Option<u64> {
    let last = std::fs::read_to_string(path).ok()?.trim().parse::<u64>().ok()?;
    (last <= now_millis()).then_some(last)
}

fn write_state(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).fs_context("Failed to create directory", parent)?;
    }
    std::fs::write(path, content).fs_context("Failed to write", path)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, duration_millis)
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
