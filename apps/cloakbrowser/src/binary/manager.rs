//! Acquisition entry point used by the browser launcher.
//!
//! [`BinaryManager::ensure_binary`] returns a path to an executable Chromium
//! build, downloading the baseline version on first use. The decision order
//! on every call is:
//!
//! 1. `CLOAKBROWSER_BINARY_PATH` override, if set
//! 2. platform availability check
//! 3. effective version (a newer staged build) if its binary is executable
//! 4. baseline version if its binary is executable
//! 5. download and extract the baseline version
//!
//! A successful return also schedules a background update check.
//!
//! ## Staging
//!
//! Archives are downloaded to a staging file and extracted into a private
//! directory next to the version directories. Only once the binary is
//! present is that directory renamed into place, so a version directory is
//! either absent or complete. Staging files and directories are removed on
//! every exit path, including cancellation.
//!
//! ## Concurrency
//!
//! Staging is serialised per version with an async mutex, so callers that
//! share a manager never stage the same version twice at once, while a
//! background download of a newer version never blocks a foreground one.
//! Separate processes are not coordinated beyond the atomic rename.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::archive::extract_archive;
use super::download::download_file;
use super::paths::{CachePaths, StagingGuard, is_executable};
use super::version::effective_version;
use super::Platform;
use crate::config::{BINARY_PATH_ENV, Config};
use crate::errors::{CloakError, IoContext, Result};

/// Snapshot of the current binary installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryInfo {
    /// Effective Chromium version.
    pub version: String,
    /// Platform tag, e.g. `linux-x64`.
    pub platform: String,
    /// Expected path of the browser executable.
    pub binary_path: PathBuf,
    /// Whether the executable exists.
    pub installed: bool,
    /// Version directory holding the extracted build.
    pub cache_dir: PathBuf,
    /// Archive URL for this version and platform.
    pub download_url: String,
}

/// Owns the configuration and serialises staging of new builds.
///
/// Cheap to clone; clones share the staging locks.
#[derive(Debug, Clone)]
pub struct BinaryManager {
    pub(super) config: Arc<Config>,
    install_locks: Arc<std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl BinaryManager {
    /// Creates a manager for `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            install_locks: Arc::default(),
        }
    }

    /// Returns the configuration this manager was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ensures the Chromium binary is available, downloading it if needed.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the local override does not exist or the platform
    ///   is unsupported or has no published binary
    /// - `Network` if the download fails
    /// - `Integrity` if the archive did not contain the expected binary
    /// - `Filesystem` for local I/O failures
    pub async fn ensure_binary(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config.binary_override {
            if !path.exists() {
                return Err(CloakError::configuration(format!(
                    "{BINARY_PATH_ENV} set to '{}' but file does not exist",
                    path.display()
                )));
            }
            info!("Using local binary override: {}", path.display());
            return Ok(path.clone());
        }

        let paths = self.cache_paths()?;
        let baseline = self.config.baseline_version.as_str();

        let effective = effective_version(&paths, baseline);
        let binary = paths.binary_path(&effective);
        if is_executable(&binary) {
            debug!("Binary found in cache: {}", binary.display());
            self.maybe_check_for_update();
            return Ok(binary);
        }

        if effective != baseline {
            let fallback = paths.binary_path(baseline);
            if is_executable(&fallback) {
                debug!(
                    "Staged version {effective} is incomplete, using {}",
                    fallback.display()
                );
                self.maybe_check_for_update();
                return Ok(fallback);
            }
        }

        info!(
            "Stealth Chromium {baseline} not found. Downloading for {}...",
            paths.platform
        );
        let binary = self.stage_version(&paths, baseline).await?;
        self.maybe_check_for_update();
        Ok(binary)
    }

    /// Describes the effective installation without touching the network.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the host platform is not recognised.
    pub fn binary_info(&self) -> Result<BinaryInfo> {
        let paths = CachePaths::new(&self.config.cache_dir, self.platform()?);
        let version = effective_version(&paths, &self.config.baseline_version);
        let binary_path = paths.binary_path(&version);
        Ok(BinaryInfo {
            platform: paths.platform.to_string(),
            installed: binary_path.exists(),
            cache_dir: paths.version_dir(&version),
            download_url: self.config.download_url(&version, paths.platform),
            binary_path,
            version,
        })
    }

    /// Removes every cached build and all update state.
    ///
    /// The next [`ensure_binary`](Self::ensure_binary) downloads again.
    ///
    /// # Errors
    ///
    /// Returns a `Filesystem` error if the cache root cannot be removed.
    pub async fn clear_cache(&self) -> Result<()> {
        let root = &self.config.cache_dir;
        if tokio::fs::try_exists(root).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(root)
                .await
                .fs_context("Failed to remove cache", root)?;
            info!("Cache cleared: {}", root.display());
        }
        Ok(())
    }

    /// Resolves the platform to acquire for.
    pub(super) fn platform(&self) -> Result<Platform> {
        match self.config.platform {
            Some(platform) => Ok(platform),
            None => Platform::detect(),
        }
    }

    /// Resolves the platform, checks it has published binaries, and returns the cache layout.
    pub(super) fn cache_paths(&self) -> Result<CachePaths> {
        let platform = self.platform()?;
        platform.check_available(&self.config.available_platforms)?;
        Ok(CachePaths::new(&self.config.cache_dir, platform))
    }

    /// Downloads and extracts `version`, returning its verified binary path.
    ///
    /// Holds the lock for `version` for the whole operation and returns
    /// early if another caller already produced the binary.
    pub(super) async fn stage_version(&self, paths: &CachePaths, version: &str) -> Result<PathBuf> {
        let lock = self.version_lock(version);
        let _guard = lock.lock().await;

        let binary = paths.binary_path(version);
        if is_executable(&binary) {
            debug!("Version {version} was staged while waiting: {}", binary.display());
            return Ok(binary);
        }

        tokio::fs::create_dir_all(&paths.root)
            .await
            .fs_context("Failed to create directory", &paths.root)?;

        let url = self.config.download_url(version, paths.platform);
        let archive = StagingGuard::new(paths.staging_file(version));
        download_file(&url, archive.path(), self.config.download_timeout).await?;

        // The blocking task owns the staging file, so it is removed only
        // after extraction finishes even if this future is dropped.
        let paths = paths.clone();
        let version = version.to_string();
        tokio::task::spawn_blocking(move || install_archive(&archive, &paths, &version))
            .await
            .map_err(|e| {
                CloakError::filesystem("Extraction task failed", std::io::Error::other(e))
            })?
    }

    fn version_lock(&self, version: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .install_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(version.to_string()).or_default())
    }
}

/// Extracts `archive` aside and moves it to the version directory once the
/// binary is verified present.
fn install_archive(archive: &StagingGuard, paths: &CachePaths, version: &str) -> Result<PathBuf> {
    let staged = StagingGuard::new(paths.extraction_dir(version));
    let staged_binary = staged.path().join(paths.platform.binary_relative_path());
    extract_archive(archive.path(), staged.path(), &staged_binary)?;

    let binary = paths.binary_path(version);
    if !staged_binary.is_file() {
        return Err(CloakError::integrity(binary));
    }

    let version_dir = paths.version_dir(version);
    if version_dir.exists() {
        std::fs::remove_dir_all(&version_dir)
            .fs_context("Failed to remove directory", &version_dir)?;
    }
    std::fs::rename(staged.path(), &version_dir).fs_context("Failed to move into place", &version_dir)?;
    info!("Chromium {version} installed: {}", binary.display());
    Ok(binary)
}
