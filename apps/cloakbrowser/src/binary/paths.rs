//! On-disk layout of the binary cache.
//!
//! The default root is `~/.cloakbrowser/`, overridable with
//! `CLOAKBROWSER_CACHE_DIR`.
//!
//! ## Directory Structure
//!
//! ```text
//! ~/.cloakbrowser/                    # Root directory (or CLOAKBROWSER_CACHE_DIR)
//!   chromium-142.0.7444.175/          # One directory per staged version
//!     chrome                          # Linux binary
//!     Chromium.app/Contents/MacOS/Chromium   # macOS binary
//!   latest_version                    # Newest version staged by the updater
//!   .last_update_check                # Epoch milliseconds of the last check
//!   .download-*.tar.gz                # Staging archives, removed after each attempt
//!   .extract-*/                       # Private extraction dirs, renamed into place
//! ```
//!
//! This is the only module that knows these shapes.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::Platform;
use crate::config::ARTIFACT_PREFIX;

/// File holding the newest version known to the update checker.
const VERSION_MARKER_FILE: &str = "latest_version";

/// File holding the time of the last background update check.
const LAST_CHECK_FILE: &str = ".last_update_check";

/// Manages paths inside the binary cache.
#[derive(Debug, Clone)]
pub struct CachePaths {
    /// Root directory for all cached data.
    pub root: PathBuf,
    /// Platform whose binary layout applies.
    pub platform: Platform,
}

impl CachePaths {
    /// Creates a new `CachePaths` for `platform` rooted at `root`.
    #[must_use = "returns new paths instance without side effects"]
    pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            root: root.into(),
            platform,
        }
    }

    /// Returns the directory a version is extracted into.
    #[must_use = "returns the path without side effects"]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.root.join(format!("{ARTIFACT_PREFIX}-{version}"))
    }

    /// Returns the expected browser executable for a version.
    #[must_use = "returns the path without side effects"]
    pub fn binary_path(&self, version: &str) -> PathBuf {
        self.version_dir(version)
            .join(self.platform.binary_relative_path())
    }

    /// Returns the path of the version marker file.
    #[must_use = "returns the path without side effects"]
    pub fn version_marker(&self) -> PathBuf {
        self.root.join(VERSION_MARKER_FILE)
    }

    /// Returns the path of the last-check timestamp file.
    #[must_use = "returns the path without side effects"]
    pub fn last_check_file(&self) -> PathBuf {
        self.root.join(LAST_CHECK_FILE)
    }

    /// Returns a fresh staging file path for downloading `version`.
    ///
    /// Names carry a millisecond timestamp and a random suffix so that
    /// concurrent downloads never share a file.
    #[must_use]
    pub fn staging_file(&self, version: &str) -> PathBuf {
        self.root
            .join(format!(".download-{}-{version}-{}.tar.gz", self.platform, unique_suffix()))
    }

    /// Returns a fresh directory path to extract `version` into before it
    /// is moved to [`version_dir`](Self::version_dir).
    #[must_use]
    pub fn extraction_dir(&self, version: &str) -> PathBuf {
        self.root
            .join(format!(".extract-{}-{version}-{}", self.platform, unique_suffix()))
    }

    /// Checks if a version directory exists on disk.
    #[must_use = "returns installation status without side effects"]
    pub fn is_version_staged(&self, version: &str) -> bool {
        self.version_dir(version).is_dir()
    }
}

fn unique_suffix() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    let random: u32 = rand::random();
    format!("{millis}-{random:08x}")
}

/// Removes a staging file or directory when dropped.
///
/// Dropping happens on every exit path, including cancellation of the
/// future that owns the guard, so partial downloads never outlive the
/// attempt that created them.
#[derive(Debug)]
pub struct StagingGuard {
    path: PathBuf,
}

impl StagingGuard {
    /// Takes ownership of `path`; nothing is created on disk.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the guarded path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        let _ = if self.path.is_dir() {
            std::fs::remove_dir_all(&self.path)
        } else {
            std::fs::remove_file(&self.path)
        };
    }
}

/// Returns `true` if `path` is a regular file the current user may execute.
#[cfg(unix)]
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

/// Returns `true` if `path` is a regular file.
#[cfg(not(unix))]
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;

    #[test]
    fn version_dir_uses_artifact_prefix() {
        let paths = CachePaths::new("/cache", Platform::LinuxX64);
        assert_eq!(
            paths.version_dir("142.0.7444.175"),
            PathBuf::from("/cache/chromium-142.0.7444.175")
        );
    }

    #[test]
    fn binary_path_linux_is_flat() {
        let paths = CachePaths::new("/cache", Platform::LinuxX64);
        assert_eq!(
            paths.binary_path("1.0"),
            PathBuf::from("/cache/chromium-1.0/chrome")
        );
    }

    #[test]
    fn binary_path_macos_is_app_bundle() {
        let paths = CachePaths::new("/cache", Platform::DarwinArm64);
        assert_eq!(
            paths.binary_path("1.0"),
            PathBuf::from("/cache/chromium-1.0/Chromium.app/Contents/MacOS/Chromium")
        );
    }

    #[test]
    fn state_files_live_at_root() {
        let paths = CachePaths::new("/cache", Platform::LinuxX64);
        assert_eq!(paths.version_marker(), PathBuf::from("/cache/latest_version"));
        assert_eq!(
            paths.last_check_file(),
            PathBuf::from("/cache/.last_update_check")
        );
    }

    #[test]
    fn staging_files_are_unique() {
        let paths = CachePaths::new("/cache", Platform::LinuxX64);
        let a = paths.staging_file("1.0");
        let b = paths.staging_file("1.0");
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("/cache")));
        let name = a.file_name().and_then(|n| n.to_str()).expect("utf-8 name");
        assert!(name.starts_with(".download-linux-x64-1.0-"));
        assert!(name.ends_with(".tar.gz"));
    }

    #[test]
    fn extraction_dirs_are_unique() {
        let paths = CachePaths::new("/cache", Platform::DarwinX64);
        let a = paths.extraction_dir("1.0");
        assert_ne!(a, paths.extraction_dir("1.0"));
        let name = a.file_name().and_then(|n| n.to_str()).expect("utf-8 name");
        assert!(name.starts_with(".extract-darwin-x64-1.0-"));
    }

    #[test]
    fn staging_guard_removes_file_and_directory() {
        let temp = TempDir::new().expect("temp dir");
        let file = temp.path().join(".download-x.tar.gz");
        std::fs::write(&file, b"partial").expect("write");
        drop(StagingGuard::new(file.clone()));
        assert!(!file.exists());

        let dir = temp.path().join(".extract-x");
        std::fs::create_dir_all(dir.join("nested")).expect("mkdir");
        std::fs::write(dir.join("nested").join("chrome"), b"bin").expect("write");
        drop(StagingGuard::new(dir.clone()));
        assert!(!dir.exists());

        // Guarding a path that was never created is fine.
        drop(StagingGuard::new(temp.path().join("missing")));
    }

    #[test]
    fn is_version_staged_checks_directory() {
        let temp = TempDir::new().expect("temp dir");
        let paths = CachePaths::new(temp.path(), Platform::LinuxX64);
        assert!(!paths.is_version_staged("1.0"));
        std::fs::create_dir_all(paths.version_dir("1.0")).expect("mkdir");
        assert!(paths.is_version_staged("1.0"));
    }

    #[cfg(unix)]
    #[test]
    fn is_executable_requires_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("temp dir");
        let file = temp.path().join("chrome");
        std::fs::write(&file, b"#!/bin/sh\n").expect("write");
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o644)).expect("chmod");
        assert!(!is_executable(&file));

        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        assert!(is_executable(&file));

        assert!(!is_executable(temp.path()));
        assert!(!is_executable(&temp.path().join("missing")));
    }
}
