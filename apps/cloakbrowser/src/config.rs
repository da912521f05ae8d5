//! Runtime configuration for binary acquisition.
//!
//! A [`Config`] is built once at process start, usually with
//! [`Config::from_env`], and handed to [`crate::BinaryManager`]. Nothing
//! else in the crate reads the environment.
//!
//! ## Environment Variables
//!
//! - `CLOAKBROWSER_CACHE_DIR`: cache root (default `~/.cloakbrowser`)
//! - `CLOAKBROWSER_BINARY_PATH`: use this Chromium build, skip all downloads
//! - `CLOAKBROWSER_DOWNLOAD_URL`: custom distribution server; disables auto-update
//! - `CLOAKBROWSER_AUTO_UPDATE`: set to `false` to disable background updates
//! - `CLOAKBROWSER_DEBUG`: report background update failures as warnings
//!
//! Empty or whitespace-only values are treated as unset.

use std::path::PathBuf;
use std::time::Duration;

use crate::binary::Platform;
use crate::errors::{CloakError, Result};

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "CLOAKBROWSER_CACHE_DIR";

/// Environment variable pointing at a local Chromium build.
pub const BINARY_PATH_ENV: &str = "CLOAKBROWSER_BINARY_PATH";

/// Environment variable overriding the distribution server.
pub const DOWNLOAD_URL_ENV: &str = "CLOAKBROWSER_DOWNLOAD_URL";

/// Environment variable controlling background updates.
pub const AUTO_UPDATE_ENV: &str = "CLOAKBROWSER_AUTO_UPDATE";

/// Environment variable surfacing swallowed background failures.
pub const DEBUG_ENV: &str = "CLOAKBROWSER_DEBUG";

/// Chromium version shipped with this release.
pub const CHROMIUM_VERSION: &str = "142.0.7444.175";

/// Default distribution server for release assets.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://cloakbrowser.dev";

/// Release listing used by the update checker.
pub const DEFAULT_RELEASES_URL: &str = "https://api.github.com/repos/CloakHQ/cloakbrowser/releases";

/// Prefix of release tags that carry a Chromium build.
pub const RELEASE_TAG_PREFIX: &str = "chromium-v";

/// Prefix of version directories and release paths.
pub const ARTIFACT_PREFIX: &str = "chromium";

/// Prefix of the per-platform archive name.
pub const PACKAGE_PREFIX: &str = "cloakbrowser";

/// Name of the cache directory under the user's home.
const DEFAULT_CACHE_DIR_NAME: &str = ".cloakbrowser";

/// Wall-clock limit for a single artifact download (large binary, 10 minutes).
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Wall-clock limit for the release feed request.
pub const RELEASES_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum time between background update checks.
pub const UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(3600);

/// Platforms with published binaries.
pub const AVAILABLE_PLATFORMS: [Platform; 3] = [
    Platform::LinuxX64,
    Platform::DarwinArm64,
    Platform::DarwinX64,
];

/// Process-wide settings for acquiring the Chromium binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the on-disk cache.
    pub cache_dir: PathBuf,
    /// Operator-supplied binary; bypasses version, platform and cache logic.
    pub binary_override: Option<PathBuf>,
    /// Base URL release assets are fetched from.
    pub download_base_url: String,
    /// Whether `download_base_url` was chosen by the operator.
    pub custom_download_source: bool,
    /// Release listing queried for newer versions.
    pub releases_url: String,
    /// Whether background update checks may run.
    pub auto_update: bool,
    /// Report background failures at warn level instead of debug.
    pub debug: bool,
    /// Version compiled into this release.
    pub baseline_version: String,
    /// Platforms with published binaries.
    pub available_platforms: Vec<Platform>,
    /// Platform to acquire for; detected from the host when `None`.
    pub platform: Option<Platform>,
    /// Limit for a single artifact download.
    pub download_timeout: Duration,
    /// Limit for the release feed request.
    pub releases_timeout: Duration,
    /// Minimum time between background update checks.
    pub update_check_interval: Duration,
}

impl Config {
    /// Builds a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if no cache root is set and the home
    /// directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        let cache_dir = match env_value(CACHE_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    CloakError::configuration(format!(
                        "Cannot determine home directory. Set {CACHE_DIR_ENV} environment variable."
                    ))
                })?
                .join(DEFAULT_CACHE_DIR_NAME),
        };

        let mut config = Self::with_cache_dir(cache_dir);
        config.binary_override = env_value(BINARY_PATH_ENV).map(PathBuf::from);
        if let Some(url) = env_value(DOWNLOAD_URL_ENV) {
            config.download_base_url = url;
            config.custom_download_source = true;
        }
        config.auto_update = env_value(AUTO_UPDATE_ENV).is_none_or(|v| !is_falsy(&v));
        config.debug = env_value(DEBUG_ENV).is_some_and(|v| !is_falsy(&v));
        Ok(config)
    }

    /// Creates a default configuration rooted at `cache_dir`.
    ///
    /// Does not consult the environment, which makes it the constructor of
    /// choice for tests and embedders.
    #[must_use = "returns new config without side effects"]
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            binary_override: None,
            download_base_url: DEFAULT_DOWNLOAD_URL.to_string(),
            custom_download_source: false,
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            auto_update: true,
            debug: false,
            baseline_version: CHROMIUM_VERSION.to_string(),
            available_platforms: AVAILABLE_PLATFORMS.to_vec(),
            platform: None,
            download_timeout: DOWNLOAD_TIMEOUT,
            releases_timeout: RELEASES_TIMEOUT,
            update_check_interval: UPDATE_CHECK_INTERVAL,
        }
    }

    /// Returns the archive URL for `version` on `platform`.
    ///
    /// Format: `{base}/chromium-v{version}/cloakbrowser-{platform}.tar.gz`
    #[must_use = "returns the URL without side effects"]
    pub fn download_url(&self, version: &str, platform: Platform) -> String {
        let base = self.download_base_url.trim().trim_end_matches('/');
        format!("{base}/{ARTIFACT_PREFIX}-v{version}/{PACKAGE_PREFIX}-{platform}.tar.gz")
    }
}

/// Reads an environment variable, treating empty and whitespace-only values as unset.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_falsy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_ENV: [&str; 5] = [
        CACHE_DIR_ENV,
        BINARY_PATH_ENV,
        DOWNLOAD_URL_ENV,
        AUTO_UPDATE_ENV,
        DEBUG_ENV,
    ];

    fn clear_env() {
        for name in ALL_ENV {
            // SAFETY: env-mutating tests are serialised with #[serial].
            unsafe { std::env::remove_var(name) };
        }
    }

    fn set_env(name: &str, value: &str) {
        // SAFETY: env-mutating tests are serialised with #[serial].
        unsafe { std::env::set_var(name, value) };
    }

    #[test]
    fn default_url_format() {
        let config = Config::with_cache_dir("/tmp/cache");
        let url = config.download_url(CHROMIUM_VERSION, Platform::LinuxX64);
        assert_eq!(
            url,
            "https://cloakbrowser.dev/chromium-v142.0.7444.175/cloakbrowser-linux-x64.tar.gz"
        );
    }

    #[test]
    fn custom_version_url() {
        let config = Config::with_cache_dir("/tmp/cache");
        let url = config.download_url("145.0.7718.0", Platform::DarwinArm64);
        assert!(url.contains("chromium-v145.0.7718.0"));
        assert!(url.ends_with("cloakbrowser-darwin-arm64.tar.gz"));
    }

    #[test]
    fn download_url_trims_trailing_slash() {
        let mut config = Config::with_cache_dir("/tmp/cache");
        config.download_base_url = "http://localhost:8080/".to_string();
        assert_eq!(
            config.download_url("1.2.3.4", Platform::LinuxX64),
            "http://localhost:8080/chromium-v1.2.3.4/cloakbrowser-linux-x64.tar.gz"
        );
    }

    #[test]
    #[serial]
    fn from_env_uses_defaults() {
        clear_env();
        set_env(CACHE_DIR_ENV, "/tmp/cloak-cache");

        let config = Config::from_env().expect("config");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cloak-cache"));
        assert!(config.binary_override.is_none());
        assert!(!config.custom_download_source);
        assert_eq!(config.download_base_url, DEFAULT_DOWNLOAD_URL);
        assert!(config.auto_update);
        assert!(!config.debug);
        assert_eq!(config.baseline_version, CHROMIUM_VERSION);

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_reads_overrides() {
        clear_env();
        set_env(CACHE_DIR_ENV, "/tmp/cloak-cache");
        set_env(BINARY_PATH_ENV, "/opt/chromium/chrome");
        set_env(DOWNLOAD_URL_ENV, "https://my-mirror.com");
        set_env(DEBUG_ENV, "1");

        let config = Config::from_env().expect("config");
        assert_eq!(
            config.binary_override,
            Some(PathBuf::from("/opt/chromium/chrome"))
        );
        assert_eq!(config.download_base_url, "https://my-mirror.com");
        assert!(config.custom_download_source);
        assert!(config.debug);

        clear_env();
    }

    #[test]
    #[serial]
    fn auto_update_disabled_case_insensitive() {
        clear_env();
        set_env(CACHE_DIR_ENV, "/tmp/cloak-cache");

        for value in ["false", "False", "0", "off"] {
            set_env(AUTO_UPDATE_ENV, value);
            assert!(!Config::from_env().expect("config").auto_update, "{value}");
        }
        set_env(AUTO_UPDATE_ENV, "true");
        assert!(Config::from_env().expect("config").auto_update);

        clear_env();
    }

    #[test]
    #[serial]
    fn whitespace_values_are_unset() {
        clear_env();
        set_env(CACHE_DIR_ENV, "/tmp/cloak-cache");
        set_env(BINARY_PATH_ENV, "   ");
        set_env(DOWNLOAD_URL_ENV, "");

        let config = Config::from_env().expect("config");
        assert!(config.binary_override.is_none());
        assert!(!config.custom_download_source);

        clear_env();
    }
}
