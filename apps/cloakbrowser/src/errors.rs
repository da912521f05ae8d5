//! Error types for binary acquisition.
//!
//! Every failure the foreground path can surface falls into one of four
//! classes. Callers that launch the browser match on the variant to decide
//! whether the problem is local configuration, the network, a broken
//! release artifact, or the local filesystem.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where to report packaging defects in published artifacts.
pub const ISSUES_URL: &str = "https://github.com/CloakHQ/cloakbrowser/issues";

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, CloakError>;

/// Consolidated error type for binary acquisition.
#[derive(Debug, Error)]
pub enum CloakError {
    /// Unsupported or unavailable platform, or a local override that does not exist.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of what is misconfigured.
        message: String,
    },

    /// HTTP failure: bad status, missing body, timeout or connection error.
    #[error("network error: {message}")]
    Network {
        /// Description including the URL and, where known, the status code.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Extraction finished but the expected binary is missing.
    ///
    /// This points at a packaging defect in the remote artifact and is never
    /// retried.
    #[error(
        "download completed but binary not found at expected path: {}. \
         This may indicate a packaging issue. Please report at {ISSUES_URL}",
        path.display()
    )]
    Integrity {
        /// The binary path that should exist after extraction.
        path: PathBuf,
    },

    /// Local I/O failure during mkdir, rename, chmod, remove or write.
    #[error("filesystem error: {message}")]
    Filesystem {
        /// Description of the operation that failed.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl CloakError {
    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Network` error without an underlying cause.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `Network` error with a source error.
    #[must_use]
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a new `Integrity` error for a missing binary.
    #[must_use]
    pub fn integrity(path: impl Into<PathBuf>) -> Self {
        Self::Integrity { path: path.into() }
    }

    /// Creates a new `Filesystem` error from an I/O error with context.
    #[must_use]
    pub fn filesystem(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Filesystem {
            message: message.into(),
            source,
        }
    }

    /// Returns `true` for errors caused by the network.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// Extension for attaching a path-bearing message to `io::Result`.
pub(crate) trait IoContext<T> {
    /// Wraps the error as `CloakError::Filesystem` with `"{action}: {path}"`.
    fn fs_context(self, action: &str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn fs_context(self, action: &str, path: &Path) -> Result<T> {
        self.map_err(|e| CloakError::filesystem(format!("{action}: {}", path.display()), e))
    }
}
