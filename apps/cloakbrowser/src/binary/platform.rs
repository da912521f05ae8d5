//! Platform detection for the Chromium binary.
//!
//! Maps the host OS and CPU architecture to the tag used in release asset
//! names. Recognition and availability are separate: a platform can be
//! recognised here before any binary has been published for it, in which
//! case [`Platform::check_available`] rejects it.
//!
//! ## Recognised Platforms
//!
//! - Linux `x86_64` (`linux-x64`)
//! - Linux ARM64 (`linux-arm64`)
//! - macOS ARM64 (`darwin-arm64`)
//! - macOS `x86_64` (`darwin-x64`)

use std::fmt;
use std::path::PathBuf;

use crate::errors::{CloakError, Result};

/// Represents a recognised platform for the Chromium binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux on `x86_64`
    LinuxX64,
    /// Linux on ARM64
    LinuxArm64,
    /// macOS on Apple Silicon
    DarwinArm64,
    /// macOS on Intel
    DarwinX64,
}

impl Platform {
    /// Every recognised platform, in table order.
    pub const ALL: [Platform; 4] = [
        Self::LinuxX64,
        Self::LinuxArm64,
        Self::DarwinArm64,
        Self::DarwinX64,
    ];

    /// Detects the host platform from `std::env::consts`.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error listing every recognised tag if the
    /// host combination is not in the table.
    pub fn detect() -> Result<Self> {
        Self::from_os_arch(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Looks up an OS/architecture pair (as spelled by `std::env::consts`).
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error for any pair absent from the table.
    pub fn from_os_arch(os: &str, arch: &str) -> Result<Self> {
        match (os, arch) {
            ("linux", "x86_64") => Ok(Self::LinuxX64),
            ("linux", "aarch64") => Ok(Self::LinuxArm64),
            ("macos", "aarch64") => Ok(Self::DarwinArm64),
            ("macos", "x86_64") => Ok(Self::DarwinX64),
            _ => Err(CloakError::configuration(format!(
                "Unsupported platform: {os} {arch}. Supported: {}",
                join_tags(&Self::ALL)
            ))),
        }
    }

    /// Returns the tag used in release asset names.
    #[must_use = "returns the platform string without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinuxX64 => "linux-x64",
            Self::LinuxArm64 => "linux-arm64",
            Self::DarwinArm64 => "darwin-arm64",
            Self::DarwinX64 => "darwin-x64",
        }
    }

    /// Returns whether this is a macOS platform.
    #[must_use]
    pub fn is_macos(self) -> bool {
        matches!(self, Self::DarwinArm64 | Self::DarwinX64)
    }

    /// Location of the browser executable inside an extracted version directory.
    ///
    /// macOS ships an application bundle, Linux a flat directory.
    #[must_use]
    pub fn binary_relative_path(self) -> PathBuf {
        if self.is_macos() {
            ["Chromium.app", "Contents", "MacOS", "Chromium"]
                .iter()
                .collect()
        } else {
            PathBuf::from("chrome")
        }
    }

    /// Fails unless a binary is published for this platform.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error naming the available tags and the
    /// `CLOAKBROWSER_BINARY_PATH` escape hatch.
    pub fn check_available(self, available: &[Platform]) -> Result<()> {
        if available.contains(&self) {
            return Ok(());
        }
        Err(CloakError::configuration(format!(
            "Pre-built binaries are not yet available for {self}. \
             Available: {}. \
             Set CLOAKBROWSER_BINARY_PATH to use a locally built Chromium instead.",
            join_tags(available)
        )))
    }
}

fn join_tags(platforms: &[Platform]) -> String {
    platforms
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
