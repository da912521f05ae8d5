//! Acquisition of the patched Chromium binary.
//!
//! This module makes sure an executable Chromium build is present in the
//! local cache before the browser is launched, and keeps it fresh in the
//! background.
//!
//! ## Module Structure
//!
//! - [`platform`] - OS and architecture detection
//! - [`paths`] - Cache directory layout
//! - [`version`] - Version comparison and effective-version resolution
//! - [`releases`] - Release feed lookup
//! - [`download`] - Streaming HTTP download with a deadline
//! - [`archive`] - Safe tar.gz extraction
//! - [`manager`] - `ensure_binary` and cache management
//! - [`update`] - Rate-limited background update checks

pub mod archive;
pub mod download;
pub mod manager;
pub mod paths;
pub mod platform;
pub mod releases;
pub mod update;
pub mod version;

pub use archive::extract_archive;
pub use download::download_file;
pub use manager::{BinaryInfo, BinaryManager};
pub use paths::CachePaths;
pub use platform::Platform;
pub use releases::latest_remote_version;
pub use version::{Version, effective_version, is_newer};
