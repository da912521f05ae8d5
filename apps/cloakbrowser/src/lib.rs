#![warn(clippy::pedantic)]

//! # cloakbrowser
//!
//! Keeps the patched stealth Chromium build available on the local machine.
//! The browser launcher calls [`BinaryManager::ensure_binary`] and receives
//! the path of an executable binary, downloaded and cached on first use.
//!
//! ```rust,no_run
//! use cloakbrowser::{BinaryManager, Config};
//!
//! # async fn demo() -> cloakbrowser::Result<()> {
//! let manager = BinaryManager::new(Config::from_env()?);
//! let chrome = manager.ensure_binary().await?;
//! println!("Chromium at {}", chrome.display());
//! # Ok(())
//! # }
//! ```

pub mod binary;
pub mod config;
pub mod errors;

pub use binary::{BinaryInfo, BinaryManager, Platform};
pub use config::{CHROMIUM_VERSION, Config};
pub use errors::{CloakError, Result};
