//! Command modules for the cloakbrowser CLI.
//!
//! - [`install`] - Ensure the binary is present
//! - [`info`] - Describe the current installation
//! - [`update`] - Explicit update check
//! - [`clear_cache`] - Remove cached builds

pub mod clear_cache;
pub mod info;
pub mod install;
pub mod update;
