//! Clear-cache command for the cloakbrowser CLI.
//!
//! ## Usage
//!
//! ```bash
//! cloakbrowser clear-cache
//! ```

use anyhow::Result;
use cloakbrowser::BinaryManager;

/// Executes the clear-cache command.
///
/// # Errors
///
/// Returns an error if the cache directory cannot be removed.
pub async fn execute(manager: &BinaryManager) -> Result<()> {
    manager.clear_cache().await?;
    println!(
        "Removed {}. The binary will be downloaded again on next install.",
        manager.config().cache_dir.display()
    );
    Ok(())
}
