//! Update command for the cloakbrowser CLI.
//!
//! ## Usage
//!
//! ```bash
//! cloakbrowser update
//! ```

use anyhow::Result;
use cloakbrowser::BinaryManager;

/// Executes the update command.
///
/// # Errors
///
/// Returns an error if the release feed cannot be read or the new build
/// cannot be staged.
pub async fn execute(manager: &BinaryManager) -> Result<()> {
    println!("Checking for updates...");
    match manager.check_for_update().await? {
        Some(version) => {
            println!("Chromium {version} is ready and will be used on next launch.");
        }
        None => println!("Chromium is up to date."),
    }
    Ok(())
}
