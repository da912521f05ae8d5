//! Install command for the cloakbrowser CLI.
//!
//! ## Usage
//!
//! ```bash
//! cloakbrowser install
//! ```

use anyhow::Result;
use cloakbrowser::{BinaryManager, Config};

/// Executes the install command.
///
/// Prints the path of the executable on stdout so scripts can capture it.
/// No background update check is started, since the process exits before
/// one could finish; `cloakbrowser update` checks explicitly.
///
/// # Errors
///
/// Returns an error if the binary cannot be acquired.
pub async fn execute(mut config: Config) -> Result<()> {
    config.auto_update = false;
    let manager = BinaryManager::new(config);
    let path = manager.ensure_binary().await?;
    println!("{}", path.display());
    Ok(())
}
