//! Info command for the cloakbrowser CLI.
//!
//! ## Usage
//!
//! ```bash
//! cloakbrowser info
//! cloakbrowser info --json
//! ```
//!
//! ## Output Format
//!
//! ```text
//! Version:      142.0.7444.175
//! Platform:     linux-x64
//! Binary:       /home/user/.cloakbrowser/chromium-142.0.7444.175/chrome
//! Installed:    yes
//! Cache:        /home/user/.cloakbrowser/chromium-142.0.7444.175
//! Download URL: https://cloakbrowser.dev/chromium-v142.0.7444.175/cloakbrowser-linux-x64.tar.gz
//! ```

use anyhow::{Context, Result};
use clap::Args;
use cloakbrowser::BinaryManager;

/// Arguments for the info command.
#[derive(Args)]
pub struct InfoArgs {
    /// Print machine-readable JSON.
    #[clap(long)]
    pub json: bool,
}

/// Executes the info command.
///
/// # Errors
///
/// Returns an error if the platform is not recognised.
pub fn execute(manager: &BinaryManager, args: &InfoArgs) -> Result<()> {
    let info = manager.binary_info()?;

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize info")?;
        println!("{json}");
        return Ok(());
    }

    println!("Version:      {}", info.version);
    println!("Platform:     {}", info.platform);
    println!("Binary:       {}", info.binary_path.display());
    println!("Installed:    {}", if info.installed { "yes" } else { "no" });
    println!("Cache:        {}", info.cache_dir.display());
    println!("Download URL: {}", info.download_url);
    if let Some(path) = &manager.config().binary_override {
        println!();
        println!("Local override in effect: {}", path.display());
    }
    Ok(())
}
