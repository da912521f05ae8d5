#![warn(clippy::pedantic)]

//! # cloakbrowser CLI
//!
//! Manages the stealth Chromium binary from the command line. The browser
//! itself is launched by the automation wrapper; this tool only acquires,
//! inspects and refreshes the cached build.
//!
//! ## Subcommands
//!
//! - `install` - Download the binary if needed and print its path
//! - `info` - Show the effective version and cache location
//! - `update` - Check for a newer Chromium build now
//! - `clear-cache` - Remove every cached build
//!
//! ## Examples
//!
//! ```bash
//! cloakbrowser install
//! cloakbrowser info --json
//! CLOAKBROWSER_CACHE_DIR=/tmp/cb cloakbrowser update -v
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cloakbrowser::{BinaryManager, Config};
use commands::{clear_cache, info, install, update};
use tracing_subscriber::EnvFilter;

/// Stealth Chromium binary manager.
#[derive(Parser)]
#[command(
    name = "cloakbrowser",
    author,
    version,
    about = "Download, cache and update the cloakbrowser Chromium build",
    after_help = "\
ENVIRONMENT VARIABLES:
    CLOAKBROWSER_CACHE_DIR      Cache directory (default: ~/.cloakbrowser)
    CLOAKBROWSER_BINARY_PATH    Use a local Chromium build, skip downloads
    CLOAKBROWSER_DOWNLOAD_URL   Custom distribution server (disables auto-update)
    CLOAKBROWSER_AUTO_UPDATE    Set to 'false' to disable background updates
    CLOAKBROWSER_DEBUG          Report background update failures
    RUST_LOG                    Log filter (overrides --verbose)"
)]
pub struct Cli {
    /// Increase log verbosity (-v for debug output).
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Ensure the Chromium binary is installed and print its path.
    ///
    /// Downloads the bundled version on first use. Later runs return the
    /// cached binary without touching the network.
    Install,

    /// Show the effective Chromium version and where it lives.
    Info(info::InfoArgs),

    /// Check for a newer Chromium build and stage it.
    ///
    /// Ignores the hourly rate limit and reports every failure.
    Update,

    /// Remove all cached Chromium builds.
    ///
    /// The next install downloads the binary again.
    ClearCache,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = if verbose == 0 {
        "cloakbrowser=info"
    } else {
        "cloakbrowser=debug"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::from_env()?;

    match cli.command {
        Commands::Install => install::execute(config).await,
        Commands::Info(args) => info::execute(&BinaryManager::new(config), &args),
        Commands::Update => update::execute(&BinaryManager::new(config)).await,
        Commands::ClearCache => clear_cache::execute(&BinaryManager::new(config)).await,
    }
}
