//! KayClipper CLI
//!
//! Downloads a time range of an online video into a local file.
//!
//! # Usage
//!
//! ```bash
//! kayclipper clip --url "https://youtu.be/..." --start 1:30 --end 2:00 --output clip.mp4
//! kayclipper clip --url "https://youtu.be/..." --format mp3 --output song
//! kayclipper deps --yes
//! kayclipper probe
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};

use kayclipper::app::DefaultAppContainer;
use kayclipper::cli::console::PromptConsent;
use kayclipper::cli::{commands, Cli, Commands};
use kayclipper::config_initialization::{initialize_configuration, FetchPolicy};
use kayclipper::ports::{DownloadConsent, FixedConsent};
use kayclipper::utils::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration(&cli).context("Failed to load configuration")?;
    init_logging(&config.logging);
    debug!("Configuration: {:?}", config);

    let consent: Arc<dyn DownloadConsent> = match config.clipper.fetch_policy {
        FetchPolicy::Always => Arc::new(FixedConsent(true)),
        FetchPolicy::Never => Arc::new(FixedConsent(false)),
        FetchPolicy::Ask => Arc::new(PromptConsent),
    };
    let container = DefaultAppContainer::new(&config, consent)
        .context("Failed to set up the clipper")?;

    match cli.command {
        Commands::Clip(args) => {
            info!("Executing clip command");
            commands::clip(&container, args, &config).await?;
        }
        Commands::Deps(args) => {
            info!("Executing deps command");
            commands::deps(&container, args).await?;
        }
        Commands::Probe(args) => {
            info!("Executing probe command");
            commands::probe(&container, args).await?;
        }
    }

    Ok(())
}
