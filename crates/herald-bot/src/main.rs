//! Main entry point for Herald.

use anyhow::Context as _;
use clap::Parser;
use herald_bot::HeraldBot;
use herald_commands::commands::manifest;
use herald_common::init_logging;
use herald_config::ConfigLoader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "herald", version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "HERALD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level filter, overriding the configuration file.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?;

    let mut logging = config.logging.to_logging_config();
    if let Some(level) = args.log_level {
        logging.level = level;
    }
    let _log_guard = init_logging(&logging).context("Failed to initialize logging")?;

    info!("Starting Herald v{}", env!("CARGO_PKG_VERSION"));

    let bot = HeraldBot::new(Arc::new(config), manifest())?;
    if let Err(e) = bot.start().await {
        error!("Bot stopped: {}", e);
        return Err(e.into());
    }

    info!("Herald shut down");
    Ok(())
}
