//! Headless driver for the skyblock teleport subsystem.
//!
//! Loads the plugin config, then runs a scripted group of players through
//! island teleports on an in-memory server until every teleport has either
//! landed or been cancelled.

mod simulation;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use skyblock_core::config::SkyblockConfig;
use skyblock_core::teleport::timer::TokioTimer;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::simulation::Simulation;

const DEFAULT_CONFIG_PATH: &str = "config/skyblock.json5";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config_path = env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = SkyblockConfig::load_or_create(&config_path)?;
    log::info!(
        "Loaded config from {} (delay {}s, cancel distance {})",
        config_path.display(),
        config.teleport.delay_seconds,
        config.teleport.cancel_distance
    );

    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {err}");
            return;
        }
        log::info!("Received Ctrl-C, shutting down");
        signal_token.cancel();
    });

    let simulation = Simulation::new(&config, Arc::new(TokioTimer::current()));
    simulation.start()?;
    simulation.run(cancel_token).await;
    simulation.report();

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
