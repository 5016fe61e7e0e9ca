//! Sonos Relay - headless server that turns HTTP triggers into music.
//!
//! Arrival webhooks play a Sonos favorite; play requests search Spotify and
//! load the best match straight onto a speaker.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use relay_core::{bootstrap_services, start_server, AppState};
use tokio::signal;

use crate::config::ServerConfig;

/// Sonos Relay - arrival webhooks and Spotify-to-Sonos playback.
#[derive(Parser, Debug)]
#[command(name = "sonos-relay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE", env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "RELAY_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Speaker hostname or IP (overrides config file).
    #[arg(short = 's', long)]
    speaker: Option<String>,

    /// Speaker UPnP port (overrides config file).
    #[arg(long)]
    speaker_port: Option<u16>,

    /// Bind port (overrides config file).
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Data directory for persisted OAuth tokens.
    #[arg(short = 'd', long, env = "RELAY_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Sonos Relay v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(speaker) = args.speaker {
        config.speaker_host = Some(speaker);
    }
    if let Some(port) = args.speaker_port {
        config.speaker_port = port;
    }
    if let Some(port) = args.port {
        config.bind_port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = Some(data_dir);
    }

    match config.data_dir {
        Some(ref dir) => log::info!("Using data directory: {}", dir.display()),
        None => log::info!("No data directory configured - OAuth tokens will not persist"),
    }

    let core_config = config.to_core_config();
    log::info!(
        "Configuration: speaker={}:{}, bind_port={}",
        core_config.speaker_host.as_deref().unwrap_or("<unset>"),
        core_config.speaker_port,
        core_config.bind_port
    );

    let services = bootstrap_services(core_config).context(
        "Failed to bootstrap services. \
         Set speaker_host in the config file, --speaker or RELAY_SPEAKER_HOST.",
    )?;
    log::info!("Services bootstrapped successfully");

    let app_state = AppState::new(&services);
    start_server(app_state, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    log::info!("Shutdown signal received, cleaning up...");
    services.shutdown().await;

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
