//! ringer-cycle-daemon: sound mode cycler over simulated device services
//!
//! Provides:
//! - The mode cycler, hosted by a controller that applies events serially
//! - Simulated ringer, settings file, vibrator and settings screen
//! - IPC server for clicks, long presses, simulated device changes,
//!   status queries and event subscriptions

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ringer_cycle::config::Config;
use ringer_cycle::controller::{Controller, Services};
use ringer_cycle::events::{CyclerEvent, HostEvent};
use ringer_cycle::ipc::{Server, ServerLinks};
use ringer_cycle::lifecycle::ShutdownSignal;
use ringer_cycle::mode::RingerMode;
use ringer_cycle::services::simulated::{
    JsonSettingsStore, LoggingSystemActions, LoggingVibrator, SimulatedAudio,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "ringer-cycle-daemon starting"
    );

    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, ?config.settings_path, "configuration loaded");

    let shutdown = ShutdownSignal::new();

    // Simulated device
    let audio = Arc::new(SimulatedAudio::new(RingerMode::Normal));
    let settings = Arc::new(
        JsonSettingsStore::open(&config.settings_path).context("failed to open settings store")?,
    );
    let services = Services {
        audio: audio.clone(),
        vibrator: Arc::new(LoggingVibrator),
        settings: settings.clone(),
        actions: Arc::new(LoggingSystemActions),
    };

    // IPC server -> controller
    let (host_tx, host_rx) = mpsc::channel::<HostEvent>(32);
    // Controller -> IPC subscribers
    let (event_tx, mut log_rx) = broadcast::channel::<CyclerEvent>(64);

    // Subscribed before setup so setup events reach the log
    let mut controller = Controller::setup(services, event_tx.clone());

    let server = Server::new(
        &config.socket_path,
        ServerLinks {
            host_tx,
            event_tx: event_tx.clone(),
            snapshot_rx: controller.subscribe_snapshots(),
            audio,
            settings,
        },
    )?;

    info!("daemon initialized, entering main loop");

    tokio::select! {
        _ = controller.run(host_rx) => {
            info!("controller exited");
        }

        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        _ = async {
            loop {
                match log_rx.recv().await {
                    Ok(event) => info!(%event, "cycler event"),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "cycler event log lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("cycler event log exited");
        }

        result = shutdown.wait() => {
            match result {
                Ok(reason) => info!(%reason, "shutdown signal received"),
                Err(e) => error!(?e, "failed to register signal handlers"),
            }
        }
    }

    info!("shutting down...");

    server.shutdown().await;

    info!("ringer-cycle-daemon stopped");

    Ok(())
}
