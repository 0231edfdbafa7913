//! Shutdown signals for the ringer-cycle daemon
//!
//! `main` stops the controller and removes the IPC socket once one of
//! these arrives.

use tokio::signal::unix::{signal, SignalKind};
use tracing::debug;

/// Signal that ended the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGTERM, e.g. from the service manager
    Terminate,
    /// SIGINT, e.g. Ctrl-C in a terminal
    Interrupt,
}

impl std::fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownReason::Terminate => write!(f, "SIGTERM"),
            ShutdownReason::Interrupt => write!(f, "SIGINT"),
        }
    }
}

/// Waits for the daemon's shutdown signals
#[derive(Debug, Default)]
pub struct ShutdownSignal;

impl ShutdownSignal {
    pub fn new() -> Self {
        Self
    }

    /// Resolve with the first shutdown signal received.
    ///
    /// Fails only if the handlers cannot be registered.
    pub async fn wait(&self) -> std::io::Result<ShutdownReason> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        let reason = tokio::select! {
            _ = sigterm.recv() => ShutdownReason::Terminate,
            _ = sigint.recv() => ShutdownReason::Interrupt,
        };

        debug!(%reason, "shutdown signal");
        Ok(reason)
    }
}
