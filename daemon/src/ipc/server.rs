//! Unix domain socket server for IPC
//!
//! Turns client requests into host events for the controller, and streams
//! cycler events to subscribed clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::controller::Snapshot;
use crate::events::{CyclerEvent, HostEvent};
use crate::services::{AudioService, SettingsStore};

use super::protocol::{DaemonStatus, Notification, Request, Response, MAX_FRAME_LEN};

/// Channels and device handles the server works with
pub struct ServerLinks {
    /// Host events for the controller
    pub host_tx: mpsc::Sender<HostEvent>,
    /// Cycler events, subscribed to per client
    pub event_tx: broadcast::Sender<CyclerEvent>,
    /// Latest controller snapshot
    pub snapshot_rx: watch::Receiver<Snapshot>,
    /// Ringer, written by simulated hardware switches
    pub audio: Arc<dyn AudioService>,
    /// Settings, written by simulated settings changes
    pub settings: Arc<dyn SettingsStore>,
}

/// Shared server state
struct ServerState {
    links: ServerLinks,
    start_time: Instant,
}

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    state: Arc<ServerState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Create a new IPC server
    pub fn new(socket_path: &Path, links: ServerLinks) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Owner-only access
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            state: Arc::new(ServerState {
                links,
                start_time: Instant::now(),
            }),
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let state = Arc::clone(&self.state);
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(mut stream: UnixStream, state: Arc<ServerState>) -> Result<()> {
        let mut len_buf = [0u8; 4];

        loop {
            // Read message length (4-byte little-endian)
            match stream.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > MAX_FRAME_LEN {
                warn!(len, "message too large, disconnecting");
                return Ok(());
            }

            let mut msg_buf = vec![0u8; len];
            stream.read_exact(&mut msg_buf).await?;

            let request: Request = match serde_json::from_slice(&msg_buf) {
                Ok(request) => request,
                Err(e) => {
                    warn!(%e, "malformed request");
                    let response = Response::error("bad_request", e.to_string());
                    Self::send_message(&mut stream, &response).await?;
                    continue;
                }
            };

            debug!(?request, "received request");

            if let Request::Subscribe = request {
                let events = state.links.event_tx.subscribe();
                Self::send_message(&mut stream, &Response::Subscribed).await?;
                debug!("client subscribed to notifications");
                return Self::stream_events(stream, events).await;
            }

            let response = Self::process_request(request, &state).await;
            Self::send_message(&mut stream, &response).await?;
        }
    }

    /// Push cycler events to a subscribed client until it goes away
    async fn stream_events(
        mut stream: UnixStream,
        mut events: broadcast::Receiver<CyclerEvent>,
    ) -> Result<()> {
        loop {
            let notification = match events.recv().await {
                Ok(event) => Notification::CyclerEvent { event },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagged");
                    Notification::Lagged { skipped }
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            };

            if let Err(e) = Self::send_message(&mut stream, &notification).await {
                debug!(?e, "subscriber disconnected");
                return Ok(());
            }
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) -> Result<()> {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        stream.write_all(&msg_len).await?;
        stream.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request and return a response
    async fn process_request(request: Request, state: &ServerState) -> Response {
        let links = &state.links;

        match request {
            Request::Ping => Response::Pong,

            Request::GetStatus => {
                let snapshot = links.snapshot_rx.borrow().clone();
                let uptime_secs = state.start_time.elapsed().as_secs();
                Response::Status(DaemonStatus::new(snapshot, uptime_secs))
            }

            Request::Click => Self::forward(links, HostEvent::Click).await,

            Request::LongPress => Self::forward(links, HostEvent::LongPress).await,

            Request::SetRingerMode { mode } => {
                info!(%mode, "ringer mode changed via IPC");
                links.audio.set_ringer_mode(mode);
                Self::forward(links, HostEvent::RingerModeChanged).await
            }

            Request::SetSetting { key, value } => {
                if let Err(e) = links.settings.put_string(&key, &value) {
                    error!(%e, key = %key, "failed to write setting");
                    return Response::error("settings_write", e.to_string());
                }
                info!(key = %key, value = %value, "setting changed via IPC");
                Self::forward(links, HostEvent::SettingChanged { key }).await
            }

            // Handled by the connection loop
            Request::Subscribe => Response::Subscribed,
        }
    }

    async fn forward(links: &ServerLinks, event: HostEvent) -> Response {
        match links.host_tx.send(event).await {
            Ok(()) => Response::Accepted,
            Err(_) => Response::error("unavailable", "controller is not running"),
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
