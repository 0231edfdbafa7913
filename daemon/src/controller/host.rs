//! Controller hosting the mode cycler
//!
//! Reads external state from the injected services, feeds it to the cycler,
//! and commits advance intents back to the device.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use crate::cycler::{CyclerState, Intent, ModeCycler};
use crate::events::{CyclerEvent, HostEvent};
use crate::mode::{ButtonDisplay, Mode, Order, RingerMode};
use crate::services::{
    AudioService, SettingsError, SettingsStore, SystemActions, Vibrator, EXPANDED_RING_MODE,
    VIBRATE_DURATION, VIBRATE_WHEN_RINGING,
};

/// Errors applying a host event
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to commit mode change: {0}")]
    Commit(#[from] SettingsError),
}

/// Device services handed to the controller at setup
#[derive(Clone)]
pub struct Services {
    pub audio: Arc<dyn AudioService>,
    pub vibrator: Arc<dyn Vibrator>,
    pub settings: Arc<dyn SettingsStore>,
    pub actions: Arc<dyn SystemActions>,
}

/// Point-in-time view of the cycler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub display: ButtonDisplay,
    pub state: CyclerState,
    /// Cycle order, entries joined by `|`
    pub order: String,
}

impl From<&ModeCycler> for Snapshot {
    fn from(cycler: &ModeCycler) -> Self {
        Self {
            mode: cycler.current_mode(),
            display: cycler.current_display(),
            state: cycler.state(),
            order: cycler.order().to_string(),
        }
    }
}

/// Owns the cycler and applies host events to it one at a time
pub struct Controller {
    cycler: ModeCycler,
    services: Services,
    event_tx: broadcast::Sender<CyclerEvent>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl Controller {
    /// Load the order and current device state, and build the cycler
    pub fn setup(services: Services, event_tx: broadcast::Sender<CyclerEvent>) -> Self {
        let raw_order = services.settings.get_string(EXPANDED_RING_MODE);
        let order = Order::parse(raw_order.as_deref()).unwrap_or_else(|e| {
            warn!(%e, "stored order is malformed, using default order");
            let _ = event_tx.send(CyclerEvent::OrderRejected {
                reason: e.to_string(),
            });
            Order::default()
        });

        let (ringer_mode, vibrate_when_ringing) = read_device(&services);
        let cycler = ModeCycler::initialize(order, ringer_mode, vibrate_when_ringing);
        let (snapshot_tx, _) = watch::channel(Snapshot::from(&cycler));

        info!(
            mode = %cycler.current_mode(),
            order = %cycler.order(),
            "controller ready"
        );

        Self {
            cycler,
            services,
            event_tx,
            snapshot_tx,
        }
    }

    pub fn cycler(&self) -> &ModeCycler {
        &self.cycler
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(&self.cycler)
    }

    /// Receiver that always holds the latest snapshot
    pub fn subscribe_snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Apply host events until the sender side closes
    pub async fn run(&mut self, mut host_rx: mpsc::Receiver<HostEvent>) {
        info!("controller started");

        while let Some(event) = host_rx.recv().await {
            if let Err(e) = self.handle(event) {
                warn!(%e, "failed to apply host event");
            }
        }

        info!("controller stopped");
    }

    /// Apply a single host event
    pub fn handle(&mut self, event: HostEvent) -> Result<(), ControllerError> {
        debug!(?event, "handling host event");

        let result = match event {
            HostEvent::RingerModeChanged => {
                self.observe();
                Ok(())
            }
            HostEvent::SettingChanged { key } => {
                self.handle_setting_changed(&key);
                Ok(())
            }
            HostEvent::Click => self.click(),
            HostEvent::LongPress => {
                self.services.actions.open_sound_settings();
                self.emit(CyclerEvent::SoundSettingsRequested);
                Ok(())
            }
        };

        self.snapshot_tx.send_replace(self.snapshot());
        result
    }

    fn handle_setting_changed(&mut self, key: &str) {
        match key {
            EXPANDED_RING_MODE => {
                self.reload_order();
                self.observe();
            }
            VIBRATE_WHEN_RINGING => self.observe(),
            _ => debug!(key, "ignoring unrelated setting"),
        }
    }

    fn reload_order(&mut self) {
        let raw = self.services.settings.get_string(EXPANDED_RING_MODE);
        match self.cycler.refresh_order(raw.as_deref()) {
            Ok(()) => {
                info!(order = %self.cycler.order(), "order reloaded");
                self.emit(CyclerEvent::OrderReloaded {
                    order: self.cycler.order().to_string(),
                });
            }
            Err(e) => {
                warn!(%e, order = %self.cycler.order(), "rejected stored order, keeping previous");
                self.emit(CyclerEvent::OrderRejected {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Resynchronize the cycler with the device
    fn observe(&mut self) {
        let before = self.cycler.current_mode();
        let (ringer_mode, vibrate_when_ringing) = read_device(&self.services);
        self.cycler
            .observe_external_change(ringer_mode, vibrate_when_ringing);
        self.emit_if_changed(before);
    }

    fn click(&mut self) -> Result<(), ControllerError> {
        let before = self.cycler.current_mode();
        let intent = self.cycler.advance();

        if let Err(e) = self.commit(intent) {
            // Undo the optimistic step by reading back what the device has
            self.observe();
            return Err(e.into());
        }

        self.emit_if_changed(before);
        Ok(())
    }

    fn commit(&self, intent: Intent) -> Result<(), SettingsError> {
        if intent.vibrate_when_ringing {
            self.services.vibrator.vibrate(VIBRATE_DURATION);
        }

        self.services
            .settings
            .put_int(VIBRATE_WHEN_RINGING, i32::from(intent.vibrate_when_ringing))?;
        self.services.audio.set_ringer_mode(intent.ringer_mode);
        Ok(())
    }

    fn emit_if_changed(&self, before: Mode) {
        let after = self.cycler.current_mode();
        if before == after {
            return;
        }

        info!(from = %before, to = %after, "mode changed");
        self.emit(CyclerEvent::ModeChanged {
            from: before,
            to: after,
            display: self.cycler.current_display(),
        });
    }

    fn emit(&self, event: CyclerEvent) {
        debug!(%event, "emitting cycler event");
        let _ = self.event_tx.send(event);
    }
}

fn read_device(services: &Services) -> (RingerMode, bool) {
    let vibrate_when_ringing = services.settings.get_int(VIBRATE_WHEN_RINGING, 0) == 1;
    (services.audio.ringer_mode(), vibrate_when_ringing)
}
