//! Events flowing into and out of the cycler host
//!
//! [`HostEvent`]s are change notifications and user actions, delivered one at
//! a time to the controller. [`CyclerEvent`]s are what the controller
//! broadcasts back to IPC subscribers.

use serde::{Deserialize, Serialize};

use crate::mode::{ButtonDisplay, Mode};

/// Notifications and user actions handled by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The ringer mode changed (hardware switch, another app, ...)
    RingerModeChanged,

    /// A persisted setting changed
    SettingChanged { key: String },

    /// Single click: advance to the next mode
    Click,

    /// Long press: open the system sound settings
    LongPress,
}

/// Events emitted by the controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CyclerEvent {
    /// The current mode changed
    ModeChanged {
        from: Mode,
        to: Mode,
        display: ButtonDisplay,
    },

    /// A new cycle order was loaded
    OrderReloaded {
        /// Order as persisted, entries joined by `|`
        order: String,
    },

    /// Persisted order text was malformed and the previous order was kept
    OrderRejected { reason: String },

    /// The system sound settings were requested
    SoundSettingsRequested,
}

impl std::fmt::Display for CyclerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CyclerEvent::ModeChanged { from, to, .. } => {
                write!(f, "MODE_CHANGED ({} -> {})", from, to)
            }
            CyclerEvent::OrderReloaded { order } => write!(f, "ORDER_RELOADED ({})", order),
            CyclerEvent::OrderRejected { reason } => write!(f, "ORDER_REJECTED ({})", reason),
            CyclerEvent::SoundSettingsRequested => write!(f, "SOUND_SETTINGS_REQUESTED"),
        }
    }
}
