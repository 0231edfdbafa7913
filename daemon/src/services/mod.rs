//! Device services the cycler host depends on
//!
//! The host receives these as trait objects at construction; the daemon
//! wires in the simulated implementations from [`simulated`].

pub mod simulated;

use std::time::Duration;

use thiserror::Error;

use crate::mode::RingerMode;

/// Settings key for the vibrate-when-ringing flag (0 or 1)
pub const VIBRATE_WHEN_RINGING: &str = "vibrate_when_ringing";

/// Settings key for the persisted cycle order text
pub const EXPANDED_RING_MODE: &str = "expanded_ring_mode";

/// Vibration pulse issued when switching into a vibrating mode
pub const VIBRATE_DURATION: Duration = Duration::from_millis(250);

/// Errors writing to the settings store
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read/write settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Hardware ringer mode
pub trait AudioService: Send + Sync {
    fn ringer_mode(&self) -> RingerMode;

    fn set_ringer_mode(&self, mode: RingerMode);
}

/// Fire-and-forget vibration requests
pub trait Vibrator: Send + Sync {
    fn vibrate(&self, duration: Duration);
}

/// Persisted key-value settings
pub trait SettingsStore: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;

    fn put_string(&self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Integer setting, or `default` when missing or not an integer
    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.get_string(key)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default)
    }

    fn put_int(&self, key: &str, value: i32) -> Result<(), SettingsError> {
        self.put_string(key, &value.to_string())
    }
}

/// System-level actions outside the cycler
pub trait SystemActions: Send + Sync {
    /// Open the system sound settings screen
    fn open_sound_settings(&self);
}
