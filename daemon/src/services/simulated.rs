//! Simulated device services for running the daemon off-device
//!
//! The ringer lives in memory, settings persist to a JSON file, and vibration
//! and settings requests are only logged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info};

use super::{AudioService, SettingsError, SettingsStore, SystemActions, Vibrator};
use crate::mode::RingerMode;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory ringer
#[derive(Debug, Default)]
pub struct SimulatedAudio {
    mode: Mutex<RingerMode>,
}

impl SimulatedAudio {
    pub fn new(mode: RingerMode) -> Self {
        Self {
            mode: Mutex::new(mode),
        }
    }
}

impl AudioService for SimulatedAudio {
    fn ringer_mode(&self) -> RingerMode {
        *lock(&self.mode)
    }

    fn set_ringer_mode(&self, mode: RingerMode) {
        let mut current = lock(&self.mode);
        let old = *current;
        if old != mode {
            info!(from = %old, to = %mode, "ringer mode set");
        }
        *current = mode;
    }
}

/// Settings store backed by a JSON object of strings
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonSettingsStore {
    /// Open the store at `path`, starting empty if the file does not exist yet
    pub fn open(path: &Path) -> Result<Self, SettingsError> {
        let values: BTreeMap<String, String> = if path.exists() {
            let bytes = std::fs::read(path)?;
            serde_json::from_slice(&bytes)?
        } else {
            BTreeMap::new()
        };

        debug!(?path, entries = values.len(), "settings store opened");

        Ok(Self {
            path: path.to_owned(),
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), SettingsError> {
        let bytes = serde_json::to_vec_pretty(values)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get_string(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut values = lock(&self.values);
        let mut updated = values.clone();
        updated.insert(key.to_string(), value.to_string());
        // Readers only see the value once it is on disk
        self.persist(&updated)?;
        *values = updated;
        debug!(key, value, "setting written");
        Ok(())
    }
}

/// Vibrator that only logs requests
#[derive(Debug, Default)]
pub struct LoggingVibrator;

impl Vibrator for LoggingVibrator {
    fn vibrate(&self, duration: Duration) {
        info!(duration_ms = duration.as_millis() as u64, "vibrate");
    }
}

/// System actions that only log requests
#[derive(Debug, Default)]
pub struct LoggingSystemActions;

impl SystemActions for LoggingSystemActions {
    fn open_sound_settings(&self) {
        info!("opening sound settings");
    }
}
