//! Configuration loading and management

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Overrides the data directory when set
pub const DATA_DIR_ENV: &str = "RINGER_CYCLE_DATA_DIR";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Path to the simulated device settings file
    pub settings_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = std::env::var("HOME").context("HOME is not set")?;
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("ringer-cycle")
            }
        };

        Ok(Self::with_data_dir(data_dir))
    }

    /// Configuration rooted at `data_dir`
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            socket_path: data_dir.join("daemon.sock"),
            settings_path: data_dir.join("settings.json"),
            data_dir,
        }
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_data_dir() {
        let config = Config::with_data_dir(PathBuf::from("/tmp/ringer-cycle"));
        assert_eq!(config.socket_path, PathBuf::from("/tmp/ringer-cycle/daemon.sock"));
        assert_eq!(
            config.settings_path,
            PathBuf::from("/tmp/ringer-cycle/settings.json")
        );
    }

    #[test]
    fn test_ensure_dirs_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path().join("nested").join("data"));
        config.ensure_dirs().unwrap();
        assert!(config.data_dir.is_dir());
    }
}
