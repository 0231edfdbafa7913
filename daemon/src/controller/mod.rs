//! Host-side controller for the mode cycler
//!
//! Serializes change notifications and user actions, commits advance
//! intents to the device services, and publishes the resulting state.

mod host;

pub use host::{Controller, ControllerError, Services, Snapshot};
