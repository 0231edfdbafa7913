//! ringer-cycle: cycles a device's sound mode through a user-defined order
//!
//! The [`cycler`] core keeps a local notion of the current sound mode
//! (silent, vibrate, sound, sound+vibrate) in step with the device's ringer
//! mode and vibrate-when-ringing setting. The [`controller`] hosts it over
//! injected [`services`], and the daemon exposes it over [`ipc`].

pub mod config;
pub mod controller;
pub mod cycler;
pub mod events;
pub mod ipc;
pub mod lifecycle;
pub mod mode;
pub mod services;
