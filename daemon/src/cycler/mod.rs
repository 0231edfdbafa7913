//! Mode cycler
//!
//! Keeps a local notion of the current sound mode in step with the device's
//! ringer mode and vibrate-when-ringing setting, and steps through the
//! user's cycle order one mode at a time.

mod machine;

pub use machine::{CyclerState, Intent, ModeCycler};
