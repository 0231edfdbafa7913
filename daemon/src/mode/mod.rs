//! Sound mode catalog and cycle order
//!
//! Four catalog modes:
//! - Silent: ringer muted
//! - Vibrate: ringer muted, vibrate on calls
//! - Normal: ringer audible
//! - NormalVibrate: ringer audible and vibrating

mod catalog;
mod order;

pub use catalog::{
    catalog_mode, modes_match, resolve_catalog_index, ButtonDisplay, Icon, Mode, RingerMode,
    CATALOG, NORMAL, NORMAL_VIBRATE, SILENT, VIBRATE,
};
pub use order::{Order, OrderParseError, SEPARATOR};
