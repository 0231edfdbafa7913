//! Ringer modes and the fixed catalog of selectable sound modes
//!
//! The catalog is the only place the four sound modes are defined. Orders
//! and cycler state refer to its entries by index.

use serde::{Deserialize, Serialize};

/// Hardware-level ringer mode, as reported by the audio service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingerMode {
    /// Ringer muted, no vibration
    Silent,
    /// Ringer muted, vibrate instead
    Vibrate,
    /// Ringer audible
    Normal,
}

impl RingerMode {
    /// Map a platform ringer constant (0, 1, 2) to a ringer mode
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Silent),
            1 => Some(Self::Vibrate),
            2 => Some(Self::Normal),
            _ => None,
        }
    }

    /// Platform ringer constant for this mode
    pub fn as_raw(self) -> i32 {
        match self {
            Self::Silent => 0,
            Self::Vibrate => 1,
            Self::Normal => 2,
        }
    }
}

impl Default for RingerMode {
    fn default() -> Self {
        Self::Normal
    }
}

impl std::fmt::Display for RingerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RingerMode::Silent => write!(f, "silent"),
            RingerMode::Vibrate => write!(f, "vibrate"),
            RingerMode::Normal => write!(f, "normal"),
        }
    }
}

/// A sound mode: ringer mode plus the vibrate-when-ringing flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub ringer_mode: RingerMode,
    pub vibrate_when_ringing: bool,
}

impl Mode {
    pub const fn new(ringer_mode: RingerMode, vibrate_when_ringing: bool) -> Self {
        Self {
            ringer_mode,
            vibrate_when_ringing,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.vibrate_when_ringing {
            write!(f, "{}+vibrate", self.ringer_mode)
        } else {
            write!(f, "{}", self.ringer_mode)
        }
    }
}

/// Whether two modes describe the same device state.
///
/// The hardware keeps no separate vibrate setting while silent or vibrating,
/// so two silent modes (or two vibrate modes) match whatever their flag says.
/// Normal modes match only when the flags agree too.
pub fn modes_match(a: Mode, b: Mode) -> bool {
    match (a.ringer_mode, b.ringer_mode) {
        (RingerMode::Silent, RingerMode::Silent) => true,
        (RingerMode::Vibrate, RingerMode::Vibrate) => true,
        _ => a == b,
    }
}

pub const SILENT: usize = 0;
pub const VIBRATE: usize = 1;
pub const NORMAL: usize = 2;
pub const NORMAL_VIBRATE: usize = 3;

/// Every selectable sound mode, in catalog order
pub const CATALOG: [Mode; 4] = [
    Mode::new(RingerMode::Silent, false),
    Mode::new(RingerMode::Vibrate, true),
    Mode::new(RingerMode::Normal, false),
    Mode::new(RingerMode::Normal, true),
];

/// Catalog entry at `index`, or `None` when the index is out of range
pub fn catalog_mode(index: i32) -> Option<Mode> {
    usize::try_from(index).ok().and_then(|i| CATALOG.get(i).copied())
}

/// Catalog index of the first mode matching the given external state.
///
/// Falls back to [`SILENT`] when nothing matches.
pub fn resolve_catalog_index(ringer_mode: RingerMode, vibrate_when_ringing: bool) -> usize {
    let observed = Mode::new(ringer_mode, vibrate_when_ringing);
    CATALOG
        .iter()
        .position(|mode| modes_match(*mode, observed))
        .unwrap_or(SILENT)
}

/// Icon shown for a catalog mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Silent,
    VibrateOff,
    RingOn,
    RingVibrateOn,
}

/// Button icon and enabled state for the current mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonDisplay {
    pub icon: Icon,
    /// Sound modes render as enabled, muted modes as disabled
    pub enabled: bool,
}

impl ButtonDisplay {
    /// Button state for a catalog index; out-of-range indices render silent
    pub fn for_catalog_index(index: usize) -> Self {
        match index {
            VIBRATE => Self {
                icon: Icon::VibrateOff,
                enabled: false,
            },
            NORMAL => Self {
                icon: Icon::RingOn,
                enabled: true,
            },
            NORMAL_VIBRATE => Self {
                icon: Icon::RingVibrateOn,
                enabled: true,
            },
            _ => Self {
                icon: Icon::Silent,
                enabled: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_ignores_vibrate_flag() {
        let a = Mode::new(RingerMode::Silent, true);
        let b = Mode::new(RingerMode::Silent, false);
        assert!(modes_match(a, b));
        assert_eq!(resolve_catalog_index(RingerMode::Silent, true), SILENT);
        assert_eq!(resolve_catalog_index(RingerMode::Silent, false), SILENT);
    }

    #[test]
    fn test_vibrate_ignores_vibrate_flag() {
        assert_eq!(resolve_catalog_index(RingerMode::Vibrate, false), VIBRATE);
        assert_eq!(resolve_catalog_index(RingerMode::Vibrate, true), VIBRATE);
    }

    #[test]
    fn test_normal_keyed_on_both_fields() {
        assert!(!modes_match(
            Mode::new(RingerMode::Normal, true),
            Mode::new(RingerMode::Normal, false)
        ));
        assert_eq!(resolve_catalog_index(RingerMode::Normal, false), NORMAL);
        assert_eq!(resolve_catalog_index(RingerMode::Normal, true), NORMAL_VIBRATE);
    }

    #[test]
    fn test_different_ringer_modes_never_match() {
        assert!(!modes_match(
            Mode::new(RingerMode::Silent, false),
            Mode::new(RingerMode::Vibrate, false)
        ));
        assert!(!modes_match(
            Mode::new(RingerMode::Vibrate, true),
            Mode::new(RingerMode::Normal, true)
        ));
    }

    #[test]
    fn test_display_depends_only_on_catalog_index() {
        assert_eq!(ButtonDisplay::for_catalog_index(SILENT).icon, Icon::Silent);
        assert!(!ButtonDisplay::for_catalog_index(SILENT).enabled);
        assert_eq!(ButtonDisplay::for_catalog_index(VIBRATE).icon, Icon::VibrateOff);
        assert!(!ButtonDisplay::for_catalog_index(VIBRATE).enabled);
        assert_eq!(ButtonDisplay::for_catalog_index(NORMAL).icon, Icon::RingOn);
        assert!(ButtonDisplay::for_catalog_index(NORMAL).enabled);
        assert_eq!(
            ButtonDisplay::for_catalog_index(NORMAL_VIBRATE).icon,
            Icon::RingVibrateOn
        );
        assert!(ButtonDisplay::for_catalog_index(NORMAL_VIBRATE).enabled);
    }

    #[test]
    fn test_catalog_mode_bounds() {
        assert_eq!(catalog_mode(3), Some(CATALOG[NORMAL_VIBRATE]));
        assert_eq!(catalog_mode(4), None);
        assert_eq!(catalog_mode(-1), None);
    }

    #[test]
    fn test_raw_ringer_constants() {
        assert_eq!(RingerMode::from_raw(0), Some(RingerMode::Silent));
        assert_eq!(RingerMode::from_raw(2), Some(RingerMode::Normal));
        assert_eq!(RingerMode::from_raw(9), None);
        assert_eq!(RingerMode::Vibrate.as_raw(), 1);
    }
}
