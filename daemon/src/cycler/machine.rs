//! Core mode cycler
//!
//! Tracks which catalog mode the device is in and where that mode sits in
//! the user's cycle order. It never touches the device itself: observations
//! come in as plain values, and `advance` hands back an intent for the host
//! to commit.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mode::{
    catalog_mode, resolve_catalog_index, ButtonDisplay, Mode, Order, OrderParseError,
    RingerMode, CATALOG, SILENT,
};

/// Where the cycler currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclerState {
    /// Catalog mode the device currently reflects
    pub catalog_index: usize,
    /// Position of that mode within the order, 0 if it is not in the order
    pub order_position: usize,
}

/// Device state the host should apply after an advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub ringer_mode: RingerMode,
    pub vibrate_when_ringing: bool,
}

impl From<Mode> for Intent {
    fn from(mode: Mode) -> Self {
        Self {
            ringer_mode: mode.ringer_mode,
            vibrate_when_ringing: mode.vibrate_when_ringing,
        }
    }
}

/// Single-step cycler over the catalog modes
#[derive(Debug, Clone)]
pub struct ModeCycler {
    order: Order,
    state: CyclerState,
}

impl ModeCycler {
    /// Create a cycler synchronized with the given external state
    pub fn initialize(order: Order, ringer_mode: RingerMode, vibrate_when_ringing: bool) -> Self {
        let mut cycler = Self {
            order,
            state: CyclerState::default(),
        };
        cycler.observe_external_change(ringer_mode, vibrate_when_ringing);
        cycler
    }

    pub fn state(&self) -> CyclerState {
        self.state
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Catalog mode the cycler currently points at
    pub fn current_mode(&self) -> Mode {
        CATALOG[self.state.catalog_index]
    }

    /// Re-read the persisted order.
    ///
    /// On a parse error the previous order is kept.
    pub fn refresh_order(&mut self, raw: Option<&str>) -> Result<(), OrderParseError> {
        self.order = Order::parse(raw)?;
        self.state.order_position = self.locate_in_order(self.state.catalog_index);
        debug!(order = %self.order, position = self.state.order_position, "order refreshed");
        Ok(())
    }

    /// Resynchronize with the device after an out-of-band change
    pub fn observe_external_change(&mut self, ringer_mode: RingerMode, vibrate_when_ringing: bool) {
        let catalog_index = resolve_catalog_index(ringer_mode, vibrate_when_ringing);
        self.state = CyclerState {
            catalog_index,
            order_position: self.locate_in_order(catalog_index),
        };

        debug!(
            %ringer_mode,
            vibrate_when_ringing,
            catalog_index,
            position = self.state.order_position,
            "synchronized with device"
        );
    }

    pub fn current_display(&self) -> ButtonDisplay {
        ButtonDisplay::for_catalog_index(self.state.catalog_index)
    }

    /// Step to the next mode in the order.
    ///
    /// Updates the local state right away; the next observation confirms or
    /// corrects it once the host has committed the returned intent.
    pub fn advance(&mut self) -> Intent {
        let len = self.order.len().max(1);
        let next_position = (self.state.order_position + 1) % len;
        let target = self.order.get(next_position).unwrap_or(SILENT as i32);

        let (catalog_index, mode) = match catalog_mode(target) {
            Some(mode) => (target as usize, mode),
            None => {
                debug!(entry = target, "order entry outside catalog, using silent");
                (SILENT, CATALOG[SILENT])
            }
        };

        self.state = CyclerState {
            catalog_index,
            order_position: next_position,
        };

        debug!(%mode, position = next_position, "advanced");
        mode.into()
    }

    fn locate_in_order(&self, catalog_index: usize) -> usize {
        self.order.position_of(catalog_index).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{Icon, NORMAL, NORMAL_VIBRATE, VIBRATE};
    use proptest::prelude::*;

    fn cycler_with_order(entries: Vec<i32>, ringer: RingerMode, vibrate: bool) -> ModeCycler {
        ModeCycler::initialize(Order::new(entries), ringer, vibrate)
    }

    #[test]
    fn test_initialize_resolves_catalog_index() {
        let cycler = ModeCycler::initialize(Order::default(), RingerMode::Normal, true);
        assert_eq!(cycler.state().catalog_index, NORMAL_VIBRATE);
        assert_eq!(cycler.state().order_position, 3);
    }

    #[test]
    fn test_display_for_every_external_state() {
        let cases = [
            (RingerMode::Silent, false, Icon::Silent, false),
            (RingerMode::Silent, true, Icon::Silent, false),
            (RingerMode::Vibrate, false, Icon::VibrateOff, false),
            (RingerMode::Vibrate, true, Icon::VibrateOff, false),
            (RingerMode::Normal, false, Icon::RingOn, true),
            (RingerMode::Normal, true, Icon::RingVibrateOn, true),
        ];

        for (ringer, vibrate, icon, enabled) in cases {
            let cycler = ModeCycler::initialize(Order::default(), ringer, vibrate);
            let display = cycler.current_display();
            assert_eq!(display.icon, icon, "{ringer} vibrate={vibrate}");
            assert_eq!(display.enabled, enabled, "{ringer} vibrate={vibrate}");
        }
    }

    #[test]
    fn test_observe_is_idempotent() {
        let mut cycler = cycler_with_order(vec![3, 1], RingerMode::Silent, false);
        cycler.observe_external_change(RingerMode::Vibrate, false);
        let first = cycler.state();
        cycler.observe_external_change(RingerMode::Vibrate, false);
        assert_eq!(cycler.state(), first);
        assert_eq!(first.catalog_index, VIBRATE);
        assert_eq!(first.order_position, 1);
    }

    #[test]
    fn test_mode_missing_from_order_uses_first_position() {
        let cycler = cycler_with_order(vec![2, 3], RingerMode::Silent, false);
        assert_eq!(cycler.state().catalog_index, 0);
        assert_eq!(cycler.state().order_position, 0);
    }

    #[test]
    fn test_advance_scenario() {
        let mut cycler = cycler_with_order(vec![2, 3, 0, 1], RingerMode::Normal, false);
        assert_eq!(cycler.state().catalog_index, NORMAL);
        assert_eq!(cycler.state().order_position, 0);

        let intent = cycler.advance();
        assert_eq!(intent.ringer_mode, RingerMode::Normal);
        assert!(intent.vibrate_when_ringing);
        assert_eq!(cycler.state().order_position, 1);
        assert_eq!(cycler.state().catalog_index, NORMAL_VIBRATE);
    }

    #[test]
    fn test_advance_wraps() {
        let mut cycler = cycler_with_order(vec![0, 2], RingerMode::Normal, false);
        assert_eq!(cycler.state().order_position, 1);

        let intent = cycler.advance();
        assert_eq!(intent.ringer_mode, RingerMode::Silent);
        assert!(!intent.vibrate_when_ringing);
        assert_eq!(cycler.state().order_position, 0);
    }

    #[test]
    fn test_invalid_entry_clamps_to_silent() {
        let mut cycler = cycler_with_order(vec![7, 2], RingerMode::Normal, false);
        assert_eq!(cycler.state().order_position, 1);

        let intent = cycler.advance();
        assert_eq!(intent.ringer_mode, RingerMode::Silent);
        assert_eq!(cycler.state().catalog_index, SILENT);
        assert_eq!(cycler.state().order_position, 0);
    }

    #[test]
    fn test_negative_entry_clamps_to_silent() {
        let mut cycler = cycler_with_order(vec![-1], RingerMode::Normal, false);
        let intent = cycler.advance();
        assert_eq!(intent.ringer_mode, RingerMode::Silent);
    }

    #[test]
    fn test_empty_order_acts_as_silent_only() {
        let mut cycler = cycler_with_order(Vec::new(), RingerMode::Normal, true);
        assert_eq!(cycler.state().order_position, 0);

        let intent = cycler.advance();
        assert_eq!(intent.ringer_mode, RingerMode::Silent);
        assert_eq!(cycler.state().order_position, 0);
        assert_eq!(cycler.state().catalog_index, SILENT);
    }

    #[test]
    fn test_refresh_order_rejects_malformed_text() {
        let mut cycler = cycler_with_order(vec![2, 3], RingerMode::Normal, false);
        let err = cycler.refresh_order(Some("2,x,1")).unwrap_err();
        assert_eq!(err.token, "2,x,1");
        assert_eq!(cycler.order().entries(), &[2, 3]);
    }

    #[test]
    fn test_refresh_order_empty_resets_to_identity() {
        let mut cycler = cycler_with_order(vec![3], RingerMode::Normal, false);
        cycler.refresh_order(Some("")).unwrap();
        assert_eq!(cycler.order().entries(), &[0, 1, 2, 3]);
        assert_eq!(cycler.state().order_position, 2);
    }

    #[test]
    fn test_refresh_order_relocates_position() {
        let mut cycler = ModeCycler::initialize(Order::default(), RingerMode::Vibrate, true);
        assert_eq!(cycler.state().order_position, 1);

        cycler.refresh_order(Some("3|1")).unwrap();
        assert_eq!(cycler.state().order_position, 1);
        assert_eq!(cycler.state().catalog_index, VIBRATE);
    }

    proptest! {
        #[test]
        fn test_advance_order_len_times_returns_to_start(
            entries in prop::collection::vec(-2i32..8, 1..8),
            ringer in 0i32..3,
            vibrate in any::<bool>(),
        ) {
            let ringer = RingerMode::from_raw(ringer).unwrap();
            let mut cycler = ModeCycler::initialize(Order::new(entries.clone()), ringer, vibrate);
            let start = cycler.state().order_position;

            for _ in 0..entries.len() {
                cycler.advance();
            }

            prop_assert_eq!(cycler.state().order_position, start);
        }
    }
}
