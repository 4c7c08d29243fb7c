//! Cached light state in LAN protocol units.

use serde::{Deserialize, Serialize};

use super::scale;

/// Light state as the LAN protocol reports it.
///
/// Every field uses the protocol's native 16-bit scale; use the accessors
/// for host units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    pub power: u16,
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

impl LightState {
    /// # Examples
    ///
    /// ```
    /// use lifx_bridge_rs::LightState;
    ///
    /// let state = LightState { power: 0, ..Default::default() };
    /// assert!(!state.is_on());
    /// ```
    pub fn is_on(&self) -> bool {
        self.power > 0
    }

    pub fn brightness_percent(&self) -> u8 {
        scale::to_percent(self.brightness)
    }

    pub fn saturation_percent(&self) -> u8 {
        scale::to_percent(self.saturation)
    }

    pub fn hue_degrees(&self) -> u16 {
        scale::to_degrees(self.hue)
    }
}
