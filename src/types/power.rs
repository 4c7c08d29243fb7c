//! Power state for light control.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Power state as the cloud API spells it.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use lifx_bridge_rs::PowerState;
///
/// assert_eq!(PowerState::from(true).to_string(), "on");
/// assert_eq!(PowerState::from_str("off").unwrap(), PowerState::Off);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn is_on(&self) -> bool {
        matches!(self, PowerState::On)
    }

    /// LAN protocol power level for this state.
    pub fn level(&self) -> u16 {
        match self {
            PowerState::On => u16::MAX,
            PowerState::Off => 0,
        }
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { PowerState::On } else { PowerState::Off }
    }
}
