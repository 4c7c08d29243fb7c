//! The host-facing accessory model: services, characteristics and wiring.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::LanMode;
use crate::types::Property;

pub const MANUFACTURER: &str = "LIFX";

/// A value passed between the host and an accessory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl CharacteristicValue {
    /// Truthiness as the host uses it for the on/off characteristic.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_bridge_rs::CharacteristicValue;
    ///
    /// assert!(CharacteristicValue::Int(1).as_bool());
    /// assert!(!CharacteristicValue::Float(0.0).as_bool());
    /// ```
    pub fn as_bool(&self) -> bool {
        match *self {
            CharacteristicValue::Bool(b) => b,
            CharacteristicValue::Int(i) => i != 0,
            CharacteristicValue::Float(f) => f != 0.0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            CharacteristicValue::Bool(b) => f64::from(u8::from(b)),
            CharacteristicValue::Int(i) => i as f64,
            CharacteristicValue::Float(f) => f,
        }
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacteristicValue::Bool(b) => write!(f, "{b}"),
            CharacteristicValue::Int(i) => write!(f, "{i}"),
            CharacteristicValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(b: bool) -> Self {
        CharacteristicValue::Bool(b)
    }
}

impl From<i64> for CharacteristicValue {
    fn from(i: i64) -> Self {
        CharacteristicValue::Int(i)
    }
}

impl From<f64> for CharacteristicValue {
    fn from(f: f64) -> Self {
        CharacteristicValue::Float(f)
    }
}

/// Which adapter serves a read or a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    Lan,
    Remote,
}

/// Read and write sources for every characteristic of an accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wiring {
    pub read: Source,
    pub write: Source,
}

impl From<LanMode> for Wiring {
    fn from(mode: LanMode) -> Self {
        let (read, write) = match mode {
            LanMode::Full => (Source::Lan, Source::Lan),
            LanMode::GetOnly => (Source::Lan, Source::Remote),
            LanMode::Disabled => (Source::Remote, Source::Remote),
        };
        Wiring { read, write }
    }
}

/// One host-visible property.
///
/// The value cell only holds what was last pushed by the bridge; reads
/// initiated by the host go through the accessory.
#[derive(Debug)]
pub struct Characteristic {
    property: Property,
    wiring: Wiring,
    value: Mutex<Option<CharacteristicValue>>,
}

impl Characteristic {
    pub fn new(property: Property, wiring: Wiring) -> Self {
        Characteristic {
            property,
            wiring,
            value: Mutex::new(None),
        }
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn wiring(&self) -> Wiring {
        self.wiring
    }

    pub fn value(&self) -> Option<CharacteristicValue> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a value to the host without a host request.
    pub fn set_value(&self, value: CharacteristicValue) {
        debug!("push {} = {}", self.property, value);
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }
}

/// The lightbulb service of an accessory.
#[derive(Debug, Clone)]
pub struct LightbulbService {
    pub name: String,
    pub characteristics: Vec<Arc<Characteristic>>,
}

impl LightbulbService {
    pub fn characteristic(&self, property: Property) -> Option<&Arc<Characteristic>> {
        self.characteristics
            .iter()
            .find(|c| c.property() == property)
    }

    pub fn properties(&self) -> Vec<Property> {
        self.characteristics.iter().map(|c| c.property()).collect()
    }
}

/// Static identification shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessoryInformation {
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
}

/// A service handed back to the host.
#[derive(Debug, Clone)]
pub enum Service {
    Lightbulb(LightbulbService),
    AccessoryInformation(AccessoryInformation),
}

impl Service {
    pub fn as_lightbulb(&self) -> Option<&LightbulbService> {
        match self {
            Service::Lightbulb(service) => Some(service),
            Service::AccessoryInformation(_) => None,
        }
    }

    pub fn as_information(&self) -> Option<&AccessoryInformation> {
        match self {
            Service::AccessoryInformation(info) => Some(info),
            Service::Lightbulb(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wiring_table() {
        assert_eq!(
            Wiring::from(LanMode::Full),
            Wiring {
                read: Source::Lan,
                write: Source::Lan
            }
        );
        assert_eq!(
            Wiring::from(LanMode::GetOnly),
            Wiring {
                read: Source::Lan,
                write: Source::Remote
            }
        );
        assert_eq!(
            Wiring::from(LanMode::Disabled),
            Wiring {
                read: Source::Remote,
                write: Source::Remote
            }
        );
    }

    #[test]
    fn test_characteristic_push() {
        let c = Characteristic::new(Property::Brightness, Wiring::from(LanMode::Full));
        assert_eq!(c.value(), None);
        c.set_value(CharacteristicValue::Int(42));
        assert_eq!(c.value(), Some(CharacteristicValue::Int(42)));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(CharacteristicValue::Float(180.0).to_string(), "180");
        assert_eq!(CharacteristicValue::Float(0.5).to_string(), "0.5");
        assert_eq!(CharacteristicValue::Bool(true).to_string(), "true");
    }
}
