//! Host-visible light properties and LAN color channels.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// One of the four properties an accessory exposes to the host.
///
/// The `Display` form is the name the cloud API uses in color strings
/// (`brightness:0.5`, `hue:180`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Property {
    Power,
    Brightness,
    Hue,
    Saturation,
}

impl Property {
    /// The LAN color channel backing this property, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_bridge_rs::{ColorChannel, Property};
    ///
    /// assert_eq!(Property::Hue.channel(), Some(ColorChannel::Hue));
    /// assert_eq!(Property::Power.channel(), None);
    /// ```
    pub fn channel(&self) -> Option<ColorChannel> {
        match self {
            Property::Power => None,
            Property::Brightness => Some(ColorChannel::Brightness),
            Property::Hue => Some(ColorChannel::Hue),
            Property::Saturation => Some(ColorChannel::Saturation),
        }
    }

    /// Hue and saturation are only exposed on color-capable bulbs.
    pub fn requires_color(&self) -> bool {
        matches!(self, Property::Hue | Property::Saturation)
    }
}

/// A channel of the LAN protocol's HSBK color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ColorChannel {
    Hue,
    Saturation,
    Brightness,
    Kelvin,
}

impl ColorChannel {
    /// Host-side range that maps onto the full 16-bit LAN range.
    pub fn scale(&self) -> f64 {
        match self {
            ColorChannel::Hue => 360.0,
            ColorChannel::Saturation | ColorChannel::Brightness => 100.0,
            ColorChannel::Kelvin => 65535.0,
        }
    }
}
