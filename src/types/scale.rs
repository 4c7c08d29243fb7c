//! Conversions between host units and the LAN protocol's 16-bit scale.

use super::ColorChannel;

const U16_MAX: f64 = 65535.0;

/// Convert a 16-bit brightness or saturation value to a 0-100 percentage.
///
/// # Examples
///
/// ```
/// use lifx_bridge_rs::scale;
///
/// assert_eq!(scale::to_percent(0), 0);
/// assert_eq!(scale::to_percent(32768), 50);
/// assert_eq!(scale::to_percent(65535), 100);
/// ```
pub fn to_percent(raw: u16) -> u8 {
    (raw as f64 * 100.0 / U16_MAX).round() as u8
}

/// Convert a 16-bit hue value to degrees (0-360).
///
/// # Examples
///
/// ```
/// use lifx_bridge_rs::scale;
///
/// assert_eq!(scale::to_degrees(0), 0);
/// assert_eq!(scale::to_degrees(65535), 360);
/// ```
pub fn to_degrees(raw: u16) -> u16 {
    (raw as f64 * 360.0 / U16_MAX).round() as u16
}

/// Convert a host value (degrees, percent or raw kelvin) back to the 16-bit scale.
///
/// The result is masked to 16 bits, so out-of-range input wraps instead of
/// saturating.
///
/// # Examples
///
/// ```
/// use lifx_bridge_rs::{ColorChannel, scale};
///
/// assert_eq!(scale::from_host(50.0, ColorChannel::Brightness), 32768);
/// assert_eq!(scale::from_host(360.0, ColorChannel::Hue), 65535);
/// ```
pub fn from_host(value: f64, channel: ColorChannel) -> u16 {
    ((value * U16_MAX / channel.scale()).round() as i64 & 0xffff) as u16
}

/// Convert a cloud API fraction (0-1) to a rounded percentage.
pub fn fraction_to_percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_round_trip_within_one() {
        for p in 0..=100u8 {
            let raw = from_host(p as f64, ColorChannel::Brightness);
            let back = to_percent(raw);
            assert!((back as i16 - p as i16).abs() <= 1, "{p} -> {raw} -> {back}");
        }
    }

    #[test]
    fn test_degrees_round_trip_within_one() {
        for d in 0..=360u16 {
            let raw = from_host(d as f64, ColorChannel::Hue);
            let back = to_degrees(raw);
            assert!((back as i32 - d as i32).abs() <= 1, "{d} -> {raw} -> {back}");
        }
    }

    #[test]
    fn test_from_host_masks_to_16_bits() {
        // 101% of 65535 overflows and wraps around
        assert_eq!(from_host(101.0, ColorChannel::Saturation), 654);
        assert_eq!(from_host(5500.0, ColorChannel::Kelvin), 5500);
    }

    #[test]
    fn test_fraction_to_percent() {
        assert_eq!(fraction_to_percent(0.42), 42);
        assert_eq!(fraction_to_percent(1.0), 100);
        assert_eq!(fraction_to_percent(0.0), 0);
    }
}
