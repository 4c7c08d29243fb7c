//! # lifx_bridge_rs
//!
//! An async Rust bridge that exposes LIFX lights to a home-automation host.
//!
//! The [`Platform`] lists lights through the LIFX cloud API and wraps each one
//! in an [`Accessory`]. Accessories answer the host's get/set calls for power,
//! brightness, hue and saturation through the cloud API or, when configured,
//! through the LIFX LAN protocol.
//!
//! ## Quick Start
//!
//! ```ignore
//! use lifx_bridge_rs::{LanMode, Platform, PlatformConfig, Property};
//!
//! async fn run() -> Result<(), lifx_bridge_rs::Error> {
//!     let platform = Platform::new(PlatformConfig::new("c0ffee...", LanMode::GetOnly)).await?;
//!
//!     for accessory in platform.accessories().await? {
//!         let services = accessory.services();
//!         accessory.set_brightness(50.0).await?;
//!         println!("{} is at {}", accessory.name(), accessory.get(Property::Brightness).await?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## LAN modes
//!
//! The `use_lan` configuration value selects where calls go:
//!
//! - absent or `false`: reads and writes over the cloud API
//! - `"get"`: reads from the LAN client's cached state, writes over the cloud API
//! - `true` or `"true"`: reads and writes over the LAN
//!
//! ## Communication
//!
//! The cloud API is reached over HTTPS at `https://api.lifx.com/v1` with a
//! personal access token. LAN traffic is UDP on port 56700; bulbs are found
//! by broadcast and polled for state, and every state report is pushed to
//! the accessories that follow that bulb.

mod accessory;
mod config;
mod context;
mod device;
mod errors;
pub mod hap;
pub mod lan;
mod platform;
mod remote;
pub mod runtime;
mod types;

#[cfg(test)]
mod testing;

// Re-export public API
pub use accessory::{Accessory, LAN_KELVIN, Subscription, remote_color};
pub use config::{DEFAULT_REMOTE_URL, LanMode, LanOptions, PlatformConfig};
pub use context::BridgeContext;
pub use device::{Capabilities, DeviceRecord, Product, RemoteColor};
pub use errors::Error;
pub use hap::{
    AccessoryInformation, Characteristic, CharacteristicValue, LightbulbService, Service, Source,
    Wiring,
};
pub use lan::{Bulb, LanApi, LanClient};
pub use platform::Platform;
pub use remote::{BreatheEffect, RemoteApi, RemoteClient, StateChange};
pub use types::{ColorChannel, LightState, PowerState, Property, Selector, scale};
