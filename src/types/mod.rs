//! Value types shared by the cloud and LAN paths.

mod power;
mod property;
pub mod scale;
mod selector;
mod state;

pub use power::PowerState;
pub use property::{ColorChannel, Property};
pub use selector::Selector;
pub use state::LightState;
