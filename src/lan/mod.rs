//! LIFX LAN protocol support.
//!
//! The [`LanClient`] discovers bulbs by broadcast, keeps the last state each
//! bulb reported and publishes every state report on a broadcast channel.
//! Accessories consume it through the [`LanApi`] trait.

mod client;
mod packet;

use std::net::SocketAddr;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::errors::Error;
use crate::runtime::BoxFuture;
use crate::types::LightState;

pub use client::LanClient;
pub use packet::{HEADER_SIZE, Hsbk, Message, Packet, SERVICE_UDP, target_from_id};

type Result<T> = std::result::Result<T, Error>;

/// A bulb known to the LAN client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bulb {
    /// MAC as lowercase hex; matches the cloud API's light id.
    pub id: String,
    pub addr: SocketAddr,
    pub label: String,
    pub state: LightState,
}

impl Bulb {
    pub fn new(id: &str, addr: SocketAddr) -> Self {
        Bulb {
            id: id.to_string(),
            addr,
            label: String::new(),
            state: LightState::default(),
        }
    }
}

/// Operations an accessory needs from the LAN client.
pub trait LanApi: Send + Sync {
    /// Current record for a bulb, if it has been discovered.
    fn bulb(&self, id: &str) -> Option<Bulb>;

    /// Stream of bulbs whose state was just reported.
    fn subscribe(&self) -> broadcast::Receiver<Bulb>;

    fn lights_on<'a>(&'a self, bulb: &'a Bulb) -> BoxFuture<'a, Result<()>>;

    fn lights_off<'a>(&'a self, bulb: &'a Bulb) -> BoxFuture<'a, Result<()>>;

    fn lights_colour<'a>(
        &'a self,
        color: Hsbk,
        duration_ms: u32,
        bulb: &'a Bulb,
    ) -> BoxFuture<'a, Result<()>>;
}
