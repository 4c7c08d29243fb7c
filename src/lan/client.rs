//! UDP client for bulbs on the local network.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::packet::{Hsbk, Message, Packet, SERVICE_UDP, target_from_id};
use super::{Bulb, LanApi};
use crate::config::LanOptions;
use crate::errors::Error;
use crate::runtime::{self, AsyncUdpSocket, BoxFuture, JoinHandle, UdpSocket};
use crate::types::{LightState, PowerState};

type Result<T> = std::result::Result<T, Error>;

/// Discovers LIFX bulbs on the LAN and tracks their reported state.
///
/// Two background tasks run while the client is alive: a listener that
/// decodes every reply, and a poller that repeats discovery and asks every
/// known bulb for its state. Dropping the client stops both.
pub struct LanClient {
    inner: Arc<Inner>,
    tasks: Mutex<Vec<JoinHandle>>,
}

struct Inner {
    socket: UdpSocket,
    source: u32,
    sequence: AtomicU8,
    bulbs: Mutex<HashMap<String, Bulb>>,
    events: broadcast::Sender<Bulb>,
    options: LanOptions,
}

impl LanClient {
    const EVENT_CAPACITY: usize = 64;
    const RECV_BUFFER: usize = 1024;
    const ERROR_BACKOFF: Duration = Duration::from_millis(250);

    /// Bind a broadcast socket and start discovering bulbs.
    pub async fn start(options: LanOptions) -> Result<Self> {
        options.validate()?;
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| Error::socket("bind", e))?;
        socket
            .set_broadcast(true)
            .map_err(|e| Error::socket("set_broadcast", e))?;

        let (events, _) = broadcast::channel(Self::EVENT_CAPACITY);
        let inner = Arc::new(Inner {
            socket,
            // Zero would make bulbs broadcast their replies.
            source: (Uuid::new_v4().as_u128() as u32).max(2),
            sequence: AtomicU8::new(0),
            bulbs: Mutex::new(HashMap::new()),
            events,
            options,
        });

        let listener = runtime::spawn(Arc::clone(&inner).listen());
        let poller = runtime::spawn(Arc::clone(&inner).poll());
        info!("LAN client started (source {:08x})", inner.source);

        Ok(LanClient {
            inner,
            tasks: Mutex::new(vec![listener, poller]),
        })
    }

    /// All bulbs discovered so far.
    pub fn bulbs(&self) -> Vec<Bulb> {
        self.inner.snapshot()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.tasks).iter().any(|task| !task.is_finished())
    }

    /// Stop the background tasks. Known bulbs stay readable.
    pub fn stop(&self) {
        for task in lock(&self.tasks).drain(..) {
            task.abort();
        }
    }

    async fn set_power(&self, bulb: &Bulb, power: PowerState) -> Result<()> {
        debug!("LAN power {power} -> {}", bulb.id);
        self.inner
            .send_to_bulb(
                bulb,
                Message::LightSetPower {
                    level: power.level(),
                    duration_ms: 0,
                },
            )
            .await?;
        self.inner.send_to_bulb(bulb, Message::LightGet).await
    }
}

impl LanApi for LanClient {
    fn bulb(&self, id: &str) -> Option<Bulb> {
        lock(&self.inner.bulbs).get(id).cloned()
    }

    fn subscribe(&self) -> broadcast::Receiver<Bulb> {
        self.inner.events.subscribe()
    }

    fn lights_on<'a>(&'a self, bulb: &'a Bulb) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.set_power(bulb, PowerState::On))
    }

    fn lights_off<'a>(&'a self, bulb: &'a Bulb) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.set_power(bulb, PowerState::Off))
    }

    fn lights_colour<'a>(
        &'a self,
        color: Hsbk,
        duration_ms: u32,
        bulb: &'a Bulb,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            debug!("LAN colour {color:?} -> {}", bulb.id);
            self.inner
                .send_to_bulb(bulb, Message::LightSetColor { color, duration_ms })
                .await?;
            self.inner.send_to_bulb(bulb, Message::LightGet).await
        })
    }
}

impl Drop for LanClient {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Inner {
    fn snapshot(&self) -> Vec<Bulb> {
        lock(&self.bulbs).values().cloned().collect()
    }

    fn next_sequence(&self) -> u8 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    async fn send(&self, target: [u8; 8], addr: SocketAddr, message: Message) -> Result<()> {
        let mut packet = Packet::new(self.source, target, self.next_sequence(), message);
        packet.res_required = matches!(packet.message, Message::LightGet);
        self.socket
            .send_to(&packet.encode(), addr)
            .await
            .map_err(|e| Error::socket("send_to", e))?;
        Ok(())
    }

    async fn send_to_bulb(&self, bulb: &Bulb, message: Message) -> Result<()> {
        let target = target_from_id(&bulb.id)
            .ok_or_else(|| Error::packet(format!("bulb id {} is not a MAC", bulb.id)))?;
        self.send(target, bulb.addr, message).await
    }

    async fn discover(&self) -> Result<()> {
        self.send([0; 8], self.options.broadcast, Message::GetService)
            .await
    }

    async fn listen(self: Arc<Self>) {
        let mut buffer = [0u8; LanClient::RECV_BUFFER];
        loop {
            match self.socket.recv_from(&mut buffer).await {
                Ok((size, addr)) => match Packet::decode(&buffer[..size]) {
                    Ok(packet) => self.handle(packet, addr).await,
                    Err(e) => debug!("Ignoring frame from {addr}: {e}"),
                },
                Err(e) => {
                    error!("LAN socket error: {e}");
                    runtime::sleep(LanClient::ERROR_BACKOFF).await;
                }
            }
        }
    }

    async fn poll(self: Arc<Self>) {
        loop {
            if let Err(e) = self.discover().await {
                warn!("LAN discovery failed: {e}");
            }
            for bulb in self.snapshot() {
                if let Err(e) = self.send_to_bulb(&bulb, Message::LightGet).await {
                    warn!("LAN state request to {} failed: {e}", bulb.id);
                }
            }
            runtime::sleep(self.options.poll_interval()).await;
        }
    }

    async fn handle(&self, packet: Packet, from: SocketAddr) {
        let id = packet.device_id();
        match packet.message {
            Message::StateService { service, port } if service == SERVICE_UDP => {
                let addr = SocketAddr::new(from.ip(), port as u16);
                let known = {
                    let mut bulbs = lock(&self.bulbs);
                    let known = bulbs.contains_key(&id);
                    bulbs
                        .entry(id.clone())
                        .and_modify(|b| b.addr = addr)
                        .or_insert_with(|| Bulb::new(&id, addr));
                    known
                };
                if !known {
                    info!("Discovered LIFX bulb {id} at {addr}");
                    if let Err(e) = self.send(packet.target, addr, Message::LightGet).await {
                        warn!("LAN state request to {id} failed: {e}");
                    }
                }
            }
            Message::LightState {
                color,
                power,
                label,
            } => {
                self.update(&id, from, |bulb| {
                    bulb.label = label;
                    bulb.state = LightState {
                        power,
                        hue: color.hue,
                        saturation: color.saturation,
                        brightness: color.brightness,
                        kelvin: color.kelvin,
                    };
                });
            }
            Message::LightStatePower { level } => {
                self.update(&id, from, |bulb| bulb.state.power = level);
            }
            other => debug!("Unhandled LAN message {} from {id}", other.kind()),
        }
    }

    /// Apply a state report and publish the updated bulb.
    fn update<F: FnOnce(&mut Bulb)>(&self, id: &str, from: SocketAddr, apply: F) {
        let bulb = {
            let mut bulbs = lock(&self.bulbs);
            let bulb = bulbs
                .entry(id.to_string())
                .or_insert_with(|| Bulb::new(id, from));
            apply(bulb);
            bulb.clone()
        };
        // No receivers just means no accessory listens yet.
        let _ = self.events.send(bulb);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
