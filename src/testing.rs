//! Recording fakes of the cloud and LAN adapters.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::json;
use tokio::sync::broadcast;

use crate::device::DeviceRecord;
use crate::errors::Error;
use crate::lan::{Bulb, Hsbk, LanApi};
use crate::remote::{BreatheEffect, RemoteApi, StateChange};
use crate::runtime::BoxFuture;
use crate::types::{LightState, Selector};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    List(String),
    SetState(String, StateChange),
    Breathe(String, BreatheEffect),
}

/// Answers every list call with the same body and records all calls.
#[derive(Default)]
pub struct FakeRemote {
    lights: String,
    fail: bool,
    calls: Mutex<Vec<RemoteCall>>,
}

impl FakeRemote {
    pub fn with_lights(body: &str) -> Self {
        FakeRemote {
            lights: body.to_string(),
            ..Default::default()
        }
    }

    /// Every call answers with a 500.
    pub fn failing() -> Self {
        FakeRemote {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: RemoteCall, body: &str) -> Result<String> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(Error::Api {
                status: 500,
                body: "server error".to_string(),
            });
        }
        Ok(body.to_string())
    }
}

impl RemoteApi for FakeRemote {
    fn list_lights<'a>(&'a self, selector: &'a Selector) -> BoxFuture<'a, Result<String>> {
        let result = self.answer(RemoteCall::List(selector.to_string()), &self.lights);
        Box::pin(async move { result })
    }

    fn set_state<'a>(
        &'a self,
        selector: &'a Selector,
        change: &'a StateChange,
    ) -> BoxFuture<'a, Result<String>> {
        let result = self.answer(
            RemoteCall::SetState(selector.to_string(), change.clone()),
            r#"{"results": []}"#,
        );
        Box::pin(async move { result })
    }

    fn breathe<'a>(
        &'a self,
        selector: &'a Selector,
        effect: &'a BreatheEffect,
    ) -> BoxFuture<'a, Result<String>> {
        let result = self.answer(
            RemoteCall::Breathe(selector.to_string(), effect.clone()),
            r#"{"results": []}"#,
        );
        Box::pin(async move { result })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanCall {
    On(String),
    Off(String),
    Colour(String, Hsbk, u32),
}

/// In-memory LAN client.
pub struct FakeLan {
    bulbs: Mutex<HashMap<String, Bulb>>,
    events: broadcast::Sender<Bulb>,
    calls: Mutex<Vec<LanCall>>,
}

impl Default for FakeLan {
    fn default() -> Self {
        FakeLan {
            bulbs: Mutex::new(HashMap::new()),
            events: broadcast::channel(16).0,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeLan {
    pub fn insert(&self, bulb: Bulb) {
        self.bulbs.lock().unwrap().insert(bulb.id.clone(), bulb);
    }

    /// Record a state report and broadcast it like the real client does.
    pub fn publish(&self, bulb: Bulb) {
        self.insert(bulb.clone());
        let _ = self.events.send(bulb);
    }

    pub fn receiver_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Reports not yet seen by every subscriber.
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn calls(&self) -> Vec<LanCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: LanCall) -> BoxFuture<'_, Result<()>> {
        self.calls.lock().unwrap().push(call);
        Box::pin(async { Ok(()) })
    }
}

impl LanApi for FakeLan {
    fn bulb(&self, id: &str) -> Option<Bulb> {
        self.bulbs.lock().unwrap().get(id).cloned()
    }

    fn subscribe(&self) -> broadcast::Receiver<Bulb> {
        self.events.subscribe()
    }

    fn lights_on<'a>(&'a self, bulb: &'a Bulb) -> BoxFuture<'a, Result<()>> {
        self.record(LanCall::On(bulb.id.clone()))
    }

    fn lights_off<'a>(&'a self, bulb: &'a Bulb) -> BoxFuture<'a, Result<()>> {
        self.record(LanCall::Off(bulb.id.clone()))
    }

    fn lights_colour<'a>(
        &'a self,
        color: Hsbk,
        duration_ms: u32,
        bulb: &'a Bulb,
    ) -> BoxFuture<'a, Result<()>> {
        self.record(LanCall::Colour(bulb.id.clone(), color, duration_ms))
    }
}

pub fn bulb(id: &str, state: LightState) -> Bulb {
    Bulb {
        state,
        ..Bulb::new(id, SocketAddr::from(([127, 0, 0, 1], 56700)))
    }
}

/// A listed light with the older flat product fields.
pub fn record(id: &str, has_color: bool) -> DeviceRecord {
    serde_json::from_value(json!({
        "id": id,
        "uuid": format!("serial-{id}"),
        "label": format!("Light {id}"),
        "connected": true,
        "power": "on",
        "brightness": 1.0,
        "product_name": if has_color { "LIFX A19" } else { "LIFX White 800" },
        "capabilities": {"has_color": has_color},
    }))
    .unwrap()
}

/// Wait until `check` passes, giving background tasks a chance to run.
pub async fn eventually<F: Fn() -> bool>(check: F) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
