//! One bridged LIFX light.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::try_join_all;
use log::{debug, info, warn};
use strum::IntoEnumIterator;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::context::BridgeContext;
use crate::device::{Capabilities, DeviceRecord};
use crate::errors::Error;
use crate::hap::{
    AccessoryInformation, Characteristic, CharacteristicValue, LightbulbService, MANUFACTURER,
    Service, Source, Wiring,
};
use crate::lan::{Bulb, Hsbk, LanApi};
use crate::remote::{BreatheEffect, StateChange};
use crate::runtime::{self, JoinHandle};
use crate::types::{ColorChannel, LightState, PowerState, Property, Selector, scale};

type Result<T> = std::result::Result<T, Error>;

/// Kelvin sent with every LAN color change.
pub const LAN_KELVIN: u16 = 5500;

/// A host accessory backed by one LIFX light.
///
/// Reads and writes go to the LAN client or the cloud API according to the
/// [`Wiring`] chosen from the context's mode. In local mode the accessory
/// also follows the LAN client's state reports and pushes them into its
/// exposed characteristics.
#[derive(Debug)]
pub struct Accessory {
    id: String,
    name: String,
    model: String,
    serial: String,
    capabilities: Capabilities,
    selector: Selector,
    wiring: Wiring,
    context: Arc<BridgeContext>,
    cached: Arc<Mutex<Option<LightState>>>,
    exposed: Arc<Mutex<Option<LightbulbService>>>,
    subscription: Option<Subscription>,
}

/// Listener on the LAN state stream; dropping it stops the listener.
#[derive(Debug)]
pub struct Subscription {
    device_id: String,
    task: JoinHandle,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!("Releasing LAN subscription for {}", self.device_id);
        self.task.abort();
    }
}

impl Accessory {
    pub fn new(record: &DeviceRecord, context: Arc<BridgeContext>) -> Self {
        let mut accessory = Accessory {
            id: record.id.clone(),
            name: record.label.clone(),
            model: record.model().to_string(),
            serial: record.uuid.clone(),
            capabilities: record.capabilities(),
            selector: Selector::id(&record.id),
            wiring: context.wiring(),
            context,
            cached: Arc::new(Mutex::new(None)),
            exposed: Arc::new(Mutex::new(None)),
            subscription: None,
        };

        let known = accessory
            .context
            .local()
            .and_then(|lan| lan.bulb(&accessory.id).map(|bulb| (lan.subscribe(), bulb)));
        if let Some((events, bulb)) = known {
            *lock(&accessory.cached) = Some(bulb.state);
            accessory.subscription = Some(accessory.follow(events));
        }
        accessory
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn has_color(&self) -> bool {
        self.capabilities.has_color
    }

    pub fn wiring(&self) -> Wiring {
        self.wiring
    }

    /// Last state reported over the LAN, if any.
    pub fn cached_state(&self) -> Option<LightState> {
        *lock(&self.cached)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Properties shown to the host; hue and saturation need a color bulb.
    pub fn properties(&self) -> Vec<Property> {
        Property::iter()
            .filter(|p| !p.requires_color() || self.has_color())
            .collect()
    }

    /// Build the services handed to the host.
    ///
    /// From then on, LAN state reports are pushed into the returned
    /// lightbulb characteristics as they arrive.
    pub fn services(&self) -> Vec<Service> {
        let lightbulb = LightbulbService {
            name: self.name.clone(),
            characteristics: self
                .properties()
                .into_iter()
                .map(|p| Arc::new(Characteristic::new(p, self.wiring)))
                .collect(),
        };
        *lock(&self.exposed) = Some(lightbulb.clone());

        vec![
            Service::Lightbulb(lightbulb),
            Service::AccessoryInformation(AccessoryInformation {
                manufacturer: MANUFACTURER.to_string(),
                model: self.model.clone(),
                serial: self.serial.clone(),
            }),
        ]
    }

    pub async fn get(&self, property: Property) -> Result<CharacteristicValue> {
        match self.wiring.read {
            Source::Lan => self.get_lan(property),
            Source::Remote => self.get_remote(property).await,
        }
    }

    pub async fn set(&self, property: Property, value: CharacteristicValue) -> Result<()> {
        match (self.wiring.write, property.channel()) {
            (Source::Lan, None) => self.set_lan_power(value.as_bool()).await,
            (Source::Lan, Some(channel)) => self.set_lan_color(channel, value.as_f64()).await,
            (Source::Remote, None) => self.set_remote_power(value.as_bool()).await,
            (Source::Remote, Some(channel)) => {
                self.set_remote_color(channel, value.as_f64()).await
            }
        }
    }

    pub async fn get_power(&self) -> Result<CharacteristicValue> {
        self.get(Property::Power).await
    }

    pub async fn get_brightness(&self) -> Result<CharacteristicValue> {
        self.get(Property::Brightness).await
    }

    pub async fn get_hue(&self) -> Result<CharacteristicValue> {
        self.get(Property::Hue).await
    }

    pub async fn get_saturation(&self) -> Result<CharacteristicValue> {
        self.get(Property::Saturation).await
    }

    pub async fn set_power(&self, on: bool) -> Result<()> {
        self.set(Property::Power, on.into()).await
    }

    pub async fn set_brightness(&self, percent: f64) -> Result<()> {
        self.set(Property::Brightness, percent.into()).await
    }

    pub async fn set_hue(&self, degrees: f64) -> Result<()> {
        self.set(Property::Hue, degrees.into()).await
    }

    pub async fn set_saturation(&self, percent: f64) -> Result<()> {
        self.set(Property::Saturation, percent.into()).await
    }

    /// Read every exposed property concurrently.
    pub async fn snapshot(&self) -> Result<Vec<(Property, CharacteristicValue)>> {
        try_join_all(
            self.properties()
                .into_iter()
                .map(|p| async move { self.get(p).await.map(|v| (p, v)) }),
        )
        .await
    }

    /// Flash the bulb green so the user can find it.
    ///
    /// Never fails; a cloud error is only logged.
    pub async fn identify(&self) {
        match self
            .context
            .remote
            .breathe(&self.selector, &BreatheEffect::identify())
            .await
        {
            Ok(body) => debug!("Identify {}: {body}", self.id),
            Err(e) => warn!("Identify {} failed: {e}", self.id),
        }
    }

    /// Stop following LAN state reports.
    pub fn close(&mut self) {
        self.subscription = None;
    }

    pub fn get_lan(&self, property: Property) -> Result<CharacteristicValue> {
        let (_, bulb) = self.lan_bulb()?;
        let state = self.cached_state().unwrap_or(bulb.state);
        Ok(local_value(property, &state))
    }

    pub async fn get_remote(&self, property: Property) -> Result<CharacteristicValue> {
        let body = self.context.remote.list_lights(&self.selector).await?;
        let record = DeviceRecord::parse_one(&body, &self.id)?
            .filter(|r| r.connected)
            .ok_or_else(|| Error::device_not_found(&self.id))?;

        Ok(match property {
            Property::Power => CharacteristicValue::Int(i64::from(record.is_on())),
            Property::Brightness => {
                CharacteristicValue::Int(scale::fraction_to_percent(record.brightness))
            }
            Property::Hue => CharacteristicValue::Float(record.color.hue),
            Property::Saturation => {
                CharacteristicValue::Int(scale::fraction_to_percent(record.color.saturation))
            }
        })
    }

    pub async fn set_lan_power(&self, on: bool) -> Result<()> {
        info!("Setting LAN power: {on}");
        let (lan, bulb) = self.lan_bulb()?;
        if on {
            lan.lights_on(&bulb).await
        } else {
            lan.lights_off(&bulb).await
        }
    }

    /// Change one channel and resend the whole color, kelvin pinned to [`LAN_KELVIN`].
    pub async fn set_lan_color(&self, channel: ColorChannel, value: f64) -> Result<()> {
        info!("Setting LAN color: {channel} value: {value}");
        let (lan, bulb) = self.lan_bulb()?;

        let mut color = Hsbk {
            kelvin: LAN_KELVIN,
            ..Hsbk::from(&bulb.state)
        };
        let raw = scale::from_host(value, channel);
        match channel {
            ColorChannel::Hue => color.hue = raw,
            ColorChannel::Saturation => color.saturation = raw,
            ColorChannel::Brightness => color.brightness = raw,
            ColorChannel::Kelvin => color.kelvin = raw,
        }
        lan.lights_colour(color, 0, &bulb).await
    }

    pub async fn set_remote_power(&self, on: bool) -> Result<()> {
        let power = PowerState::from(on);
        info!("Setting remote power: {power}");
        self.context
            .remote
            .set_state(&self.selector, &StateChange::power(power, 0.0))
            .await
            .map(|_| ())
    }

    pub async fn set_remote_color(&self, channel: ColorChannel, value: f64) -> Result<()> {
        info!("Setting remote color: {channel}, value: {value}");
        let color = remote_color(channel, value);
        self.context
            .remote
            .set_state(&self.selector, &StateChange::color(&color, 0.0))
            .await
            .map(|_| ())
    }

    fn lan_bulb(&self) -> Result<(&Arc<dyn LanApi>, Bulb)> {
        self.context
            .lan
            .as_ref()
            .and_then(|lan| lan.bulb(&self.id).map(|bulb| (lan, bulb)))
            .ok_or_else(|| Error::device_not_found(&self.id))
    }

    fn follow(&self, mut events: broadcast::Receiver<Bulb>) -> Subscription {
        let id = self.id.clone();
        let cached = Arc::clone(&self.cached);
        let exposed = Arc::clone(&self.exposed);

        let task = runtime::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(bulb) if bulb.id == id => {
                        *lock(&cached) = Some(bulb.state);
                        if let Some(service) = lock(&exposed).as_ref() {
                            for c in &service.characteristics {
                                c.set_value(local_value(c.property(), &bulb.state));
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("LAN subscription for {id} skipped {skipped} reports")
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Subscription {
            device_id: self.id.clone(),
            task,
        }
    }
}

/// Host value of a property from a LAN state.
fn local_value(property: Property, state: &LightState) -> CharacteristicValue {
    match property {
        Property::Power => CharacteristicValue::Bool(state.is_on()),
        Property::Brightness => CharacteristicValue::Int(state.brightness_percent().into()),
        Property::Hue => CharacteristicValue::Int(state.hue_degrees().into()),
        Property::Saturation => CharacteristicValue::Int(state.saturation_percent().into()),
    }
}

/// Cloud color string for one channel; percentages become fractions.
///
/// # Examples
///
/// ```
/// use lifx_bridge_rs::{ColorChannel, remote_color};
///
/// assert_eq!(remote_color(ColorChannel::Hue, 180.0), "hue:180");
/// assert_eq!(remote_color(ColorChannel::Brightness, 50.0), "brightness:0.5");
/// ```
pub fn remote_color(channel: ColorChannel, value: f64) -> String {
    match channel {
        ColorChannel::Brightness | ColorChannel::Saturation => {
            format!("{channel}:{}", value / 100.0)
        }
        ColorChannel::Hue | ColorChannel::Kelvin => format!("{channel}:{value}"),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
