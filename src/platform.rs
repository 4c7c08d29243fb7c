//! Platform entry point: builds the adapters and lists accessories.

use std::sync::Arc;

use log::{debug, info};

use crate::accessory::Accessory;
use crate::config::PlatformConfig;
use crate::context::BridgeContext;
use crate::device::DeviceRecord;
use crate::errors::Error;
use crate::lan::{LanApi, LanClient};
use crate::remote::{RemoteApi, RemoteClient};
use crate::types::Selector;

type Result<T> = std::result::Result<T, Error>;

/// The bridge as the host sees it at startup.
///
/// # Example
///
/// ```ignore
/// use lifx_bridge_rs::{Platform, PlatformConfig};
///
/// let config = PlatformConfig::from_file("config.json")?;
/// let platform = Platform::new(config).await?;
/// for accessory in platform.accessories().await? {
///     println!("{} ({})", accessory.name(), accessory.model());
/// }
/// ```
pub struct Platform {
    name: String,
    context: Arc<BridgeContext>,
    lan: Option<Arc<LanClient>>,
}

impl Platform {
    pub const DEFAULT_NAME: &'static str = "LIFx";

    /// Build the cloud client and, when `use_lan` asks for it, start the LAN client.
    pub async fn new(config: PlatformConfig) -> Result<Self> {
        let remote = RemoteClient::new(&config.access_token, config.remote_url())?;

        let lan = if config.use_lan.uses_lan() {
            Some(Arc::new(LanClient::start(config.lan.clone()).await?))
        } else {
            None
        };

        let context = BridgeContext::new(
            config.use_lan,
            Arc::new(remote),
            lan.clone().map(|lan| lan as Arc<dyn LanApi>),
        );
        let mut platform = Self::with_context(Arc::new(context));
        platform.lan = lan;
        if let Some(name) = config.name {
            platform.name = name;
        }
        Ok(platform)
    }

    /// Build a platform over already constructed adapters.
    pub fn with_context(context: Arc<BridgeContext>) -> Self {
        Platform {
            name: Self::DEFAULT_NAME.to_string(),
            context,
            lan: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &Arc<BridgeContext> {
        &self.context
    }

    pub fn remote(&self) -> &Arc<dyn RemoteApi> {
        &self.context.remote
    }

    /// Fetch every light from the cloud API and wrap each in an accessory.
    ///
    /// Accessories come back in the order the API listed them.
    pub async fn accessories(&self) -> Result<Vec<Accessory>> {
        info!("Fetching LIFX devices.");
        let body = self.context.remote.list_lights(&Selector::All).await?;
        let records = DeviceRecord::parse_list(&body)?;
        debug!("Cloud API listed {} lights", records.len());

        Ok(records
            .iter()
            .map(|record| Accessory::new(record, Arc::clone(&self.context)))
            .collect())
    }

    /// Stop the LAN client's background tasks, if one was started.
    pub fn shutdown(&self) {
        if let Some(lan) = &self.lan {
            lan.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanMode;
    use crate::hap::{Source, Wiring};
    use crate::testing::{FakeLan, FakeRemote, RemoteCall, bulb};
    use crate::types::LightState;

    const LIGHTS: &str = r#"[
        {"id": "d073d5000002", "uuid": "u2", "label": "Hall", "connected": true,
         "product_name": "LIFX White 800", "capabilities": {"has_color": false}},
        {"id": "d073d5000001", "uuid": "u1", "label": "Kitchen", "connected": true,
         "product": {"name": "LIFX A19", "capabilities": {"has_color": true}}}
    ]"#;

    #[tokio::test]
    async fn test_accessories_in_response_order() {
        let remote = Arc::new(FakeRemote::with_lights(LIGHTS));
        let context = BridgeContext::new(LanMode::Disabled, remote.clone(), None);
        let platform = Platform::with_context(Arc::new(context));

        let accessories = platform.accessories().await.unwrap();
        let names: Vec<&str> = accessories.iter().map(|a| a.name()).collect();
        assert_eq!(names, ["Hall", "Kitchen"]);
        assert_eq!(accessories[1].model(), "LIFX A19");
        assert!(accessories[1].has_color());
        assert_eq!(remote.calls(), vec![RemoteCall::List("all".to_string())]);
        assert_eq!(platform.name(), Platform::DEFAULT_NAME);
    }

    #[tokio::test]
    async fn test_local_mode_subscribes_known_bulbs_only() {
        let remote = Arc::new(FakeRemote::with_lights(LIGHTS));
        let lan = Arc::new(FakeLan::default());
        lan.insert(bulb("d073d5000001", LightState::default()));
        let context = BridgeContext::new(
            LanMode::GetOnly,
            remote,
            Some(lan.clone() as Arc<dyn LanApi>),
        );
        let platform = Platform::with_context(Arc::new(context));

        let accessories = platform.accessories().await.unwrap();
        assert!(!accessories[0].is_subscribed());
        assert!(accessories[1].is_subscribed());
        assert_eq!(
            accessories[1].wiring(),
            Wiring {
                read: Source::Lan,
                write: Source::Remote
            }
        );
        assert_eq!(lan.receiver_count(), 1);
    }

    #[tokio::test]
    async fn test_list_failure_propagates() {
        let context = BridgeContext::new(LanMode::Disabled, Arc::new(FakeRemote::failing()), None);
        let platform = Platform::with_context(Arc::new(context));
        assert!(matches!(
            platform.accessories().await,
            Err(Error::Api { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_new_without_lan() {
        let mut config = PlatformConfig::new("token", LanMode::Disabled);
        config.name = Some("Lights".to_string());
        let platform = Platform::new(config).await.unwrap();
        assert_eq!(platform.name(), "Lights");
        assert!(platform.context().lan.is_none());
        platform.shutdown();
    }
}
