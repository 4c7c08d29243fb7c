//! Platform configuration, as found in the host's platform block.
//!
//! ```json
//! {
//!     "platform": "LIFx",
//!     "name": "LIFx",
//!     "access_token": "c0ffee...",
//!     "use_lan": "get"
//! }
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

pub const DEFAULT_REMOTE_URL: &str = "https://api.lifx.com/v1";

/// Where reads and writes go, selected once by `use_lan`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanMode {
    /// Reads and writes over the cloud API.
    #[default]
    Disabled,
    /// Reads over the LAN, writes over the cloud API.
    GetOnly,
    /// Reads and writes over the LAN.
    Full,
}

impl LanMode {
    /// Whether the LAN client has to be started at all.
    pub fn uses_lan(&self) -> bool {
        !matches!(self, LanMode::Disabled)
    }

    /// Parse the string form of `use_lan`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_bridge_rs::LanMode;
    ///
    /// assert_eq!(LanMode::parse("true"), Some(LanMode::Full));
    /// assert_eq!(LanMode::parse("get"), Some(LanMode::GetOnly));
    /// assert_eq!(LanMode::parse("false"), Some(LanMode::Disabled));
    /// assert_eq!(LanMode::parse("sometimes"), None);
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "true" => Some(LanMode::Full),
            "get" => Some(LanMode::GetOnly),
            "false" | "" => Some(LanMode::Disabled),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for LanMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Text(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None | Some(Raw::Flag(false)) => Ok(LanMode::Disabled),
            Some(Raw::Flag(true)) => Ok(LanMode::Full),
            Some(Raw::Text(text)) => LanMode::parse(&text).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "use_lan must be true, false, \"true\" or \"get\", got {text:?}"
                ))
            }),
        }
    }
}

/// Settings for the LAN client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanOptions {
    /// Where discovery broadcasts are sent.
    pub broadcast: SocketAddr,
    /// How often discovery and state polls are repeated.
    pub poll_interval_ms: u64,
}

impl LanOptions {
    pub const PORT: u16 = 56700;
    /// Shorter intervals would flood the LAN with discovery broadcasts.
    pub const MIN_POLL_INTERVAL_MS: u64 = 100;

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms < Self::MIN_POLL_INTERVAL_MS {
            return Err(Error::Config(format!(
                "lan.poll_interval_ms must be at least {}, got {}",
                Self::MIN_POLL_INTERVAL_MS,
                self.poll_interval_ms
            )));
        }
        Ok(())
    }
}

impl Default for LanOptions {
    fn default() -> Self {
        Self {
            broadcast: SocketAddr::from(([255, 255, 255, 255], Self::PORT)),
            poll_interval_ms: 5000,
        }
    }
}

/// Configuration supplied by the host when the platform is constructed.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub platform: Option<String>,
    pub name: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub use_lan: LanMode,
    pub remote_url: Option<String>,
    #[serde(default)]
    pub lan: LanOptions,
}

impl PlatformConfig {
    pub fn new(access_token: &str, use_lan: LanMode) -> Self {
        Self {
            platform: None,
            name: None,
            access_token: access_token.to_string(),
            use_lan,
            remote_url: None,
            lan: LanOptions::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PlatformConfig = serde_json::from_str(json).map_err(Error::JsonLoad)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn remote_url(&self) -> &str {
        self.remote_url.as_deref().unwrap_or(DEFAULT_REMOTE_URL)
    }

    fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(Error::Config("access_token is required".to_string()));
        }
        self.lan.validate()
    }
}
