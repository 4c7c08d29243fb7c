//! Client for the LIFX cloud HTTP API.

use log::debug;
use reqwest::{Client, Method};
use serde::Serialize;

use crate::errors::Error;
use crate::runtime::BoxFuture;
use crate::types::{PowerState, Selector};

type Result<T> = std::result::Result<T, Error>;

/// Body of `PUT /lights/{selector}/state`.
#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub power: Option<PowerState>,
    pub color: Option<String>,
    /// Seconds.
    pub duration: f64,
}

impl StateChange {
    pub fn power(power: PowerState, duration: f64) -> Self {
        Self {
            power: Some(power),
            duration,
            ..Default::default()
        }
    }

    pub fn color(color: &str, duration: f64) -> Self {
        Self {
            color: Some(color.to_string()),
            duration,
            ..Default::default()
        }
    }
}

/// Body of `POST /lights/{selector}/effects/breathe`.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreatheEffect {
    pub color: String,
    pub from_color: Option<String>,
    /// Seconds per cycle.
    pub period: f64,
    pub cycles: f64,
    pub persist: bool,
    pub power_on: bool,
    pub peak: f64,
}

impl BreatheEffect {
    /// The short green pulse used to identify a bulb.
    pub fn identify() -> Self {
        Self {
            color: "green".to_string(),
            from_color: None,
            period: 1.0,
            cycles: 3.0,
            persist: false,
            power_on: true,
            peak: 0.5,
        }
    }
}

/// Operations the bridge needs from the cloud API.
///
/// Every call resolves to the raw response body; parsing is up to the caller.
pub trait RemoteApi: Send + Sync {
    fn list_lights<'a>(&'a self, selector: &'a Selector) -> BoxFuture<'a, Result<String>>;

    fn set_state<'a>(
        &'a self,
        selector: &'a Selector,
        change: &'a StateChange,
    ) -> BoxFuture<'a, Result<String>>;

    fn breathe<'a>(
        &'a self,
        selector: &'a Selector,
        effect: &'a BreatheEffect,
    ) -> BoxFuture<'a, Result<String>>;
}

/// reqwest-backed [`RemoteApi`] authenticated with a personal access token.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: Client,
    base_url: String,
    token: String,
}

impl RemoteClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("lifx-bridge-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http("build client", e))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, selector: &Selector, suffix: &str) -> String {
        format!("{}/lights/{}{}", self.base_url, selector, suffix)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
    ) -> Result<String> {
        debug!("{method} {url}");
        let mut request = self.http.request(method, &url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| Error::http("send", e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| Error::http("read", e))?;
        debug!("{url} -> {status}: {text}");

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

impl RemoteApi for RemoteClient {
    fn list_lights<'a>(&'a self, selector: &'a Selector) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.send::<()>(Method::GET, self.endpoint(selector, ""), None))
    }

    fn set_state<'a>(
        &'a self,
        selector: &'a Selector,
        change: &'a StateChange,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.send(Method::PUT, self.endpoint(selector, "/state"), Some(change)))
    }

    fn breathe<'a>(
        &'a self,
        selector: &'a Selector,
        effect: &'a BreatheEffect,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.send(
            Method::POST,
            self.endpoint(selector, "/effects/breathe"),
            Some(effect),
        ))
    }
}
