//! Light records returned by the cloud API's list call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;
use crate::types::PowerState;

type Result<T> = std::result::Result<T, Error>;

/// Capability flags of a product.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub has_color: bool,
    pub has_variable_color_temp: bool,
}

/// Product description nested in newer API responses.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub name: String,
    pub identifier: String,
    pub company: String,
    pub capabilities: Capabilities,
}

/// Color as the cloud API reports it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteColor {
    /// Degrees, 0-360.
    pub hue: f64,
    /// Fraction, 0-1.
    pub saturation: f64,
    pub kelvin: u16,
}

/// One light as listed by `GET /lights/{selector}`.
///
/// Older responses carry `product_name` and `capabilities` at the top level,
/// newer ones nest them under `product`; the accessors accept either.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub connected: bool,
    pub power: Option<PowerState>,
    #[serde(default)]
    pub brightness: f64,
    #[serde(default)]
    pub color: RemoteColor,
    product_name: Option<String>,
    capabilities: Option<Capabilities>,
    product: Option<Product>,
}

impl DeviceRecord {
    /// Parse the body of a list call.
    ///
    /// The body is a JSON array; a bare object is accepted as a one-element list.
    pub fn parse_list(body: &str) -> Result<Vec<DeviceRecord>> {
        let value: Value = serde_json::from_str(body).map_err(Error::JsonLoad)?;
        match value {
            Value::Array(_) => serde_json::from_value(value).map_err(Error::JsonLoad),
            other => serde_json::from_value(other)
                .map(|record| vec![record])
                .map_err(Error::JsonLoad),
        }
    }

    /// Find the record for `id` in the body of a filtered list call.
    pub fn parse_one(body: &str, id: &str) -> Result<Option<DeviceRecord>> {
        Ok(Self::parse_list(body)?.into_iter().find(|r| r.id == id))
    }

    pub fn model(&self) -> &str {
        self.product_name
            .as_deref()
            .or(self.product.as_ref().map(|p| p.name.as_str()))
            .unwrap_or_default()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
            .clone()
            .or_else(|| self.product.as_ref().map(|p| p.capabilities.clone()))
            .unwrap_or_default()
    }

    pub fn has_color(&self) -> bool {
        self.capabilities().has_color
    }

    pub fn is_on(&self) -> bool {
        self.power.is_some_and(|p| p.is_on())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_BODY: &str = r#"[
        {
            "id": "d073d5000001",
            "uuid": "026f8b9c-0000-4000-8000-000000000001",
            "label": "Kitchen",
            "connected": true,
            "power": "on",
            "color": {"hue": 120.5, "saturation": 0.5, "kelvin": 3500},
            "brightness": 0.42,
            "product": {
                "name": "LIFX A19",
                "identifier": "lifx_a19",
                "company": "LIFX",
                "capabilities": {"has_color": true, "has_variable_color_temp": true}
            }
        },
        {
            "id": "d073d5000002",
            "uuid": "026f8b9c-0000-4000-8000-000000000002",
            "label": "Hall",
            "connected": false,
            "power": "off",
            "brightness": 1.0,
            "product_name": "LIFX White 800",
            "capabilities": {"has_color": false}
        }
    ]"#;

    #[test]
    fn test_parse_list_keeps_order() {
        let records = DeviceRecord::parse_list(LIST_BODY).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["d073d5000001", "d073d5000002"]);
    }

    #[test]
    fn test_nested_and_flat_product() {
        let records = DeviceRecord::parse_list(LIST_BODY).unwrap();
        assert_eq!(records[0].model(), "LIFX A19");
        assert!(records[0].has_color());
        assert!(records[0].is_on());
        assert_eq!(records[1].model(), "LIFX White 800");
        assert!(!records[1].has_color());
        assert!(!records[1].is_on());
    }

    #[test]
    fn test_parse_one() {
        let record = DeviceRecord::parse_one(LIST_BODY, "d073d5000002")
            .unwrap()
            .unwrap();
        assert!(!record.connected);
        assert!(DeviceRecord::parse_one(LIST_BODY, "missing").unwrap().is_none());
    }

    #[test]
    fn test_single_object_body() {
        let body = r#"{"id": "abc", "connected": true, "brightness": 0.1}"#;
        let records = DeviceRecord::parse_list(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].model(), "");
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            DeviceRecord::parse_list("not json"),
            Err(Error::JsonLoad(_))
        ));
    }
}
