/// All error types that can occur while bridging LIFX lights.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The device is unknown to the LAN client or reported as disconnected by the cloud API.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// The HTTP request to the cloud API could not be completed.
    #[error("http {action} error: {err}")]
    Http { action: String, err: reqwest::Error },

    /// The cloud API answered with a non-success status.
    #[error("lifx api returned {status}: {body}")]
    Api { status: u16, body: String },

    /// A network socket operation failed while talking to bulbs on the LAN.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// A LAN frame could not be decoded.
    #[error("malformed lan packet: {0}")]
    Packet(String),

    /// The platform configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new http error
    pub fn http(action: &str, err: reqwest::Error) -> Self {
        Error::Http {
            action: action.to_string(),
            err,
        }
    }

    pub fn device_not_found(id: &str) -> Self {
        Error::DeviceNotFound(id.to_string())
    }

    pub fn packet(reason: impl Into<String>) -> Self {
        Error::Packet(reason.into())
    }

    /// Whether this is the one error kind the bridge raises itself.
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, Error::DeviceNotFound(_))
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
