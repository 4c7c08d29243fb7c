//! Shared adapters handed to every accessory.

use std::sync::Arc;

use crate::config::LanMode;
use crate::hap::Wiring;
use crate::lan::LanApi;
use crate::remote::RemoteApi;

/// Process-wide collaborators: the LAN mode, the cloud client and the LAN
/// client when it runs.
///
/// Accessories hold an `Arc` to one context; none of them own the adapters.
pub struct BridgeContext {
    pub mode: LanMode,
    pub remote: Arc<dyn RemoteApi>,
    pub lan: Option<Arc<dyn LanApi>>,
}

impl BridgeContext {
    pub fn new(mode: LanMode, remote: Arc<dyn RemoteApi>, lan: Option<Arc<dyn LanApi>>) -> Self {
        BridgeContext { mode, remote, lan }
    }

    pub fn wiring(&self) -> Wiring {
        Wiring::from(self.mode)
    }

    /// The LAN client, when the mode reads over the LAN.
    pub fn local(&self) -> Option<&Arc<dyn LanApi>> {
        self.lan.as_ref().filter(|_| self.mode.uses_lan())
    }
}

impl std::fmt::Debug for BridgeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeContext")
            .field("mode", &self.mode)
            .field("lan", &self.lan.is_some())
            .finish()
    }
}
