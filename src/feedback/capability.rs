//! Per-channel capability detection, probed once and cached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::{Channel, CopyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Supported,
    Unsupported,
}

/// Raw platform feature check for one channel.
pub trait CapabilityProbe: Send + Sync {
    fn probe(&self, channel: Channel) -> Capability;
}

/// Memoizes [`CapabilityProbe`] answers so call sites never re-probe.
#[derive(Clone)]
pub struct CapabilityCache {
    probe: Arc<dyn CapabilityProbe>,
    known: Arc<Mutex<HashMap<Channel, Capability>>>,
}

impl CapabilityCache {
    pub fn new(probe: Arc<dyn CapabilityProbe>) -> Self {
        Self {
            probe,
            known: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn get(&self, channel: Channel) -> Capability {
        let mut known = self.known.lock().unwrap_or_else(|p| p.into_inner());
        *known.entry(channel).or_insert_with(|| {
            let capability = self.probe.probe(channel);
            debug!("Capability probe: {} is {:?}", channel, capability);
            capability
        })
    }

    pub fn is_supported(&self, channel: Channel) -> bool {
        self.get(channel) == Capability::Supported
    }

    /// `Err(ChannelUnavailable)` when the channel is missing.
    pub fn require(&self, channel: Channel) -> Result<(), CopyError> {
        match self.get(channel) {
            Capability::Supported => Ok(()),
            Capability::Unsupported => Err(CopyError::ChannelUnavailable(channel)),
        }
    }
}
