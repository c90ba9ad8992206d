//! Platform collaborators bundled for widget mounts.
//!
//! Clones of one `Platform` share the capability cache and the audio
//! output, so every widget mounted from it detects capabilities once and
//! plays through a single output.

pub mod headless;
pub mod native;

use std::sync::Arc;
use tracing::info;

use crate::accessibility::PreferenceProbe;
use crate::clipboard::{LegacyCopy, ModernClipboard};
use crate::feedback::{
    AudioBackend, AudioHandle, CapabilityCache, CapabilityProbe, Celebration, HapticDriver,
    LiveRegion,
};
use crate::telemetry::{AmbientContext, SignalSource};

pub use headless::HeadlessPlatform;
pub use native::NativePlatform;

#[derive(Clone)]
pub struct Platform {
    pub modern: Arc<dyn ModernClipboard>,
    pub legacy: Arc<dyn LegacyCopy>,
    pub haptics: Arc<dyn HapticDriver>,
    pub audio: Arc<AudioHandle>,
    pub live_region: Arc<dyn LiveRegion>,
    pub celebration: Arc<dyn Celebration>,
    pub capabilities: CapabilityCache,
    pub preferences: Arc<dyn PreferenceProbe>,
    pub signals: Arc<dyn SignalSource>,
    pub ambient: AmbientContext,
}

/// Raw collaborators before the shared pieces are built around them.
pub struct Collaborators {
    pub modern: Arc<dyn ModernClipboard>,
    pub legacy: Arc<dyn LegacyCopy>,
    pub haptics: Arc<dyn HapticDriver>,
    pub audio: Arc<dyn AudioBackend>,
    pub live_region: Arc<dyn LiveRegion>,
    pub celebration: Arc<dyn Celebration>,
    pub capabilities: Arc<dyn CapabilityProbe>,
    pub preferences: Arc<dyn PreferenceProbe>,
    pub signals: Arc<dyn SignalSource>,
    pub ambient: AmbientContext,
}

impl Platform {
    pub fn new(parts: Collaborators) -> Self {
        let capabilities = CapabilityCache::new(parts.capabilities);
        Self {
            modern: parts.modern,
            legacy: parts.legacy,
            haptics: parts.haptics,
            audio: AudioHandle::new(parts.audio, capabilities.clone()),
            live_region: parts.live_region,
            celebration: parts.celebration,
            capabilities,
            preferences: parts.preferences,
            signals: parts.signals,
            ambient: parts.ambient,
        }
    }

    /// Process teardown: release resources shared across mounts.
    ///
    /// Unmounting a widget leaves these alone; call this once no widget
    /// built from this platform will play again.
    pub fn shutdown(&self) {
        self.audio.shutdown();
        info!("Platform resources released");
    }
}
