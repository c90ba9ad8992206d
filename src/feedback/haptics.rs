//! Vibration patterns and the impact-intensity side channel.

use tracing::debug;

use super::capability::CapabilityCache;
use crate::error::{Channel, CopyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPattern {
    Success,
    Error,
    Light,
    Medium,
    Heavy,
}

/// Strength for devices exposing a discrete impact generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Light,
    Medium,
    Heavy,
}

impl HapticPattern {
    /// Alternating on/off durations in milliseconds.
    pub fn vibration(&self) -> &'static [u64] {
        match self {
            HapticPattern::Success => &[50],
            HapticPattern::Error => &[100, 50, 100],
            HapticPattern::Light => &[10],
            HapticPattern::Medium => &[50],
            HapticPattern::Heavy => &[100],
        }
    }

    pub fn intensity(&self) -> Intensity {
        match self {
            HapticPattern::Error | HapticPattern::Heavy => Intensity::Heavy,
            HapticPattern::Success | HapticPattern::Medium => Intensity::Medium,
            HapticPattern::Light => Intensity::Light,
        }
    }
}

pub trait HapticDriver: Send + Sync {
    fn vibrate(&self, pattern: &[u64]) -> Result<(), CopyError>;

    /// Optional impact generator; most platforms have none.
    fn impact(&self, _intensity: Intensity) -> Result<(), CopyError> {
        Err(CopyError::ChannelUnavailable(Channel::Haptics))
    }
}

/// Request `pattern` from the driver. The impact side channel is best-effort
/// and never fails the call.
pub fn trigger(
    driver: &dyn HapticDriver,
    capabilities: &CapabilityCache,
    pattern: HapticPattern,
) -> Result<(), CopyError> {
    capabilities.require(Channel::Haptics)?;
    driver.vibrate(pattern.vibration())?;
    if let Err(e) = driver.impact(pattern.intensity()) {
        debug!("Impact feedback skipped: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::capability::{Capability, CapabilityProbe};
    use std::sync::{Arc, Mutex};

    struct Probe(Capability);

    impl CapabilityProbe for Probe {
        fn probe(&self, _channel: Channel) -> Capability {
            self.0
        }
    }

    #[derive(Default)]
    struct Recorder {
        patterns: Mutex<Vec<Vec<u64>>>,
        impacts: Mutex<Vec<Intensity>>,
    }

    impl HapticDriver for Recorder {
        fn vibrate(&self, pattern: &[u64]) -> Result<(), CopyError> {
            self.patterns.lock().unwrap().push(pattern.to_vec());
            Ok(())
        }

        fn impact(&self, intensity: Intensity) -> Result<(), CopyError> {
            self.impacts.lock().unwrap().push(intensity);
            Ok(())
        }
    }

    struct VibrateOnly(Mutex<usize>);

    impl HapticDriver for VibrateOnly {
        fn vibrate(&self, _pattern: &[u64]) -> Result<(), CopyError> {
            *self.0.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[test]
    fn test_patterns() {
        assert_eq!(HapticPattern::Success.vibration(), &[50]);
        assert_eq!(HapticPattern::Error.vibration(), &[100, 50, 100]);
        assert_eq!(HapticPattern::Light.vibration(), &[10]);
        assert_eq!(HapticPattern::Error.intensity(), Intensity::Heavy);
        assert_eq!(HapticPattern::Success.intensity(), Intensity::Medium);
    }

    #[test]
    fn test_trigger_vibrates_and_impacts() {
        let caps = CapabilityCache::new(Arc::new(Probe(Capability::Supported)));
        let driver = Recorder::default();
        trigger(&driver, &caps, HapticPattern::Error).unwrap();

        assert_eq!(*driver.patterns.lock().unwrap(), vec![vec![100, 50, 100]]);
        assert_eq!(*driver.impacts.lock().unwrap(), vec![Intensity::Heavy]);
    }

    #[test]
    fn test_missing_impact_is_not_an_error() {
        let caps = CapabilityCache::new(Arc::new(Probe(Capability::Supported)));
        let driver = VibrateOnly(Mutex::new(0));
        assert!(trigger(&driver, &caps, HapticPattern::Success).is_ok());
        assert_eq!(*driver.0.lock().unwrap(), 1);
    }

    #[test]
    fn test_unsupported_skips_driver() {
        let caps = CapabilityCache::new(Arc::new(Probe(Capability::Unsupported)));
        let driver = Recorder::default();
        let err = trigger(&driver, &caps, HapticPattern::Success).unwrap_err();
        assert_eq!(err, CopyError::ChannelUnavailable(Channel::Haptics));
        assert!(driver.patterns.lock().unwrap().is_empty());
    }
}
