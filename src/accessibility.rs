//! Accessibility snapshot consumed by the feedback orchestrator.
//!
//! Derived once at mount from the platform's detected preferences and the
//! explicit configuration, then shared read-only.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::config::AccessibilityOverrides;

/// Preferences the platform reports (the media-query equivalents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformPreferences {
    pub prefers_reduced_motion: bool,
    pub prefers_high_contrast: bool,
    pub prefers_dark: bool,
}

/// Source of [`PlatformPreferences`].
pub trait PreferenceProbe: Send + Sync {
    fn detect(&self) -> PlatformPreferences;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityConfig {
    pub high_contrast: bool,
    pub reduced_motion: bool,
    pub announce_actions: bool,
    pub keyboard_navigation: bool,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            high_contrast: false,
            reduced_motion: false,
            announce_actions: true,
            keyboard_navigation: true,
        }
    }
}

impl AccessibilityConfig {
    /// Combine detected preferences with explicit settings.
    ///
    /// Motion and contrast can only be tightened: a platform reporting
    /// reduced motion or high contrast wins over an explicit `false`.
    pub fn derive(overrides: &AccessibilityOverrides, detected: PlatformPreferences) -> Self {
        let defaults = Self::default();
        let config = Self {
            high_contrast: overrides.high_contrast.unwrap_or(defaults.high_contrast)
                || detected.prefers_high_contrast,
            reduced_motion: overrides.reduced_motion.unwrap_or(defaults.reduced_motion)
                || detected.prefers_reduced_motion,
            announce_actions: overrides
                .announce_actions
                .unwrap_or(defaults.announce_actions),
            keyboard_navigation: overrides
                .keyboard_navigation
                .unwrap_or(defaults.keyboard_navigation),
        };
        debug!("Accessibility context: {:?}", config);
        config
    }

    /// Whether motion effects (the celebration burst) may run.
    pub fn allows_motion(&self) -> bool {
        !self.reduced_motion
    }
}

/// Shared, immutable accessibility snapshot.
pub type AccessibilityContext = Arc<AccessibilityConfig>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_announce_and_keyboard() {
        let config = AccessibilityConfig::default();
        assert!(config.announce_actions);
        assert!(config.keyboard_navigation);
        assert!(config.allows_motion());
    }

    #[test]
    fn test_detected_preferences_apply_when_unset() {
        let detected = PlatformPreferences {
            prefers_reduced_motion: true,
            prefers_high_contrast: true,
            prefers_dark: false,
        };
        let config = AccessibilityConfig::derive(&AccessibilityOverrides::default(), detected);
        assert!(config.reduced_motion);
        assert!(config.high_contrast);
        assert!(!config.allows_motion());
    }

    #[test]
    fn test_detected_preferences_beat_explicit_false() {
        let detected = PlatformPreferences {
            prefers_reduced_motion: true,
            prefers_high_contrast: true,
            prefers_dark: false,
        };
        let overrides = AccessibilityOverrides {
            reduced_motion: Some(false),
            high_contrast: Some(false),
            ..Default::default()
        };
        let config = AccessibilityConfig::derive(&overrides, detected);
        assert!(config.reduced_motion);
        assert!(config.high_contrast);
        assert!(!config.allows_motion());
    }

    #[test]
    fn test_explicit_true_applies_without_detection() {
        let overrides = AccessibilityOverrides {
            reduced_motion: Some(true),
            announce_actions: Some(false),
            ..Default::default()
        };
        let config = AccessibilityConfig::derive(&overrides, PlatformPreferences::default());
        assert!(config.reduced_motion);
        assert!(!config.high_contrast);
        assert!(!config.announce_actions);
    }
}
