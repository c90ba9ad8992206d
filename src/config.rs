use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Address copied when no `CONTACT_EMAIL` is configured.
pub const DEFAULT_EMAIL: &str = "bennafla.riidha@gmail.com";

/// Fixed timings shared by the engine and its feedback channels.
pub mod timing {
    use std::time::Duration;

    pub const TOAST_SUCCESS: Duration = Duration::from_millis(3000);
    pub const TOAST_ERROR: Duration = Duration::from_millis(5000);
    pub const TOAST_INFO: Duration = Duration::from_millis(4000);
    pub const TOAST_WARNING: Duration = Duration::from_millis(4500);

    /// How long the control shows its "copied" label before returning to idle.
    pub const COPIED_STATE: Duration = Duration::from_millis(3000);
    /// Delay before the celebration burst so the toast appears first.
    pub const CONFETTI_DELAY: Duration = Duration::from_millis(100);
    /// Minimum spacing between two settled attempts.
    pub const COOLDOWN: Duration = Duration::from_millis(1000);
    /// Lifetime of a screen-reader announcement node.
    pub const ANNOUNCEMENT_LIFETIME: Duration = Duration::from_millis(1000);

    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(800);
    pub const MAX_RETRIES: u32 = 3;
}

/// Visual theme preference. Only resolved, never styled, by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Theme {
    pub fn parse(value: &str) -> Result<Theme> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "auto" => Ok(Theme::Auto),
            other => bail!("Invalid theme '{}'. Expected light, dark or auto", other),
        }
    }

    /// Collapse `Auto` using the platform's dark-mode preference.
    pub fn resolve(self, prefers_dark: bool) -> Theme {
        match self {
            Theme::Auto if prefers_dark => Theme::Dark,
            Theme::Auto => Theme::Light,
            explicit => explicit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceConfig {
    pub enable_metrics: bool,
    pub metrics_endpoint: Option<String>,
    pub debounce: Duration,
    pub retry_delay: Duration,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            enable_metrics: false,
            metrics_endpoint: None,
            debounce: timing::DEFAULT_DEBOUNCE,
            retry_delay: timing::DEFAULT_RETRY_DELAY,
        }
    }
}

/// Explicit accessibility settings. `None` defers to the detected preference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessibilityOverrides {
    pub high_contrast: Option<bool>,
    pub reduced_motion: Option<bool>,
    pub announce_actions: Option<bool>,
    pub keyboard_navigation: Option<bool>,
}

/// Independent switches for the optional feedback channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub audio: bool,
    pub haptics: bool,
    pub confetti: bool,
    pub analytics: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            audio: true,
            haptics: true,
            confetti: true,
            analytics: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Target
    pub email: String,

    // Channels
    pub features: FeatureFlags,

    // Presentation
    pub theme: Theme,
    pub locale: String,

    // Telemetry & timing
    pub performance: PerformanceConfig,

    // Accessibility
    pub accessibility: AccessibilityOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            features: FeatureFlags::default(),
            theme: Theme::Auto,
            locale: "en".to_string(),
            performance: PerformanceConfig::default(),
            accessibility: AccessibilityOverrides::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        Ok(Self {
            // Target
            email: std::env::var("CONTACT_EMAIL").unwrap_or(defaults.email),

            // Channels
            features: FeatureFlags {
                audio: env_bool("ENABLE_AUDIO")?.unwrap_or(defaults.features.audio),
                haptics: env_bool("ENABLE_HAPTICS")?.unwrap_or(defaults.features.haptics),
                confetti: env_bool("ENABLE_CONFETTI")?.unwrap_or(defaults.features.confetti),
                analytics: env_bool("ENABLE_ANALYTICS")?.unwrap_or(defaults.features.analytics),
            },

            // Presentation
            theme: match std::env::var("THEME") {
                Ok(value) => Theme::parse(&value).context("THEME is invalid")?,
                Err(_) => defaults.theme,
            },
            locale: std::env::var("LOCALE").unwrap_or(defaults.locale),

            // Telemetry & timing
            performance: PerformanceConfig {
                enable_metrics: env_bool("ENABLE_METRICS")?
                    .unwrap_or(defaults.performance.enable_metrics),
                metrics_endpoint: std::env::var("METRICS_ENDPOINT")
                    .ok()
                    .filter(|v| !v.trim().is_empty()),
                debounce: env_millis("DEBOUNCE_MS")?.unwrap_or(defaults.performance.debounce),
                retry_delay: env_millis("RETRY_DELAY_MS")?
                    .unwrap_or(defaults.performance.retry_delay),
            },

            // Accessibility
            accessibility: AccessibilityOverrides {
                high_contrast: env_bool("HIGH_CONTRAST")?,
                reduced_motion: env_bool("REDUCED_MOTION")?,
                announce_actions: env_bool("ANNOUNCE_ACTIONS")?,
                keyboard_navigation: env_bool("KEYBOARD_NAVIGATION")?,
            },
        })
    }
}

/// Parse a boolean-ish string (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    match std::env::var(name) {
        Ok(value) => parse_bool(&value)
            .map(Some)
            .with_context(|| format!("{} must be a boolean, got '{}'", name, value)),
        Err(_) => Ok(None),
    }
}

fn env_millis(name: &str) -> Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(value) => {
            let ms: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of milliseconds, got '{}'", name, value))?;
            Ok(Some(Duration::from_millis(ms)))
        }
        Err(_) => Ok(None),
    }
}
