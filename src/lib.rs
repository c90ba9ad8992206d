//! Copy-email widget engine.
//!
//! A clipboard state machine with validation, fallback and bounded retry,
//! plus the feedback it triggers: toasts, tones, haptics, screen-reader
//! announcements, a celebration burst and optional telemetry.

pub mod accessibility;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod feedback;
pub mod i18n;
pub mod platform;
pub mod retry;
pub mod telemetry;
pub mod toast;
pub mod widget;

pub use config::Config;
pub use error::CopyError;
pub use widget::{CopyWidget, Key};
