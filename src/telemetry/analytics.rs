//! Analytics event log with ambient enrichment.

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::sink::HttpSink;

/// Property value carried by an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Primitive::Int(value)
    }
}

impl From<u32> for Primitive {
    fn from(value: u32) -> Self {
        Primitive::Int(value as i64)
    }
}

impl From<u64> for Primitive {
    fn from(value: u64) -> Self {
        Primitive::Int(value as i64)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Float(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::Text(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::Text(value)
    }
}

pub type Properties = BTreeMap<String, Primitive>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub event: String,
    pub properties: Properties,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Environment facts merged into every event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientContext {
    pub user_agent: String,
    pub language: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub timezone: String,
}

impl Default for AmbientContext {
    fn default() -> Self {
        Self {
            user_agent: format!("contact-clipboard/{}", env!("CARGO_PKG_VERSION")),
            language: "en".to_string(),
            screen_width: 0,
            screen_height: 0,
            timezone: "UTC".to_string(),
        }
    }
}

impl AmbientContext {
    fn enrich(&self, properties: &mut Properties, now: chrono::DateTime<Utc>) {
        properties.insert("timestamp".into(), now.to_rfc3339().into());
        properties.insert("userAgent".into(), self.user_agent.clone().into());
        properties.insert("language".into(), self.language.clone().into());
        properties.insert(
            "screen".into(),
            format!("{}x{}", self.screen_width, self.screen_height).into(),
        );
        properties.insert("timezone".into(), self.timezone.clone().into());
    }
}

/// Cloneable handle to a shared, append-only event log.
#[derive(Clone)]
pub struct AnalyticsRecorder {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
    enabled: Arc<AtomicBool>,
    ambient: AmbientContext,
    sink: Option<HttpSink>,
}

impl AnalyticsRecorder {
    pub fn new(enabled: bool, ambient: AmbientContext, sink: Option<HttpSink>) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            enabled: Arc::new(AtomicBool::new(enabled)),
            ambient,
            sink,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Record `name` with enriched properties and forward it if an endpoint
    /// is configured. Returns the stored event, or `None` while disabled.
    pub fn track(&self, name: &str, mut properties: Properties) -> Option<AnalyticsEvent> {
        if !self.is_enabled() {
            return None;
        }

        let now = Utc::now();
        self.ambient.enrich(&mut properties, now);
        let event = AnalyticsEvent {
            event: name.to_string(),
            properties,
            timestamp: now.timestamp_millis(),
        };
        debug!("Analytics event: {}", name);

        self.events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(event.clone());

        if let Some(sink) = &self.sink {
            sink.send(&event);
        }
        Some(event)
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }
}
