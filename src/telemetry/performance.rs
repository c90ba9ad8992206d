//! Named numeric metrics plus opportunistic platform signal observation.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::sink::HttpSink;

pub mod metric {
    pub const COMPONENT_RENDER: &str = "componentRender";
    pub const CLIPBOARD_OPERATION: &str = "clipboardOperation";
    pub const COPY_SUCCESS: &str = "copySuccess";
    pub const AUDIO_INIT: &str = "audioInit";
    pub const ANIMATION_FRAME: &str = "animationFrame";
    pub const MEMORY_USAGE: &str = "memoryUsage";
    pub const LONG_TASK: &str = "longTask";
    pub const LAYOUT_SHIFT: &str = "layoutShift";
}

/// Signals some platforms can stream; absent elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformSignal {
    LongTask { duration_ms: f64 },
    LayoutShift { value: f64 },
}

/// Where [`PlatformSignal`]s come from, if anywhere.
pub trait SignalSource: Send + Sync {
    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<PlatformSignal>> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub component_render_time: f64,
    pub clipboard_operation_time: f64,
    pub audio_init_time: f64,
    pub animation_frame_time: f64,
    pub memory_usage: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricPayload<'a> {
    metric: &'a str,
    value: f64,
    timestamp: i64,
    user_agent: &'a str,
}

struct Inner {
    enabled: bool,
    user_agent: String,
    sink: Option<HttpSink>,
    metrics: Mutex<HashMap<String, f64>>,
    observer: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Clone)]
pub struct PerformanceRecorder {
    inner: Arc<Inner>,
}

impl PerformanceRecorder {
    pub fn new(enabled: bool, user_agent: impl Into<String>, sink: Option<HttpSink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                enabled,
                user_agent: user_agent.into(),
                sink,
                metrics: Mutex::new(HashMap::new()),
                observer: Mutex::new(None),
            }),
        }
    }

    /// Recorder that accepts nothing.
    pub fn disabled() -> Self {
        Self::new(false, String::new(), None)
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled
    }

    /// Keep the latest `value` for `name` and forward it when an endpoint
    /// is configured.
    pub fn record_metric(&self, name: &str, value: f64) {
        if !self.inner.enabled {
            return;
        }
        debug!("Metric {} = {:.2}", name, value);
        self.inner
            .metrics
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(name.to_string(), value);

        if let Some(sink) = &self.inner.sink {
            sink.send(&MetricPayload {
                metric: name,
                value,
                timestamp: Utc::now().timestamp_millis(),
                user_agent: &self.inner.user_agent,
            });
        }
    }

    pub fn latest(&self, name: &str) -> Option<f64> {
        self.inner
            .metrics
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(name)
            .copied()
    }

    pub fn snapshot(&self) -> PerformanceSnapshot {
        let metrics = self.inner.metrics.lock().unwrap_or_else(|p| p.into_inner());
        let get = |name: &str| metrics.get(name).copied().unwrap_or(0.0);
        PerformanceSnapshot {
            component_render_time: get(metric::COMPONENT_RENDER),
            clipboard_operation_time: get(metric::CLIPBOARD_OPERATION),
            audio_init_time: get(metric::AUDIO_INIT),
            animation_frame_time: get(metric::ANIMATION_FRAME),
            memory_usage: get(metric::MEMORY_USAGE),
        }
    }

    /// Start recording long-task and layout-shift signals if the platform
    /// supplies them. Layout shift accumulates; long tasks keep the latest.
    pub fn observe(&self, signals: Option<mpsc::UnboundedReceiver<PlatformSignal>>) {
        if !self.inner.enabled {
            return;
        }
        let Some(mut signals) = signals else {
            debug!("Platform offers no long-task/layout-shift signals");
            return;
        };

        let recorder = self.clone();
        let task = tokio::spawn(async move {
            let mut cumulative_shift = 0.0;
            while let Some(signal) = signals.recv().await {
                match signal {
                    PlatformSignal::LongTask { duration_ms } => {
                        recorder.record_metric(metric::LONG_TASK, duration_ms)
                    }
                    PlatformSignal::LayoutShift { value } => {
                        cumulative_shift += value;
                        recorder.record_metric(metric::LAYOUT_SHIFT, cumulative_shift)
                    }
                }
            }
        });

        let previous = self
            .inner
            .observer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stop observing platform signals.
    pub fn cleanup(&self) {
        if let Some(task) = self
            .inner
            .observer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
        {
            task.abort();
        }
    }
}
