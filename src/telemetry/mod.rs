pub mod analytics;
pub mod performance;
pub mod sink;

pub use analytics::{AmbientContext, AnalyticsEvent, AnalyticsRecorder, Primitive, Properties};
pub use performance::{metric, PerformanceRecorder, PerformanceSnapshot, PlatformSignal, SignalSource};
pub use sink::HttpSink;
