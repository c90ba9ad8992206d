//! Short synthesized tones over a shared, lazily opened audio output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::capability::CapabilityCache;
use crate::error::{Channel, CopyError};
use crate::telemetry::{metric, PerformanceRecorder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneKind {
    Success,
    Error,
    Info,
}

/// One oscillator note. Times are seconds from the start of the plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSegment {
    pub start: f32,
    pub duration: f32,
    pub freq_start: f32,
    pub freq_end: f32,
    pub gain_start: f32,
    pub gain_end: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TonePlan {
    pub kind: ToneKind,
    pub segments: Vec<ToneSegment>,
}

impl TonePlan {
    pub fn total_duration(&self) -> f32 {
        self.segments
            .iter()
            .map(|s| s.start + s.duration)
            .fold(0.0, f32::max)
    }
}

impl ToneKind {
    pub fn plan(self) -> TonePlan {
        let segments = match self {
            // Ascending C5, E5, G5
            ToneKind::Success => [523.25, 659.25, 783.99]
                .iter()
                .enumerate()
                .map(|(i, &freq)| ToneSegment {
                    start: i as f32 * 0.1,
                    duration: 0.1,
                    freq_start: freq,
                    freq_end: freq,
                    gain_start: 0.08,
                    gain_end: 0.01,
                })
                .collect(),
            // Descending sweep in two steps
            ToneKind::Error => vec![
                ToneSegment {
                    start: 0.0,
                    duration: 0.075,
                    freq_start: 400.0,
                    freq_end: 300.0,
                    gain_start: 0.1,
                    gain_end: 0.05,
                },
                ToneSegment {
                    start: 0.075,
                    duration: 0.075,
                    freq_start: 300.0,
                    freq_end: 200.0,
                    gain_start: 0.05,
                    gain_end: 0.01,
                },
            ],
            ToneKind::Info => vec![ToneSegment {
                start: 0.0,
                duration: 0.1,
                freq_start: 880.0,
                freq_end: 880.0,
                gain_start: 0.1,
                gain_end: 0.01,
            }],
        };
        TonePlan {
            kind: self,
            segments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    Running,
    Suspended,
    Closed,
}

/// An opened audio output (the audio-context equivalent).
pub trait AudioOutput: Send + Sync {
    fn state(&self) -> OutputState;
    fn resume(&self) -> Result<(), CopyError>;
    fn play(&self, plan: &TonePlan) -> Result<(), CopyError>;
    fn close(&self);
}

pub trait AudioBackend: Send + Sync {
    fn open(&self) -> Result<Arc<dyn AudioOutput>, CopyError>;
}

/// Process-wide handle around one lazily opened output.
///
/// One handle is shared by every widget mounted from the same
/// [`Platform`](crate::platform::Platform). The output is opened on first
/// play, resumed if the platform suspended it, reopened if it was closed
/// underneath us, and only torn down by [`AudioHandle::shutdown`] at
/// process teardown.
pub struct AudioHandle {
    backend: Arc<dyn AudioBackend>,
    capabilities: CapabilityCache,
    output: Mutex<Option<Arc<dyn AudioOutput>>>,
    enabled: AtomicBool,
}

impl AudioHandle {
    pub fn new(backend: Arc<dyn AudioBackend>, capabilities: CapabilityCache) -> Arc<Self> {
        Arc::new(Self {
            backend,
            capabilities,
            output: Mutex::new(None),
            enabled: AtomicBool::new(true),
        })
    }

    pub fn is_supported(&self) -> bool {
        self.capabilities.is_supported(Channel::Audio)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_open(&self) -> bool {
        self.output
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }

    /// The open output, opening one if needed. The open time is recorded
    /// on `performance`, the recorder of the widget that asked first.
    fn ensure_output(
        &self,
        performance: &PerformanceRecorder,
    ) -> Result<Arc<dyn AudioOutput>, CopyError> {
        let mut slot = self.output.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(output) = slot.as_ref() {
            if output.state() != OutputState::Closed {
                return Ok(output.clone());
            }
            debug!("Audio output was closed, reopening");
        }

        let started = Instant::now();
        let output = self.backend.open()?;
        let elapsed = started.elapsed().as_secs_f64() * 1000.0;
        performance.record_metric(metric::AUDIO_INIT, elapsed);
        info!("Audio output initialized in {:.2}ms", elapsed);

        *slot = Some(output.clone());
        Ok(output)
    }

    pub fn play(&self, kind: ToneKind, performance: &PerformanceRecorder) -> Result<(), CopyError> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.capabilities.require(Channel::Audio)?;

        let output = self.ensure_output(performance)?;
        if output.state() == OutputState::Suspended {
            output.resume()?;
        }
        output.play(&kind.plan())
    }

    /// Close the output. A later `play` opens a fresh one.
    pub fn shutdown(&self) {
        if let Some(output) = self
            .output
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
        {
            output.close();
            debug!("Audio output closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::capability::{Capability, CapabilityProbe};
    use std::sync::atomic::AtomicUsize;

    struct Probe(Capability);

    impl CapabilityProbe for Probe {
        fn probe(&self, _channel: Channel) -> Capability {
            self.0
        }
    }

    struct FakeOutput {
        state: Mutex<OutputState>,
        played: Mutex<Vec<ToneKind>>,
        resumes: AtomicUsize,
    }

    impl AudioOutput for FakeOutput {
        fn state(&self) -> OutputState {
            *self.state.lock().unwrap()
        }

        fn resume(&self) -> Result<(), CopyError> {
            self.resumes.fetch_add(1, Ordering::SeqCst);
            *self.state.lock().unwrap() = OutputState::Running;
            Ok(())
        }

        fn play(&self, plan: &TonePlan) -> Result<(), CopyError> {
            self.played.lock().unwrap().push(plan.kind);
            Ok(())
        }

        fn close(&self) {
            *self.state.lock().unwrap() = OutputState::Closed;
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        opens: AtomicUsize,
        last: Mutex<Option<Arc<FakeOutput>>>,
        initial: Option<OutputState>,
    }

    impl AudioBackend for FakeBackend {
        fn open(&self) -> Result<Arc<dyn AudioOutput>, CopyError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            let output = Arc::new(FakeOutput {
                state: Mutex::new(self.initial.unwrap_or(OutputState::Running)),
                played: Mutex::new(Vec::new()),
                resumes: AtomicUsize::new(0),
            });
            *self.last.lock().unwrap() = Some(output.clone());
            Ok(output)
        }
    }

    fn handle(backend: Arc<FakeBackend>, capability: Capability) -> Arc<AudioHandle> {
        AudioHandle::new(backend, CapabilityCache::new(Arc::new(Probe(capability))))
    }

    fn quiet() -> PerformanceRecorder {
        PerformanceRecorder::disabled()
    }

    #[test]
    fn test_success_plan_is_ascending_triad() {
        let plan = ToneKind::Success.plan();
        let freqs: Vec<_> = plan.segments.iter().map(|s| s.freq_start).collect();
        assert_eq!(freqs, vec![523.25, 659.25, 783.99]);
        assert!((plan.total_duration() - 0.3).abs() < 1e-6);
        assert!(plan.segments.iter().all(|s| s.gain_start == 0.08));
    }

    #[test]
    fn test_error_plan_descends() {
        let plan = ToneKind::Error.plan();
        assert_eq!(plan.segments.first().unwrap().freq_start, 400.0);
        assert_eq!(plan.segments.last().unwrap().freq_end, 200.0);
        assert!((plan.total_duration() - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_output_opened_once_and_reused() {
        let backend = Arc::new(FakeBackend::default());
        let audio = handle(backend.clone(), Capability::Supported);
        assert!(!audio.is_open());

        let first = PerformanceRecorder::new(true, "ua", None);
        let second = PerformanceRecorder::new(true, "ua", None);
        audio.play(ToneKind::Success, &first).unwrap();
        audio.play(ToneKind::Error, &second).unwrap();

        assert_eq!(backend.opens.load(Ordering::SeqCst), 1);
        let output = backend.last.lock().unwrap().clone().unwrap();
        assert_eq!(*output.played.lock().unwrap(), vec![ToneKind::Success, ToneKind::Error]);
        assert!(first.latest(metric::AUDIO_INIT).is_some());
        assert!(second.latest(metric::AUDIO_INIT).is_none());
    }

    #[test]
    fn test_suspended_output_is_resumed() {
        let backend = Arc::new(FakeBackend {
            initial: Some(OutputState::Suspended),
            ..Default::default()
        });
        let audio = handle(backend.clone(), Capability::Supported);
        audio.play(ToneKind::Info, &quiet()).unwrap();

        let output = backend.last.lock().unwrap().clone().unwrap();
        assert_eq!(output.resumes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_closed_output_is_reopened() {
        let backend = Arc::new(FakeBackend::default());
        let audio = handle(backend.clone(), Capability::Supported);
        audio.play(ToneKind::Info, &quiet()).unwrap();
        backend.last.lock().unwrap().as_ref().unwrap().close();

        audio.play(ToneKind::Info, &quiet()).unwrap();
        assert_eq!(backend.opens.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disabled_or_unsupported() {
        let backend = Arc::new(FakeBackend::default());
        let audio = handle(backend.clone(), Capability::Supported);
        audio.set_enabled(false);
        audio.play(ToneKind::Success, &quiet()).unwrap();
        assert_eq!(backend.opens.load(Ordering::SeqCst), 0);

        let audio = handle(backend.clone(), Capability::Unsupported);
        assert_eq!(
            audio.play(ToneKind::Success, &quiet()),
            Err(CopyError::ChannelUnavailable(Channel::Audio))
        );
        assert_eq!(backend.opens.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_shutdown_closes_output() {
        let backend = Arc::new(FakeBackend::default());
        let audio = handle(backend.clone(), Capability::Supported);
        audio.play(ToneKind::Success, &quiet()).unwrap();
        audio.shutdown();

        assert!(!audio.is_open());
        let output = backend.last.lock().unwrap().clone().unwrap();
        assert_eq!(output.state(), OutputState::Closed);
    }
}
