//! In-memory platform that records every call and can be scripted to fail.
//!
//! Used by the unit and integration tests and by `--headless` runs of the
//! binary. Capability answers are cached per [`Platform`] bundle, so call
//! [`HeadlessPlatform::set_supported`] before [`HeadlessPlatform::platform`].

use futures::future::BoxFuture;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;

use super::{Collaborators, Platform};
use crate::accessibility::{PlatformPreferences, PreferenceProbe};
use crate::clipboard::{LegacyCopy, ModernClipboard, TransientSurface};
use crate::error::{Channel, CopyError};
use crate::feedback::{
    AudioBackend, AudioOutput, BurstSpec, Capability, CapabilityProbe, Celebration,
    FeedbackChannels, HapticDriver, LiveRegion, NodeId, OutputState, Politeness, ToneKind,
    TonePlan,
};
use crate::i18n::Translator;
use crate::telemetry::{AmbientContext, PerformanceRecorder, PlatformSignal, SignalSource};

/// A feedback-channel call observed by the headless platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Tone(ToneKind),
    Vibrate(Vec<u64>),
}

struct Shared {
    // Clipboard
    clipboard: Mutex<Option<String>>,
    modern_available: AtomicBool,
    modern_script: Mutex<VecDeque<Result<(), CopyError>>>,
    modern_default: Mutex<Result<(), CopyError>>,
    modern_delay: Mutex<Duration>,
    modern_calls: AtomicUsize,
    fallback_script: Mutex<VecDeque<Result<bool, CopyError>>>,
    fallback_default: Mutex<Result<bool, CopyError>>,
    surfaces_created: AtomicUsize,
    surfaces_removed: AtomicUsize,

    // Feedback
    unsupported: Mutex<HashSet<Channel>>,
    recorded: Mutex<Vec<Recorded>>,
    audio_state: Mutex<OutputState>,
    audio_opens: AtomicUsize,
    next_node: AtomicU64,
    live_nodes: Mutex<Vec<(NodeId, String, Politeness)>>,
    announced: Mutex<Vec<(String, Politeness)>>,
    bursts: AtomicUsize,
    releases: AtomicUsize,

    // Environment
    preferences: Mutex<PlatformPreferences>,
    signals: Mutex<Option<mpsc::UnboundedSender<PlatformSignal>>>,
    offers_signals: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|p| p.into_inner())
}

#[derive(Clone)]
pub struct HeadlessPlatform {
    shared: Arc<Shared>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// Every channel supported, both strategies succeed instantly.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                clipboard: Mutex::new(None),
                modern_available: AtomicBool::new(true),
                modern_script: Mutex::new(VecDeque::new()),
                modern_default: Mutex::new(Ok(())),
                modern_delay: Mutex::new(Duration::ZERO),
                modern_calls: AtomicUsize::new(0),
                fallback_script: Mutex::new(VecDeque::new()),
                fallback_default: Mutex::new(Ok(true)),
                surfaces_created: AtomicUsize::new(0),
                surfaces_removed: AtomicUsize::new(0),
                unsupported: Mutex::new(HashSet::new()),
                recorded: Mutex::new(Vec::new()),
                audio_state: Mutex::new(OutputState::Closed),
                audio_opens: AtomicUsize::new(0),
                next_node: AtomicU64::new(1),
                live_nodes: Mutex::new(Vec::new()),
                announced: Mutex::new(Vec::new()),
                bursts: AtomicUsize::new(0),
                releases: AtomicUsize::new(0),
                preferences: Mutex::new(PlatformPreferences::default()),
                signals: Mutex::new(None),
                offers_signals: AtomicBool::new(false),
            }),
        }
    }

    /// Bundle this platform as the widget's collaborators. Widgets that
    /// should share one audio output are mounted from clones of one bundle.
    pub fn platform(&self) -> Platform {
        Platform::new(Collaborators {
            modern: Arc::new(self.clone()),
            legacy: Arc::new(self.clone()),
            haptics: Arc::new(self.clone()),
            audio: Arc::new(self.clone()),
            live_region: Arc::new(self.clone()),
            celebration: Arc::new(self.clone()),
            capabilities: Arc::new(self.clone()),
            preferences: Arc::new(self.clone()),
            signals: Arc::new(self.clone()),
            ambient: AmbientContext {
                user_agent: "headless".to_string(),
                language: "en".to_string(),
                screen_width: 1920,
                screen_height: 1080,
                timezone: "UTC".to_string(),
            },
        })
    }

    /// Channels wired to this platform with metrics disabled.
    pub fn feedback_channels(&self, translator: Translator) -> FeedbackChannels {
        FeedbackChannels::from_platform(&self.platform(), translator, PerformanceRecorder::disabled())
    }

    // ---- scripting ----

    pub fn set_modern_available(&self, available: bool) {
        self.shared.modern_available.store(available, Ordering::SeqCst);
    }

    /// Make every modern write fail with `message` (classified).
    pub fn fail_modern(&self, message: &str) {
        *lock(&self.shared.modern_default) = Err(CopyError::classify(message));
    }

    /// Results consumed by the next modern writes, before the default.
    pub fn script_modern(&self, results: impl IntoIterator<Item = Result<(), CopyError>>) {
        lock(&self.shared.modern_script).extend(results);
    }

    pub fn set_modern_delay(&self, delay: Duration) {
        *lock(&self.shared.modern_delay) = delay;
    }

    /// Make every fallback copy fail. `Ok(false)` models a silent decline.
    pub fn fail_fallback(&self, result: Result<bool, CopyError>) {
        *lock(&self.shared.fallback_default) = result;
    }

    pub fn script_fallback(&self, results: impl IntoIterator<Item = Result<bool, CopyError>>) {
        lock(&self.shared.fallback_script).extend(results);
    }

    pub fn set_supported(&self, channel: Channel, supported: bool) {
        let mut unsupported = lock(&self.shared.unsupported);
        if supported {
            unsupported.remove(&channel);
        } else {
            unsupported.insert(channel);
        }
    }

    pub fn set_preferences(&self, preferences: PlatformPreferences) {
        *lock(&self.shared.preferences) = preferences;
    }

    /// Offer a long-task/layout-shift stream to the next subscriber.
    pub fn offer_signals(&self) {
        self.shared.offers_signals.store(true, Ordering::SeqCst);
    }

    /// Push a signal to the current subscriber. Returns false if none.
    pub fn emit_signal(&self, signal: PlatformSignal) -> bool {
        match lock(&self.shared.signals).as_ref() {
            Some(sender) => sender.send(signal).is_ok(),
            None => false,
        }
    }

    /// Simulate the platform suspending the audio output.
    pub fn suspend_audio(&self) {
        let mut state = lock(&self.shared.audio_state);
        if *state == OutputState::Running {
            *state = OutputState::Suspended;
        }
    }

    // ---- observation ----

    pub fn clipboard(&self) -> Option<String> {
        lock(&self.shared.clipboard).clone()
    }

    pub fn modern_calls(&self) -> usize {
        self.shared.modern_calls.load(Ordering::SeqCst)
    }

    pub fn surfaces_created(&self) -> usize {
        self.shared.surfaces_created.load(Ordering::SeqCst)
    }

    /// Fallback surfaces still mounted.
    pub fn live_surfaces(&self) -> usize {
        self.surfaces_created() - self.shared.surfaces_removed.load(Ordering::SeqCst)
    }

    /// Clipboard calls of either strategy.
    pub fn clipboard_calls(&self) -> usize {
        self.modern_calls() + self.surfaces_created()
    }

    /// Tone and vibration requests, in order.
    pub fn recorded(&self) -> Vec<Recorded> {
        lock(&self.shared.recorded).clone()
    }

    /// Announcement nodes currently in the live region.
    pub fn announcements(&self) -> Vec<(String, Politeness)> {
        lock(&self.shared.live_nodes)
            .iter()
            .map(|(_, message, politeness)| (message.clone(), *politeness))
            .collect()
    }

    /// Every announcement ever made, including removed ones.
    pub fn announced(&self) -> Vec<(String, Politeness)> {
        lock(&self.shared.announced).clone()
    }

    pub fn bursts(&self) -> usize {
        self.shared.bursts.load(Ordering::SeqCst)
    }

    pub fn celebration_releases(&self) -> usize {
        self.shared.releases.load(Ordering::SeqCst)
    }

    pub fn audio_state(&self) -> OutputState {
        *lock(&self.shared.audio_state)
    }

    pub fn audio_opens(&self) -> usize {
        self.shared.audio_opens.load(Ordering::SeqCst)
    }
}

impl ModernClipboard for HeadlessPlatform {
    fn is_available(&self) -> bool {
        self.shared.modern_available.load(Ordering::SeqCst)
    }

    fn write_text(&self, text: &str) -> BoxFuture<'static, Result<(), CopyError>> {
        self.shared.modern_calls.fetch_add(1, Ordering::SeqCst);
        let result = lock(&self.shared.modern_script)
            .pop_front()
            .unwrap_or_else(|| lock(&self.shared.modern_default).clone());
        let delay = *lock(&self.shared.modern_delay);
        let shared = self.shared.clone();
        let text = text.to_string();

        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if result.is_ok() {
                *lock(&shared.clipboard) = Some(text);
            }
            result
        })
    }
}

struct HeadlessSurface {
    shared: Arc<Shared>,
    text: String,
    result: Result<bool, CopyError>,
    removed: bool,
}

impl TransientSurface for HeadlessSurface {
    fn select_all(&mut self) -> Result<(), CopyError> {
        Ok(())
    }

    fn exec_copy(&mut self) -> Result<bool, CopyError> {
        if let Ok(true) = self.result {
            *lock(&self.shared.clipboard) = Some(self.text.clone());
        }
        self.result.clone()
    }

    fn remove(&mut self) {
        if !self.removed {
            self.removed = true;
            self.shared.surfaces_removed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl LegacyCopy for HeadlessPlatform {
    fn create_surface(&self, text: &str) -> Result<Box<dyn TransientSurface>, CopyError> {
        self.shared.surfaces_created.fetch_add(1, Ordering::SeqCst);
        let result = lock(&self.shared.fallback_script)
            .pop_front()
            .unwrap_or_else(|| lock(&self.shared.fallback_default).clone());
        Ok(Box::new(HeadlessSurface {
            shared: self.shared.clone(),
            text: text.to_string(),
            result,
            removed: false,
        }))
    }
}

impl CapabilityProbe for HeadlessPlatform {
    fn probe(&self, channel: Channel) -> Capability {
        if lock(&self.shared.unsupported).contains(&channel) {
            Capability::Unsupported
        } else {
            Capability::Supported
        }
    }
}

impl HapticDriver for HeadlessPlatform {
    fn vibrate(&self, pattern: &[u64]) -> Result<(), CopyError> {
        lock(&self.shared.recorded).push(Recorded::Vibrate(pattern.to_vec()));
        Ok(())
    }
}

impl AudioBackend for HeadlessPlatform {
    fn open(&self) -> Result<Arc<dyn AudioOutput>, CopyError> {
        self.shared.audio_opens.fetch_add(1, Ordering::SeqCst);
        *lock(&self.shared.audio_state) = OutputState::Running;
        Ok(Arc::new(self.clone()))
    }
}

impl AudioOutput for HeadlessPlatform {
    fn state(&self) -> OutputState {
        *lock(&self.shared.audio_state)
    }

    fn resume(&self) -> Result<(), CopyError> {
        *lock(&self.shared.audio_state) = OutputState::Running;
        Ok(())
    }

    fn play(&self, plan: &TonePlan) -> Result<(), CopyError> {
        lock(&self.shared.recorded).push(Recorded::Tone(plan.kind));
        Ok(())
    }

    fn close(&self) {
        *lock(&self.shared.audio_state) = OutputState::Closed;
    }
}

impl LiveRegion for HeadlessPlatform {
    fn insert(&self, message: &str, politeness: Politeness) -> Result<NodeId, CopyError> {
        let id = self.shared.next_node.fetch_add(1, Ordering::SeqCst);
        lock(&self.shared.live_nodes).push((id, message.to_string(), politeness));
        lock(&self.shared.announced).push((message.to_string(), politeness));
        Ok(id)
    }

    fn remove(&self, id: NodeId) {
        lock(&self.shared.live_nodes).retain(|(node, _, _)| *node != id);
    }
}

impl Celebration for HeadlessPlatform {
    fn burst(&self, _spec: &BurstSpec) -> Result<(), CopyError> {
        self.shared.bursts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self) {
        self.shared.releases.fetch_add(1, Ordering::SeqCst);
    }
}

impl PreferenceProbe for HeadlessPlatform {
    fn detect(&self) -> PlatformPreferences {
        *lock(&self.shared.preferences)
    }
}

impl SignalSource for HeadlessPlatform {
    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<PlatformSignal>> {
        if !self.shared.offers_signals.load(Ordering::SeqCst) {
            return None;
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        *lock(&self.shared.signals) = Some(sender);
        Some(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{attempt_copy, CopyMethod};

    #[tokio::test]
    async fn test_default_platform_copies_with_modern() {
        let headless = HeadlessPlatform::new();
        let platform = headless.platform();
        let method = attempt_copy(platform.modern, platform.legacy, "a@b.co".into())
            .await
            .unwrap();

        assert_eq!(method, CopyMethod::Modern);
        assert_eq!(headless.clipboard().as_deref(), Some("a@b.co"));
        assert_eq!(headless.surfaces_created(), 0);
    }

    #[tokio::test]
    async fn test_scripted_failures_are_consumed_in_order() {
        let headless = HeadlessPlatform::new();
        headless.script_modern([Err(CopyError::classify("NotAllowedError"))]);
        let platform = headless.platform();

        let first = attempt_copy(platform.modern.clone(), platform.legacy.clone(), "a@b.co".into())
            .await
            .unwrap();
        let second = attempt_copy(platform.modern, platform.legacy, "a@b.co".into())
            .await
            .unwrap();

        assert_eq!(first, CopyMethod::Fallback);
        assert_eq!(second, CopyMethod::Modern);
        assert_eq!(headless.live_surfaces(), 0);
    }

    #[test]
    fn test_signals_only_when_offered() {
        let headless = HeadlessPlatform::new();
        assert!(headless.subscribe().is_none());
        assert!(!headless.emit_signal(PlatformSignal::LongTask { duration_ms: 1.0 }));

        headless.offer_signals();
        let mut receiver = headless.subscribe().unwrap();
        assert!(headless.emit_signal(PlatformSignal::LongTask { duration_ms: 1.0 }));
        assert!(receiver.try_recv().is_ok());
    }
}
