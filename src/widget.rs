//! The copy-email widget: a handle plus a single event loop task.
//!
//! Every input (user triggers, timer deadlines, strategy results) is
//! serialized through one `tokio::select!` loop that feeds the pure
//! [`ClipboardMachine`] and carries out the effects it returns. The handle
//! only sends commands and reads published snapshots.

use chrono::Utc;
use futures::future::{BoxFuture, OptionFuture};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::accessibility::{AccessibilityConfig, AccessibilityContext};
use crate::clipboard::{
    attempt_copy, ClipboardMachine, ClipboardState, CopyMethod, CopyOutcome, Effect, Event,
    LegacyCopy, ModernClipboard, Phase,
};
use crate::config::{timing, Config, Theme};
use crate::error::CopyError;
use crate::feedback::{FeedbackChannels, FeedbackOrchestrator};
use crate::i18n::{MessageKey, Translator};
use crate::platform::Platform;
use crate::retry::RetryPolicy;
use crate::telemetry::{metric, AnalyticsRecorder, HttpSink, PerformanceRecorder, Properties};
use crate::toast::{ToastEntry, ToastId, ToastQueue};

/// Keys the control reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Tab,
    Char(char),
}

/// Context handed to the success/error callbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsMetadata {
    /// Unix milliseconds.
    pub timestamp: i64,
    pub user_agent: String,
    pub method: Option<CopyMethod>,
    pub retry_count: u32,
    /// Milliseconds from trigger to settle.
    pub duration: u64,
    pub preferred_language: String,
}

pub type SuccessCallback = Arc<dyn Fn(&str, &AnalyticsMetadata) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&CopyError, &str, &AnalyticsMetadata) + Send + Sync>;

#[derive(Clone, Default)]
pub struct CopyCallbacks {
    pub on_copy_success: Option<SuccessCallback>,
    pub on_copy_error: Option<ErrorCallback>,
}

/// What the widget publishes after every processed input.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSnapshot {
    pub state: ClipboardState,
    pub label: String,
    /// Number of attempts settled since mount.
    pub settled: u64,
    pub last_outcome: Option<CopyOutcome>,
}

enum Command {
    Copy,
    Acknowledge,
    Shutdown(oneshot::Sender<()>),
}

pub struct CopyWidget {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<WidgetSnapshot>,
    task: JoinHandle<()>,
    orchestrator: Arc<FeedbackOrchestrator>,
    analytics: AnalyticsRecorder,
    performance: PerformanceRecorder,
    accessibility: AccessibilityContext,
    translator: Translator,
    theme: Theme,
    email: String,
}

impl CopyWidget {
    pub fn mount(config: &Config, platform: Platform) -> Self {
        Self::mount_with_callbacks(config, platform, CopyCallbacks::default())
    }

    /// Build every component from `config` and start the event loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount_with_callbacks(config: &Config, platform: Platform, callbacks: CopyCallbacks) -> Self {
        let mount_started = std::time::Instant::now();
        let translator = Translator::new(&config.locale);
        let preferences = platform.preferences.detect();
        let accessibility: AccessibilityContext =
            Arc::new(AccessibilityConfig::derive(&config.accessibility, preferences));
        let theme = config.theme.resolve(preferences.prefers_dark);

        let sink = config.performance.metrics_endpoint.as_deref().map(HttpSink::new);
        let analytics = AnalyticsRecorder::new(
            config.features.analytics,
            platform.ambient.clone(),
            sink.clone(),
        );
        let performance = PerformanceRecorder::new(
            config.performance.enable_metrics,
            platform.ambient.user_agent.clone(),
            sink,
        );
        performance.observe(platform.signals.subscribe());

        let orchestrator = Arc::new(FeedbackOrchestrator::new(
            FeedbackChannels::from_platform(&platform, translator, performance.clone()),
            config.features,
            accessibility.clone(),
            translator,
        ));

        let retry_delay = config.performance.retry_delay;
        let policy = RetryPolicy::new(timing::MAX_RETRIES, retry_delay);
        let machine = ClipboardMachine::new(config.email.clone(), translator, policy);

        let initial = WidgetSnapshot {
            state: machine.state().clone(),
            label: label_for(&translator, machine.state(), machine.policy()),
            settled: 0,
            last_outcome: None,
        };
        let (snapshot_tx, snapshots) = watch::channel(initial);
        let (commands, command_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            machine,
            modern: platform.modern.clone(),
            legacy: platform.legacy.clone(),
            orchestrator: orchestrator.clone(),
            analytics: analytics.clone(),
            performance: performance.clone(),
            callbacks,
            translator,
            user_agent: platform.ambient.user_agent.clone(),
            debounce: config.performance.debounce,
            snapshots: snapshot_tx,
            settled: 0,
            last_outcome: None,
        };
        let task = tokio::spawn(driver.run(command_rx));

        performance.record_metric(
            metric::COMPONENT_RENDER,
            mount_started.elapsed().as_secs_f64() * 1000.0,
        );
        info!(
            "Copy widget mounted for {} (locale {}, theme {:?})",
            config.email,
            translator.locale().code(),
            theme
        );

        Self {
            commands,
            snapshots,
            task,
            orchestrator,
            analytics,
            performance,
            accessibility,
            translator,
            theme,
            email: config.email.clone(),
        }
    }

    /// Request a copy. Rapid calls are debounced into one trigger.
    pub fn copy(&self) {
        if self.commands.send(Command::Copy).is_err() {
            debug!("Copy requested after unmount, ignoring");
        }
    }

    /// Pointer activation; always accepted.
    pub fn click(&self) {
        self.copy();
    }

    /// Keyboard activation. Enter and Space trigger a copy when keyboard
    /// navigation is enabled. Returns whether the key was handled.
    pub fn press(&self, key: Key) -> bool {
        match key {
            Key::Enter | Key::Space if self.accessibility.keyboard_navigation => {
                self.copy();
                true
            }
            _ => false,
        }
    }

    /// Mark a settled result as consumed by the UI.
    pub fn acknowledge(&self) {
        let _ = self.commands.send(Command::Acknowledge);
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetSnapshot> {
        self.snapshots.clone()
    }

    pub fn state(&self) -> ClipboardState {
        self.snapshots.borrow().state.clone()
    }

    /// Localized control label for the current phase.
    pub fn label(&self) -> String {
        self.snapshots.borrow().label.clone()
    }

    /// Accessible name of the control.
    pub fn aria_label(&self) -> String {
        self.translator.translate(MessageKey::CopyEmailClipboard, &[])
    }

    /// Wait until at least `count` attempts have settled since mount and
    /// return the latest outcome. `None` if the widget stopped first.
    pub async fn wait_settled(&self, count: u64) -> Option<CopyOutcome> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots.wait_for(|s| s.settled >= count).await.ok()?;
        snapshot.last_outcome.clone()
    }

    pub fn toasts(&self) -> Vec<ToastEntry> {
        self.orchestrator.toasts().entries()
    }

    pub fn toast_queue(&self) -> &ToastQueue {
        self.orchestrator.toasts()
    }

    pub fn dismiss_toast(&self, id: ToastId) {
        self.orchestrator.toasts().dismiss(id);
    }

    pub fn analytics(&self) -> &AnalyticsRecorder {
        &self.analytics
    }

    pub fn performance(&self) -> &PerformanceRecorder {
        &self.performance
    }

    pub fn accessibility(&self) -> &AccessibilityConfig {
        &self.accessibility
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Stop the event loop, cancel every pending timer and release the
    /// feedback channels.
    pub async fn unmount(self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.commands.send(Command::Shutdown(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
        if let Err(e) = self.task.await {
            warn!("Widget task ended abnormally: {}", e);
        }
        info!("Copy widget unmounted");
    }
}

fn label_for(translator: &Translator, state: &ClipboardState, policy: &RetryPolicy) -> String {
    match state.phase {
        Phase::Validating | Phase::Copying => translator.translate(MessageKey::Copying, &[]),
        Phase::Retrying => translator.translate(
            MessageKey::Retrying,
            &[("current", &state.retry_count), ("max", &policy.max_retries)],
        ),
        Phase::Succeeded => translator.translate(MessageKey::Copied, &[]),
        Phase::Idle | Phase::Failed => translator.translate(MessageKey::Copy, &[]),
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

type AttemptFuture = BoxFuture<'static, Result<CopyMethod, CopyError>>;

struct Driver {
    machine: ClipboardMachine,
    modern: Arc<dyn ModernClipboard>,
    legacy: Arc<dyn LegacyCopy>,
    orchestrator: Arc<FeedbackOrchestrator>,
    analytics: AnalyticsRecorder,
    performance: PerformanceRecorder,
    callbacks: CopyCallbacks,
    translator: Translator,
    user_agent: String,
    debounce: Duration,
    snapshots: watch::Sender<WidgetSnapshot>,
    settled: u64,
    last_outcome: Option<CopyOutcome>,
}

/// Timer deadlines and the in-flight attempt owned by the loop.
#[derive(Default)]
struct Pending {
    debounce_at: Option<Instant>,
    retry_at: Option<Instant>,
    reset_at: Option<Instant>,
    attempt: Option<AttemptFuture>,
}

impl Driver {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut pending = Pending::default();

        loop {
            let event = tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Copy) => {
                        pending.debounce_at = Some(Instant::now() + self.debounce);
                        continue;
                    }
                    Some(Command::Acknowledge) => Event::Acknowledge,
                    Some(Command::Shutdown(done)) => {
                        self.shutdown(&mut pending);
                        let _ = done.send(());
                        break;
                    }
                    None => {
                        self.shutdown(&mut pending);
                        break;
                    }
                },
                _ = sleep_until(pending.debounce_at) => {
                    pending.debounce_at = None;
                    Event::Trigger
                }
                _ = sleep_until(pending.retry_at) => {
                    pending.retry_at = None;
                    Event::RetryElapsed
                }
                _ = sleep_until(pending.reset_at) => {
                    pending.reset_at = None;
                    Event::ResetElapsed
                }
                Some(result) = OptionFuture::from(pending.attempt.as_mut()) => {
                    pending.attempt = None;
                    match result {
                        Ok(method) => Event::StrategySucceeded(method),
                        Err(error) => Event::StrategyFailed(error),
                    }
                }
            };

            self.apply(event, &mut pending);
        }
    }

    fn apply(&mut self, event: Event, pending: &mut Pending) {
        let now = Instant::now();
        for effect in self.machine.handle(event, now) {
            match effect {
                Effect::RunAttempt { text, retry } => {
                    debug!("Running copy attempt (retry {})", retry);
                    pending.attempt = Some(Box::pin(attempt_copy(
                        self.modern.clone(),
                        self.legacy.clone(),
                        text,
                    )));
                }
                Effect::ScheduleRetry { retry, delay } => {
                    pending.retry_at = Some(now + delay);
                    self.orchestrator.on_retry(retry);
                }
                Effect::ScheduleReset(delay) => {
                    pending.reset_at = Some(now + delay);
                }
                Effect::Settled(outcome) => self.settle(outcome),
            }
        }
        self.publish();
    }

    fn settle(&mut self, outcome: CopyOutcome) {
        self.orchestrator.dispatch(&outcome);

        let email = self.machine.target().to_string();
        let duration_ms = outcome.duration().as_millis() as u64;
        let mut metadata = AnalyticsMetadata {
            timestamp: Utc::now().timestamp_millis(),
            user_agent: self.user_agent.clone(),
            method: None,
            retry_count: outcome.retry_count(),
            duration: duration_ms,
            preferred_language: self.translator.locale().code().to_string(),
        };

        match &outcome {
            CopyOutcome::Succeeded {
                method,
                retry_count,
                ..
            } => {
                metadata.method = Some(*method);
                let mut properties = Properties::new();
                properties.insert("method".into(), method.as_str().into());
                properties.insert("duration".into(), duration_ms.into());
                properties.insert("retryCount".into(), (*retry_count).into());
                properties.insert("email".into(), email.clone().into());
                self.analytics.track("email_copy_success", properties);

                self.performance
                    .record_metric(metric::CLIPBOARD_OPERATION, duration_ms as f64);
                self.performance.record_metric(metric::COPY_SUCCESS, 1.0);

                if let Some(callback) = &self.callbacks.on_copy_success {
                    callback(&email, &metadata);
                }
            }
            CopyOutcome::Failed {
                error, retry_count, ..
            } => {
                // Invalid input never reaches a strategy.
                let method = match error {
                    CopyError::InvalidInput(_) => "none",
                    _ => CopyMethod::Fallback.as_str(),
                };
                let mut properties = Properties::new();
                properties.insert("error".into(), error.kind().into());
                properties.insert("email".into(), email.clone().into());
                properties.insert("method".into(), method.into());
                properties.insert("retryCount".into(), (*retry_count).into());
                self.analytics.track("email_copy_error", properties);

                if let Some(callback) = &self.callbacks.on_copy_error {
                    callback(error, &email, &metadata);
                }
            }
        }

        self.settled += 1;
        self.last_outcome = Some(outcome);
    }

    fn publish(&self) {
        let state = self.machine.state().clone();
        let snapshot = WidgetSnapshot {
            label: label_for(&self.translator, &state, self.machine.policy()),
            state,
            settled: self.settled,
            last_outcome: self.last_outcome.clone(),
        };
        self.snapshots.send_replace(snapshot);
    }

    fn shutdown(&mut self, pending: &mut Pending) {
        if pending.attempt.take().is_some() {
            debug!("Dropping in-flight copy attempt");
        }
        pending.debounce_at = None;
        pending.retry_at = None;
        pending.reset_at = None;
        self.orchestrator.shutdown();
        self.performance.cleanup();
    }
}
