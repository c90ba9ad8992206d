//! Explicit finite-state machine for one widget's copy lifecycle.
//!
//! ```text
//! idle -> validating -> copying -> succeeded -> (reset) idle
//!                     \          \-> retrying -> copying   (at most 3 times)
//!                      \-> failed               \-> failed
//! ```
//!
//! The machine is pure: it consumes discrete [`Event`]s stamped with the
//! current time and returns the [`Effect`]s the driver must carry out
//! (run a copy, arm a timer, dispatch feedback). It never sleeps or performs
//! I/O itself.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use super::validation::validate_email;
use crate::config::timing;
use crate::error::{CopyError, FailureCategory};
use crate::i18n::{MessageKey, Translator};
use crate::retry::{RetryDecision, RetryPolicy};

/// Which strategy wrote the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMethod {
    Modern,
    Fallback,
}

impl CopyMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyMethod::Modern => "modern",
            CopyMethod::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Validating,
    Copying,
    Retrying,
    Succeeded,
    Failed,
}

impl Phase {
    /// An attempt is in flight; new triggers are ignored.
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Validating | Phase::Copying | Phase::Retrying)
    }
}

/// One user-initiated copy request, alive until it settles.
#[derive(Debug, Clone)]
pub struct ClipboardAttempt {
    pub text: String,
    pub started_at: Instant,
    pub retry_count: u32,
    /// Set once the attempt is running on the retry path.
    pub is_retry: bool,
}

/// Observable state of the widget's clipboard control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardState {
    pub phase: Phase,
    pub error: Option<String>,
    pub last_attempt_at: Option<Instant>,
    pub retry_count: u32,
    pub method: Option<CopyMethod>,
}

impl Default for ClipboardState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            error: None,
            last_attempt_at: None,
            retry_count: 0,
            method: None,
        }
    }
}

/// Discrete inputs to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The (already debounced) user trigger.
    Trigger,
    StrategySucceeded(CopyMethod),
    StrategyFailed(CopyError),
    RetryElapsed,
    ResetElapsed,
    /// The UI consumed a settled result.
    Acknowledge,
}

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyOutcome {
    Succeeded {
        method: CopyMethod,
        retry_count: u32,
        duration: Duration,
    },
    Failed {
        error: CopyError,
        /// Localized, actionable text that includes the target value.
        message: String,
        retry_count: u32,
        duration: Duration,
    },
}

impl CopyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CopyOutcome::Succeeded { .. })
    }

    pub fn retry_count(&self) -> u32 {
        match self {
            CopyOutcome::Succeeded { retry_count, .. } | CopyOutcome::Failed { retry_count, .. } => {
                *retry_count
            }
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            CopyOutcome::Succeeded { duration, .. } | CopyOutcome::Failed { duration, .. } => {
                *duration
            }
        }
    }
}

/// Work the driver must perform after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Run the modern-then-fallback strategies for `text`.
    RunAttempt { text: String, retry: u32 },
    /// Deliver `Event::RetryElapsed` after `delay`.
    ScheduleRetry { retry: u32, delay: Duration },
    /// Deliver `Event::ResetElapsed` after the given delay.
    ScheduleReset(Duration),
    /// Hand the result to feedback and telemetry.
    Settled(CopyOutcome),
}

pub struct ClipboardMachine {
    target: String,
    translator: Translator,
    policy: RetryPolicy,
    cooldown: Duration,
    reset_after: Duration,
    state: ClipboardState,
    attempt: Option<ClipboardAttempt>,
}

impl ClipboardMachine {
    pub fn new(target: impl Into<String>, translator: Translator, policy: RetryPolicy) -> Self {
        Self {
            target: target.into(),
            translator,
            policy,
            cooldown: timing::COOLDOWN,
            reset_after: timing::COPIED_STATE,
            state: ClipboardState::default(),
            attempt: None,
        }
    }

    pub fn state(&self) -> &ClipboardState {
        &self.state
    }

    pub fn attempt(&self) -> Option<&ClipboardAttempt> {
        self.attempt.as_ref()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn handle(&mut self, event: Event, now: Instant) -> Vec<Effect> {
        match event {
            Event::Trigger => self.on_trigger(now),
            Event::StrategySucceeded(method) => self.on_success(method, now),
            Event::StrategyFailed(error) => self.on_failure(error, now),
            Event::RetryElapsed => self.on_retry_elapsed(),
            Event::ResetElapsed => {
                if self.state.phase == Phase::Succeeded {
                    self.state.phase = Phase::Idle;
                }
                Vec::new()
            }
            Event::Acknowledge => {
                if matches!(self.state.phase, Phase::Succeeded | Phase::Failed) {
                    self.state.phase = Phase::Idle;
                    self.state.error = None;
                }
                Vec::new()
            }
        }
    }

    fn on_trigger(&mut self, now: Instant) -> Vec<Effect> {
        if self.state.phase.is_busy() {
            debug!("Copy already in flight, ignoring trigger");
            return Vec::new();
        }
        if let Some(last) = self.state.last_attempt_at {
            if now.saturating_duration_since(last) < self.cooldown {
                debug!("Copy trigger inside cool-down window, ignoring");
                return Vec::new();
            }
        }

        self.state.phase = Phase::Validating;
        self.state.error = None;
        self.state.method = None;

        if let Err(error) = validate_email(&self.target) {
            let message = self.failure_message(&error);
            info!("Copy rejected: {}", error);
            self.state.phase = Phase::Failed;
            self.state.error = Some(message.clone());
            return vec![Effect::Settled(CopyOutcome::Failed {
                error,
                message,
                retry_count: 0,
                duration: Duration::ZERO,
            })];
        }

        self.attempt = Some(ClipboardAttempt {
            text: self.target.clone(),
            started_at: now,
            retry_count: 0,
            is_retry: false,
        });
        self.state.phase = Phase::Copying;
        self.state.retry_count = 0;

        vec![Effect::RunAttempt {
            text: self.target.clone(),
            retry: 0,
        }]
    }

    fn on_success(&mut self, method: CopyMethod, now: Instant) -> Vec<Effect> {
        if self.state.phase != Phase::Copying {
            return Vec::new();
        }
        let Some(attempt) = self.attempt.take() else {
            return Vec::new();
        };

        let duration = now.saturating_duration_since(attempt.started_at);
        info!(
            "Copied via {} after {} retries in {:?}",
            method.as_str(),
            attempt.retry_count,
            duration
        );

        self.state = ClipboardState {
            phase: Phase::Succeeded,
            error: None,
            last_attempt_at: Some(now),
            retry_count: 0,
            method: Some(method),
        };

        vec![
            Effect::Settled(CopyOutcome::Succeeded {
                method,
                retry_count: attempt.retry_count,
                duration,
            }),
            Effect::ScheduleReset(self.reset_after),
        ]
    }

    fn on_failure(&mut self, error: CopyError, now: Instant) -> Vec<Effect> {
        if self.state.phase != Phase::Copying {
            return Vec::new();
        }
        let Some(mut attempt) = self.attempt.take() else {
            return Vec::new();
        };

        match self.policy.decide(attempt.retry_count) {
            RetryDecision::RetryAfter { retry, delay } => {
                attempt.retry_count = retry;
                attempt.is_retry = true;
                self.attempt = Some(attempt);
                self.state.phase = Phase::Retrying;
                self.state.retry_count = retry;
                vec![Effect::ScheduleRetry { retry, delay }]
            }
            RetryDecision::GiveUp => {
                let message = self.failure_message(&error);
                let duration = now.saturating_duration_since(attempt.started_at);
                self.state = ClipboardState {
                    phase: Phase::Failed,
                    error: Some(message.clone()),
                    last_attempt_at: Some(now),
                    retry_count: 0,
                    method: None,
                };
                vec![Effect::Settled(CopyOutcome::Failed {
                    error,
                    message,
                    retry_count: attempt.retry_count,
                    duration,
                })]
            }
        }
    }

    fn on_retry_elapsed(&mut self) -> Vec<Effect> {
        if self.state.phase != Phase::Retrying {
            return Vec::new();
        }
        let Some(attempt) = self.attempt.as_ref() else {
            return Vec::new();
        };

        // Retries reuse the validated text; validation runs once per trigger.
        self.state.phase = Phase::Copying;
        vec![Effect::RunAttempt {
            text: attempt.text.clone(),
            retry: attempt.retry_count,
        }]
    }

    /// User-facing failure text; always ends with the literal target.
    fn failure_message(&self, error: &CopyError) -> String {
        let t = &self.translator;
        if let CopyError::InvalidInput(_) = error {
            let reason = t.translate(MessageKey::InvalidEmail, &[]);
            return t.translate(
                MessageKey::InvalidEmailDetail,
                &[("reason", &reason), ("email", &self.target)],
            );
        }

        let reason_key = match error.category() {
            FailureCategory::PermissionDenied => MessageKey::PermissionDenied,
            FailureCategory::InsecureContext => MessageKey::HttpsRequired,
            FailureCategory::Generic => MessageKey::FallbackCopy,
        };
        let reason = t.translate(reason_key, &[]);
        t.translate(
            MessageKey::CopyFailedManual,
            &[("reason", &reason), ("email", &self.target)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: &str = "bennafla.riidha@gmail.com";

    fn machine(target: &str) -> ClipboardMachine {
        ClipboardMachine::new(target, Translator::new("en"), RetryPolicy::clipboard())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_valid_trigger_runs_attempt() {
        let mut m = machine(EMAIL);
        let now = Instant::now();

        let effects = m.handle(Event::Trigger, now);

        assert_eq!(
            effects,
            vec![Effect::RunAttempt {
                text: EMAIL.to_string(),
                retry: 0
            }]
        );
        assert_eq!(m.state().phase, Phase::Copying);
        assert!(m.attempt().is_some());
    }

    #[test]
    fn test_invalid_email_fails_without_attempt() {
        let mut m = machine("not-an-email");
        let effects = m.handle(Event::Trigger, Instant::now());

        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::Settled(CopyOutcome::Failed {
                error,
                message,
                retry_count,
                ..
            }) => {
                assert!(matches!(error, CopyError::InvalidInput(_)));
                assert!(message.contains("Invalid email format"));
                assert!(message.contains("not-an-email"));
                assert_eq!(*retry_count, 0);
            }
            other => panic!("unexpected effect {:?}", other),
        }
        assert_eq!(m.state().phase, Phase::Failed);
        assert!(m.state().last_attempt_at.is_none());
        assert!(m.attempt().is_none());
    }

    #[test]
    fn test_success_settles_and_schedules_reset() {
        let mut m = machine(EMAIL);
        let start = Instant::now();
        m.handle(Event::Trigger, start);

        let effects = m.handle(Event::StrategySucceeded(CopyMethod::Fallback), start + ms(40));

        assert_eq!(
            effects,
            vec![
                Effect::Settled(CopyOutcome::Succeeded {
                    method: CopyMethod::Fallback,
                    retry_count: 0,
                    duration: ms(40),
                }),
                Effect::ScheduleReset(timing::COPIED_STATE),
            ]
        );
        assert_eq!(m.state().phase, Phase::Succeeded);
        assert_eq!(m.state().method, Some(CopyMethod::Fallback));
        assert_eq!(m.state().last_attempt_at, Some(start + ms(40)));

        m.handle(Event::ResetElapsed, start + ms(3040));
        assert_eq!(m.state().phase, Phase::Idle);
    }

    #[test]
    fn test_busy_trigger_is_noop() {
        let mut m = machine(EMAIL);
        let now = Instant::now();
        m.handle(Event::Trigger, now);
        let before = m.state().clone();

        assert!(m.handle(Event::Trigger, now + ms(5)).is_empty());
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn test_cooldown_drops_trigger() {
        let mut m = machine(EMAIL);
        let start = Instant::now();
        m.handle(Event::Trigger, start);
        m.handle(Event::StrategySucceeded(CopyMethod::Modern), start + ms(10));
        let settled = m.state().clone();

        assert!(m.handle(Event::Trigger, start + ms(900)).is_empty());
        assert_eq!(m.state(), &settled);

        let effects = m.handle(Event::Trigger, start + ms(1010));
        assert!(matches!(effects[0], Effect::RunAttempt { .. }));
    }

    #[test]
    fn test_failures_retry_three_times_then_fail() {
        let mut m = machine(EMAIL);
        let mut now = Instant::now();
        let mut runs = 0;
        let mut effects = m.handle(Event::Trigger, now);

        loop {
            match effects.as_slice() {
                [Effect::RunAttempt { .. }] => {
                    runs += 1;
                    now += ms(5);
                    effects = m.handle(
                        Event::StrategyFailed(CopyError::classify("NotAllowedError")),
                        now,
                    );
                }
                [Effect::ScheduleRetry { delay, .. }] => {
                    assert_eq!(*delay, ms(800));
                    assert_eq!(m.state().phase, Phase::Retrying);
                    now += *delay;
                    effects = m.handle(Event::RetryElapsed, now);
                }
                [Effect::Settled(outcome)] => {
                    assert!(!outcome.is_success());
                    assert_eq!(outcome.retry_count(), 3);
                    break;
                }
                other => panic!("unexpected effects {:?}", other),
            }
        }

        assert_eq!(runs, 4);
        assert_eq!(m.state().phase, Phase::Failed);
        let error = m.state().error.clone().expect("error message");
        assert!(error.contains("Please allow clipboard access"));
        assert!(error.ends_with(EMAIL));
    }

    #[test]
    fn test_retry_skips_validation_and_keeps_text() {
        let mut m = machine(EMAIL);
        let now = Instant::now();
        m.handle(Event::Trigger, now);
        m.handle(Event::StrategyFailed(CopyError::CopyFailed("x".into())), now);

        let attempt = m.attempt().expect("attempt");
        assert!(attempt.is_retry);
        assert_eq!(attempt.retry_count, 1);

        let effects = m.handle(Event::RetryElapsed, now + ms(800));
        assert_eq!(
            effects,
            vec![Effect::RunAttempt {
                text: EMAIL.to_string(),
                retry: 1
            }]
        );
    }

    #[test]
    fn test_success_after_retry_reports_retry_count() {
        let mut m = machine(EMAIL);
        let now = Instant::now();
        m.handle(Event::Trigger, now);
        m.handle(Event::StrategyFailed(CopyError::CopyFailed("x".into())), now);
        m.handle(Event::RetryElapsed, now + ms(800));
        let effects = m.handle(Event::StrategySucceeded(CopyMethod::Modern), now + ms(810));

        match &effects[0] {
            Effect::Settled(outcome) => {
                assert!(outcome.is_success());
                assert_eq!(outcome.retry_count(), 1);
                assert_eq!(outcome.duration(), ms(810));
            }
            other => panic!("unexpected effect {:?}", other),
        }
        assert_eq!(m.state().retry_count, 0);
    }

    #[test]
    fn test_insecure_context_wording() {
        let mut m = ClipboardMachine::new(
            EMAIL,
            Translator::new("en"),
            RetryPolicy::new(0, ms(800)),
        );
        let now = Instant::now();
        m.handle(Event::Trigger, now);
        m.handle(
            Event::StrategyFailed(CopyError::classify("Clipboard requires a secure context")),
            now,
        );

        let error = m.state().error.clone().unwrap();
        assert!(error.contains("requires HTTPS"));
        assert!(error.contains(EMAIL));
    }

    #[test]
    fn test_stale_events_are_ignored() {
        let mut m = machine(EMAIL);
        let now = Instant::now();
        assert!(m.handle(Event::RetryElapsed, now).is_empty());
        assert!(m
            .handle(Event::StrategySucceeded(CopyMethod::Modern), now)
            .is_empty());
        assert!(m
            .handle(Event::StrategyFailed(CopyError::CopyFailed("x".into())), now)
            .is_empty());
        assert_eq!(m.state(), &ClipboardState::default());
    }

    #[test]
    fn test_acknowledge_clears_failure() {
        let mut m = machine("nope");
        let now = Instant::now();
        m.handle(Event::Trigger, now);
        assert_eq!(m.state().phase, Phase::Failed);

        m.handle(Event::Acknowledge, now);
        assert_eq!(m.state().phase, Phase::Idle);
        assert!(m.state().error.is_none());
    }

    #[test]
    fn test_failed_state_accepts_new_trigger() {
        let mut m = machine("nope");
        let now = Instant::now();
        m.handle(Event::Trigger, now);
        let effects = m.handle(Event::Trigger, now + ms(1));
        assert_eq!(effects.len(), 1);
        assert_eq!(m.state().phase, Phase::Failed);
    }

    #[test]
    fn test_localized_failure_message() {
        let mut m = ClipboardMachine::new("bad", Translator::new("es"), RetryPolicy::clipboard());
        m.handle(Event::Trigger, Instant::now());
        let error = m.state().error.clone().unwrap();
        assert_eq!(error, "Formato de correo inválido: bad");
    }
}
