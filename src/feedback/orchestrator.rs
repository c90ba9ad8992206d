//! Fans a settled copy result out to every feedback channel.
//!
//! Each channel is gated first by its feature flag and then by the
//! accessibility snapshot. A failing or missing channel is logged and
//! skipped; it never stops the others and never reaches the user.

use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use super::announcer::{Announcer, Politeness};
use super::audio::{AudioHandle, ToneKind};
use super::capability::CapabilityCache;
use super::celebration::{BurstSpec, Celebration};
use super::haptics::{self, HapticDriver, HapticPattern};
use crate::accessibility::AccessibilityContext;
use crate::clipboard::CopyOutcome;
use crate::config::{timing, FeatureFlags};
use crate::error::{Channel, CopyError};
use crate::i18n::{MessageKey, Translator};
use crate::platform::Platform;
use crate::telemetry::PerformanceRecorder;
use crate::toast::{Severity, ToastQueue};

/// The channel collaborators, already constructed.
#[derive(Clone)]
pub struct FeedbackChannels {
    pub audio: Arc<AudioHandle>,
    pub haptics: Arc<dyn HapticDriver>,
    pub celebration: Arc<dyn Celebration>,
    pub announcer: Announcer,
    pub toasts: ToastQueue,
    pub capabilities: CapabilityCache,
    /// Receives the audio init time when this widget opens the output.
    pub performance: PerformanceRecorder,
}

impl FeedbackChannels {
    /// Wire the channels from a platform bundle. The audio output and the
    /// capability cache are the bundle's shared ones; the announcer and the
    /// toast queue belong to this widget.
    pub fn from_platform(
        platform: &Platform,
        translator: Translator,
        performance: PerformanceRecorder,
    ) -> Self {
        Self {
            audio: platform.audio.clone(),
            haptics: platform.haptics.clone(),
            celebration: platform.celebration.clone(),
            announcer: Announcer::new(platform.live_region.clone()),
            toasts: ToastQueue::new(translator),
            capabilities: platform.capabilities.clone(),
            performance,
        }
    }
}

pub struct FeedbackOrchestrator {
    channels: FeedbackChannels,
    features: FeatureFlags,
    accessibility: AccessibilityContext,
    translator: Translator,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

fn tolerate(channel: Channel, result: Result<(), CopyError>) {
    if let Err(e) = result {
        debug!("{} feedback skipped: {}", channel, e);
    }
}

impl FeedbackOrchestrator {
    pub fn new(
        channels: FeedbackChannels,
        features: FeatureFlags,
        accessibility: AccessibilityContext,
        translator: Translator,
    ) -> Self {
        Self {
            channels,
            features,
            accessibility,
            translator,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.channels.toasts
    }

    pub fn dispatch(&self, outcome: &CopyOutcome) {
        match outcome {
            CopyOutcome::Succeeded { .. } => self.on_success(),
            CopyOutcome::Failed { message, .. } => self.on_error(message),
        }
    }

    pub fn on_success(&self) {
        if self.features.audio {
            tolerate(
                Channel::Audio,
                self.channels
                    .audio
                    .play(ToneKind::Success, &self.channels.performance),
            );
        }
        if self.features.haptics {
            self.vibrate(HapticPattern::Success);
        }

        let message = self.translator.translate(MessageKey::Success, &[]);
        self.channels.toasts.show(message, Severity::Success, None);

        self.announce(MessageKey::EmailCopied, Politeness::Polite);

        if self.features.confetti && self.accessibility.allows_motion() {
            self.schedule_celebration();
        }
    }

    pub fn on_error(&self, message: &str) {
        if self.features.audio {
            tolerate(
                Channel::Audio,
                self.channels
                    .audio
                    .play(ToneKind::Error, &self.channels.performance),
            );
        }
        if self.features.haptics {
            self.vibrate(HapticPattern::Error);
        }

        self.channels
            .toasts
            .show(message.to_string(), Severity::Error, None);

        if self.accessibility.announce_actions {
            tolerate(
                Channel::Announcer,
                self.channels.announcer.announce(message, Politeness::Assertive),
            );
        }
    }

    /// Polite notice that retry number `count` is scheduled.
    pub fn on_retry(&self, count: u32) {
        if !self.accessibility.announce_actions {
            return;
        }
        let message = self
            .translator
            .translate(MessageKey::RetryAttempt, &[("count", &count)]);
        tolerate(
            Channel::Announcer,
            self.channels.announcer.announce(&message, Politeness::Polite),
        );
    }

    fn vibrate(&self, pattern: HapticPattern) {
        tolerate(
            Channel::Haptics,
            haptics::trigger(
                self.channels.haptics.as_ref(),
                &self.channels.capabilities,
                pattern,
            ),
        );
    }

    fn announce(&self, key: MessageKey, politeness: Politeness) {
        if !self.accessibility.announce_actions {
            return;
        }
        let message = self.translator.translate(key, &[]);
        tolerate(
            Channel::Announcer,
            self.channels.announcer.announce(&message, politeness),
        );
    }

    fn schedule_celebration(&self) {
        if let Err(e) = self.channels.capabilities.require(Channel::Animation) {
            debug!("Celebration skipped: {}", e);
            return;
        }

        let celebration = self.channels.celebration.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(timing::CONFETTI_DELAY).await;
            tolerate(Channel::Animation, celebration.burst(&BurstSpec::default()));
        });

        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        pending.retain(|task| !task.is_finished());
        pending.push(task);
    }

    /// Cancel delayed effects and release this widget's channel resources.
    /// The shared audio output stays open for other mounts.
    pub fn shutdown(&self) {
        for task in self
            .pending
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .drain(..)
        {
            task.abort();
        }
        self.channels.announcer.shutdown();
        self.channels.toasts.clear();
        self.channels.celebration.release();
    }
}
