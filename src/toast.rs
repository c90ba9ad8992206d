//! Toast notification queue
//!
//! Holds any number of transient notifications, each with its own
//! auto-dismiss timer. Entries keep the order `show` was called in,
//! regardless of their individual durations.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::timing;
use crate::i18n::{MessageKey, Translator};

/// Ids are unique for the whole process, across every queue.
static NEXT_TOAST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn default_duration(&self) -> Duration {
        match self {
            Severity::Success => timing::TOAST_SUCCESS,
            Severity::Error => timing::TOAST_ERROR,
            Severity::Info => timing::TOAST_INFO,
            Severity::Warning => timing::TOAST_WARNING,
        }
    }
}

pub type ToastId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToastEntry {
    pub id: ToastId,
    pub message: String,
    pub severity: Severity,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}

#[derive(Default)]
struct QueueInner {
    entries: Vec<ToastEntry>,
    timers: HashMap<ToastId, JoinHandle<()>>,
}

/// Cloneable handle to a shared toast queue.
#[derive(Clone)]
pub struct ToastQueue {
    inner: Arc<Mutex<QueueInner>>,
    translator: Translator,
}

impl ToastQueue {
    pub fn new(translator: Translator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner::default())),
            translator,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        // A panic while holding the lock cannot leave the Vec/HashMap torn.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a toast and arm its auto-dismiss timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn show(&self, message: impl Into<String>, severity: Severity, duration: Option<Duration>) -> ToastId {
        let id = NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed);
        let duration = duration.unwrap_or_else(|| severity.default_duration());
        let entry = ToastEntry {
            id,
            message: message.into(),
            severity,
            duration_ms: duration.as_millis() as u64,
        };
        debug!("Toast {} ({:?}): {}", id, severity, entry.message);

        let weak = Arc::downgrade(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                inner.entries.retain(|toast| toast.id != id);
                inner.timers.remove(&id);
            }
        });

        let mut inner = self.lock();
        inner.entries.push(entry);
        inner.timers.insert(id, timer);
        id
    }

    /// Remove a toast now and cancel its timer. Unknown ids are ignored.
    pub fn dismiss(&self, id: ToastId) {
        let mut inner = self.lock();
        inner.entries.retain(|toast| toast.id != id);
        if let Some(timer) = inner.timers.remove(&id) {
            timer.abort();
        }
    }

    /// Live entries in `show` order.
    pub fn entries(&self) -> Vec<ToastEntry> {
        self.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Accessible label for each toast's close control.
    pub fn close_label(&self) -> String {
        self.translator.translate(MessageKey::CloseNotification, &[])
    }

    /// Drop every entry and cancel every pending timer.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        for (_, timer) in inner.timers.drain() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn queue() -> ToastQueue {
        ToastQueue::new(Translator::new("en"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_preserves_order() {
        let q = queue();
        q.show("a", Severity::Error, None);
        q.show("b", Severity::Success, None);

        let messages: Vec<_> = q.entries().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_only_removes_target() {
        let q = queue();
        let a = q.show("a", Severity::Info, None);
        let b = q.show("b", Severity::Info, None);

        q.dismiss(a);
        let remaining = q.entries();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b);

        // Repeat dismissal is a no-op
        q.dismiss(a);
        assert_eq!(q.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_expiry() {
        let q = queue();
        q.show("success", Severity::Success, None);
        q.show("error", Severity::Error, None);

        tokio::time::sleep(Duration::from_millis(3001)).await;
        let remaining: Vec<_> = q.entries().into_iter().map(|t| t.message).collect();
        assert_eq!(remaining, vec!["error"]);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(q.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_duration() {
        let q = queue();
        let id = q.show("quick", Severity::Warning, Some(Duration::from_millis(10)));
        assert_eq!(q.entries()[0].duration_ms, 10);
        assert_eq!(q.entries()[0].id, id);

        tokio::time::sleep(Duration::from_millis(11)).await;
        assert!(q.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_timers() {
        let q = queue();
        q.show("a", Severity::Info, None);
        q.show("b", Severity::Info, None);
        q.clear();
        assert!(q.is_empty());
        assert!(q.lock().timers.is_empty());
    }

    #[test]
    fn test_default_durations() {
        assert_eq!(Severity::Success.default_duration(), Duration::from_millis(3000));
        assert_eq!(Severity::Error.default_duration(), Duration::from_millis(5000));
        assert_eq!(Severity::Info.default_duration(), Duration::from_millis(4000));
        assert_eq!(Severity::Warning.default_duration(), Duration::from_millis(4500));
    }

    #[test]
    fn test_close_label_localized() {
        let q = ToastQueue::new(Translator::new("fr"));
        assert_eq!(q.close_label(), "Fermer la notification");
    }

    proptest! {
        #[test]
        fn prop_ids_never_repeat(count in 1usize..50) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            rt.block_on(async {
                let q = queue();
                let mut ids: Vec<_> = (0..count)
                    .map(|i| q.show(format!("t{}", i), Severity::Info, None))
                    .collect();
                let dismissed = ids[0];
                q.dismiss(dismissed);
                let next = q.show("after", Severity::Info, None);
                prop_assert!(!ids.contains(&next));
                ids.push(next);
                let len = ids.len();
                ids.sort_unstable();
                ids.dedup();
                prop_assert_eq!(ids.len(), len);
                Ok(())
            })?;
        }
    }
}
