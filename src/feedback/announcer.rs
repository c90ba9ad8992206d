//! Screen-reader announcements through transient live-region nodes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::timing;
use crate::error::CopyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Politeness {
    /// Queued behind whatever the reader is saying.
    Polite,
    /// Interrupts the reader.
    Assertive,
}

pub type NodeId = u64;

/// Assistive-technology live region. Inserted nodes are visually hidden.
pub trait LiveRegion: Send + Sync {
    fn insert(&self, message: &str, politeness: Politeness) -> Result<NodeId, CopyError>;
    fn remove(&self, id: NodeId);
}

#[derive(Clone)]
pub struct Announcer {
    region: Arc<dyn LiveRegion>,
    pending: Arc<Mutex<HashMap<NodeId, JoinHandle<()>>>>,
    lifetime: Duration,
}

impl Announcer {
    pub fn new(region: Arc<dyn LiveRegion>) -> Self {
        Self {
            region,
            pending: Arc::new(Mutex::new(HashMap::new())),
            lifetime: timing::ANNOUNCEMENT_LIFETIME,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<NodeId, JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Insert a node carrying `message` and remove it after its lifetime.
    pub fn announce(&self, message: &str, politeness: Politeness) -> Result<(), CopyError> {
        let id = self.region.insert(message, politeness)?;
        debug!("Announced ({:?}): {}", politeness, message);

        let region = self.region.clone();
        let pending = Arc::downgrade(&self.pending);
        let lifetime = self.lifetime;
        let removal = tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            region.remove(id);
            if let Some(pending) = pending.upgrade() {
                pending.lock().unwrap_or_else(|p| p.into_inner()).remove(&id);
            }
        });

        self.lock().insert(id, removal);
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Cancel pending removals and remove their nodes immediately.
    pub fn shutdown(&self) {
        let drained: Vec<_> = self.lock().drain().collect();
        for (id, removal) in drained {
            removal.abort();
            self.region.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct Region {
        next: AtomicU64,
        live: Mutex<Vec<(NodeId, String, Politeness)>>,
    }

    impl LiveRegion for Region {
        fn insert(&self, message: &str, politeness: Politeness) -> Result<NodeId, CopyError> {
            let id = self.next.fetch_add(1, Ordering::SeqCst);
            self.live
                .lock()
                .unwrap()
                .push((id, message.to_string(), politeness));
            Ok(id)
        }

        fn remove(&self, id: NodeId) {
            self.live.lock().unwrap().retain(|(node, _, _)| *node != id);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_node_removed_after_lifetime() {
        let region = Arc::new(Region::default());
        let announcer = Announcer::new(region.clone());

        announcer
            .announce("Email copied to clipboard", Politeness::Polite)
            .unwrap();
        assert_eq!(region.live.lock().unwrap().len(), 1);
        assert_eq!(region.live.lock().unwrap()[0].2, Politeness::Polite);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(region.live.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(region.live.lock().unwrap().is_empty());
        assert_eq!(announcer.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_removes_nodes_now() {
        let region = Arc::new(Region::default());
        let announcer = Announcer::new(region.clone());
        announcer.announce("one", Politeness::Assertive).unwrap();
        announcer.announce("two", Politeness::Polite).unwrap();

        announcer.shutdown();
        assert!(region.live.lock().unwrap().is_empty());
        assert_eq!(announcer.pending(), 0);
    }
}
