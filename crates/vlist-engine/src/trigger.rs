//! Edge triggers.
//!
//! A bridge reports when the top or bottom sentinel scrolls into view. The
//! engine only consumes these notifications; [`ChannelBridge`] is a channel
//! backed implementation hosts can feed from their own visibility observer.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
}

impl Edge {
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
        }
    }
}

/// A single visibility observation for one sentinel.
#[derive(Debug, Clone)]
pub struct TriggerEntry {
    /// Id of the observed element
    pub target: String,
    /// Whether the element currently intersects the viewport
    pub is_intersecting: bool,
    /// When the observation was made
    pub observed_at: DateTime<Utc>,
}

impl TriggerEntry {
    pub fn visible(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            is_intersecting: true,
            observed_at: Utc::now(),
        }
    }

    pub fn hidden(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            is_intersecting: false,
            observed_at: Utc::now(),
        }
    }
}

/// Batches of entries, delivered in observation order.
pub type EntryReceiver = mpsc::UnboundedReceiver<Vec<TriggerEntry>>;

/// Visibility notifier for the list's sentinels.
pub trait EdgeTriggerBridge {
    /// Start observing the given sentinel ids.
    fn observe(&mut self, sentinels: &[&str]) -> EntryReceiver;

    /// Stop observing. No entries are delivered afterwards.
    fn disconnect(&mut self);
}

#[derive(Default)]
struct BridgeShared {
    tx: Option<mpsc::UnboundedSender<Vec<TriggerEntry>>>,
    sentinels: Vec<String>,
}

fn lock(shared: &Mutex<BridgeShared>) -> MutexGuard<'_, BridgeShared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Channel-backed bridge. The engine holds the bridge, the host keeps the
/// [`BridgeHandle`] and pushes entries through it.
pub struct ChannelBridge {
    shared: Arc<Mutex<BridgeShared>>,
}

impl ChannelBridge {
    pub fn new() -> (Self, BridgeHandle) {
        let shared = Arc::new(Mutex::new(BridgeShared::default()));
        let handle = BridgeHandle {
            shared: shared.clone(),
        };
        (Self { shared }, handle)
    }
}

impl EdgeTriggerBridge for ChannelBridge {
    fn observe(&mut self, sentinels: &[&str]) -> EntryReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut shared = lock(&self.shared);
        shared.tx = Some(tx);
        shared.sentinels = sentinels.iter().map(|s| s.to_string()).collect();
        tracing::debug!("Observing sentinels: {:?}", shared.sentinels);
        rx
    }

    fn disconnect(&mut self) {
        let mut shared = lock(&self.shared);
        if shared.tx.take().is_some() {
            tracing::debug!("Stopped observing sentinels: {:?}", shared.sentinels);
        }
        shared.sentinels.clear();
    }
}

#[derive(Clone)]
pub struct BridgeHandle {
    shared: Arc<Mutex<BridgeShared>>,
}

impl BridgeHandle {
    /// Deliver a batch of entries. Returns false when nothing is observing.
    pub fn notify(&self, entries: Vec<TriggerEntry>) -> bool {
        let shared = lock(&self.shared);
        match &shared.tx {
            Some(tx) => tx.send(entries).is_ok(),
            None => false,
        }
    }

    /// Report a single sentinel as visible.
    pub fn reveal(&self, target: &str) -> bool {
        self.notify(vec![TriggerEntry::visible(target)])
    }

    pub fn is_observing(&self) -> bool {
        lock(&self.shared).tx.is_some()
    }

    pub fn observed(&self) -> Vec<String> {
        lock(&self.shared).sentinels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_opposite() {
        assert_eq!(Edge::Top.opposite(), Edge::Bottom);
        assert_eq!(Edge::Bottom.opposite(), Edge::Top);
        assert_eq!(Edge::Bottom.to_string(), "bottom");
    }

    #[test]
    fn test_notify_before_observe_is_rejected() {
        let (_bridge, handle) = ChannelBridge::new();
        assert!(!handle.is_observing());
        assert!(!handle.reveal("bottom-observer"));
    }

    #[tokio::test]
    async fn test_entries_flow_until_disconnect() {
        let (mut bridge, handle) = ChannelBridge::new();
        let mut rx = bridge.observe(&["top", "bottom"]);
        assert_eq!(handle.observed(), vec!["top", "bottom"]);

        assert!(handle.notify(vec![
            TriggerEntry::visible("bottom"),
            TriggerEntry::hidden("top"),
        ]));
        let batch = rx.recv().await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].target, "bottom");
        assert!(!batch[1].is_intersecting);

        bridge.disconnect();
        assert!(!handle.is_observing());
        assert!(!handle.reveal("bottom"));
        assert!(rx.recv().await.is_none());
    }
}
