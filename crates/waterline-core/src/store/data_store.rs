// ── Authoritative reading set ──
//
// One owned cell holding the sorted dataset. Writers swap in a whole new
// `Arc<Vec<_>>`; readers clone the `Arc` and never observe a partial update.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::SensorReading;
use crate::stream::ReadingStream;

/// Sorted, replace-only reading set with change notification.
pub struct ReadingStore {
    readings: watch::Sender<Arc<Vec<SensorReading>>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl ReadingStore {
    pub fn new() -> Self {
        let (readings, _) = watch::channel(Arc::new(Vec::new()));
        let (last_refresh, _) = watch::channel(None);
        Self {
            readings,
            last_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// Current dataset, oldest first.
    pub fn snapshot(&self) -> Arc<Vec<SensorReading>> {
        self.readings.borrow().clone()
    }

    /// The newest reading (last element), if any.
    pub fn latest(&self) -> Option<SensorReading> {
        self.readings.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.readings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.borrow().is_empty()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&self) -> ReadingStream {
        ReadingStream::new(self.readings.subscribe())
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Swap in a freshly fetched dataset.
    ///
    /// `readings` must already be sorted ascending by epoch. An empty batch
    /// never overwrites a non-empty dataset; returns whether the swap
    /// happened.
    pub(crate) fn replace(&self, readings: Vec<SensorReading>) -> bool {
        debug_assert!(
            readings
                .windows(2)
                .all(|w| w[0].timestamp_epoch <= w[1].timestamp_epoch),
            "readings must be sorted before they reach the store"
        );

        let _ = self.last_refresh.send_replace(Some(Utc::now()));
        if readings.is_empty() && !self.is_empty() {
            return false;
        }
        let _ = self.readings.send_replace(Arc::new(readings));
        true
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// When the feed last answered successfully.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How long ago the last successful refresh happened.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::reading;

    #[test]
    fn starts_empty() {
        let store = ReadingStore::new();
        assert!(store.is_empty());
        assert!(store.latest().is_none());
        assert!(store.last_refresh().is_none());
    }

    #[test]
    fn latest_is_last_element() {
        let store = ReadingStore::new();
        assert!(store.replace(vec![reading(1, 1.0), reading(2, 2.0), reading(3, 3.0)]));
        assert_eq!(store.len(), 3);
        assert_eq!(store.latest().map(|r| r.timestamp_epoch), Some(3));
        assert!(store.last_refresh().is_some());
    }

    #[test]
    fn replace_is_wholesale() {
        let store = ReadingStore::new();
        store.replace(vec![reading(1, 1.0), reading(2, 2.0)]);
        store.replace(vec![reading(10, 5.0)]);
        let snap = store.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].timestamp_epoch, 10);
    }

    #[test]
    fn empty_batch_keeps_previous_dataset() {
        let store = ReadingStore::new();
        store.replace(vec![reading(1, 1.0)]);
        assert!(!store.replace(Vec::new()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn old_snapshots_are_unaffected_by_replace() {
        let store = ReadingStore::new();
        store.replace(vec![reading(1, 1.0)]);
        let before = store.snapshot();
        store.replace(vec![reading(2, 2.0), reading(3, 3.0)]);
        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }
}
