// ── Reactive reading stream ──
//
// Subscription type for consuming dataset replacements from the store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::SensorReading;

type Snapshot = Arc<Vec<SensorReading>>;

/// A subscription to the reading set.
///
/// Provides both point-in-time snapshot access and change notification via
/// [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct ReadingStream {
    current: Snapshot,
    receiver: watch::Receiver<Snapshot>,
}

impl ReadingStream {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot as of creation or the last `changed()`.
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next replacement, returning the new snapshot.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    ///
    /// The first item is the snapshot current at conversion time.
    pub fn into_stream(self) -> ReadingWatchStream {
        ReadingWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct ReadingWatchStream {
    inner: WatchStream<Snapshot>,
}

impl Stream for ReadingWatchStream {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use crate::model::fixtures::reading;
    use crate::store::ReadingStore;

    #[tokio::test]
    async fn changed_yields_replacement() {
        let store = ReadingStore::new();
        let mut stream = store.subscribe();
        assert!(stream.current().is_empty());

        store.replace(vec![reading(1, 4.0)]);
        let snap = stream.changed().await.unwrap_or_default();
        assert_eq!(snap.len(), 1);
        assert_eq!(stream.current().len(), 1);
    }

    #[tokio::test]
    async fn stream_starts_with_current_snapshot() {
        let store = ReadingStore::new();
        store.replace(vec![reading(1, 4.0), reading(2, 5.0)]);

        let mut stream = store.subscribe().into_stream();
        let first = stream.next().await.unwrap_or_default();
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn changed_ends_when_store_drops() {
        let store = ReadingStore::new();
        let mut stream = store.subscribe();
        drop(store);
        assert!(stream.changed().await.is_none());
    }
}
