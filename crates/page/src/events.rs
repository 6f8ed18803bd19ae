//! Notification channels - mutation and viewport broadcasts
//!
//! Design: each channel is an explicit object shared by `Arc`, not a global.
//! Callback subscribers run synchronously, in registration order, on the
//! publishing thread. Async consumers can take a broadcast receiver instead.

use dashmap::DashMap;
use dom::{MutationRecord, Viewport};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Where a mutation event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationSource {
    /// Platform observer delivered a record batch
    Observer,
    /// Polling fallback tick, no records attached
    Poll,
}

/// One batch of structural changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationEvent {
    pub source: MutationSource,
    pub records: Vec<MutationRecord>,
}

impl MutationEvent {
    pub fn observed(records: Vec<MutationRecord>) -> Self {
        Self {
            source: MutationSource::Observer,
            records,
        }
    }

    pub fn poll() -> Self {
        Self {
            source: MutationSource::Poll,
            records: Vec::new(),
        }
    }
}

/// What made the viewport change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewportTrigger {
    Resize,
    Scroll,
}

/// "Something about the viewport changed"
///
/// `trigger` is the last signal seen in the throttle window. The viewport
/// snapshot is taken when the event fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportEvent {
    pub trigger: ViewportTrigger,
    pub viewport: Viewport,
}

/// Handle for removing a callback subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Event subscriber callback
pub type EventCallback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Publish/subscribe channel
pub struct Channel<E> {
    name: &'static str,

    /// Monotonic subscription counter; also gives registration order
    next_id: AtomicU64,

    subscribers: DashMap<SubscriptionId, EventCallback<E>>,

    tx: broadcast::Sender<E>,
}

impl<E: Clone + Send + 'static> Channel<E> {
    pub fn new(name: &'static str) -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self {
            name,
            next_id: AtomicU64::new(1),
            subscribers: DashMap::new(),
            tx,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Publish an event to callbacks, then to broadcast receivers
    ///
    /// Callbacks are snapshotted first, so a callback may unsubscribe
    /// itself (or others) while the event is being delivered.
    pub fn publish(&self, event: E) {
        let mut callbacks: Vec<(SubscriptionId, EventCallback<E>)> = self
            .subscribers
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        callbacks.sort_by_key(|(id, _)| *id);

        tracing::trace!(
            channel = self.name,
            subscribers = callbacks.len(),
            "publishing event"
        );

        for (_, callback) in callbacks {
            callback(&event);
        }

        let _ = self.tx.send(event); // Ignore error if no receivers
    }

    /// Register a callback, invoked for every event until unsubscribed
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.subscribers.insert(id, Arc::new(callback));
        id
    }

    /// Remove a callback; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Receive events asynchronously
    pub fn stream(&self) -> broadcast::Receiver<E> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

pub type MutationChannel = Channel<MutationEvent>;
pub type ViewportChannel = Channel<ViewportEvent>;

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_registration_order() {
        let channel: Channel<u32> = Channel::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            channel.subscribe(move |value: &u32| seen.lock().push((tag, *value)));
        }

        channel.publish(7);
        assert_eq!(
            *seen.lock(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[test]
    fn test_unsubscribe_during_publish() {
        let channel: Arc<Channel<u32>> = Arc::new(Channel::new("test"));
        let hits = Arc::new(Mutex::new(0));
        let slot = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&channel);
        let (hits_cb, slot_cb) = (hits.clone(), slot.clone());
        let id = channel.subscribe(move |_: &u32| {
            *hits_cb.lock() += 1;
            if let (Some(channel), Some(id)) = (weak.upgrade(), *slot_cb.lock()) {
                channel.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        channel.publish(1);
        channel.publish(2);
        assert_eq!(*hits.lock(), 1);
        assert_eq!(channel.subscriber_count(), 0);
        assert!(!channel.unsubscribe(id));
    }

    #[tokio::test]
    async fn test_stream_receives_events() {
        let channel = MutationChannel::new("mutations");
        let mut rx = channel.stream();

        channel.publish(MutationEvent::poll());

        match rx.recv().await {
            Ok(event) => assert_eq!(event.source, MutationSource::Poll),
            _ => panic!("Expected poll event"),
        }
    }
}
