//! Fan-out of draft events to connected observers.
//!
//! Every observer owns a bounded FIFO buffer. Publishing copies the observer
//! set, then does a non-blocking send into each buffer, so a slow or dead
//! observer never holds up the publisher or anyone else. Observers whose
//! buffer is closed or full are removed once the pass completes.

use crate::event::DraftEvent;
use dashmap::DashMap;
use futures_util::stream::{self, Stream};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

/// Default per-observer buffer capacity.
pub const DEFAULT_OBSERVER_BUFFER: usize = 1024;

/// Unique identifier for an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Get the raw id.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obs_{}", self.0)
    }
}

/// Hub configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Events buffered per observer before it counts as lagging.
    pub observer_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            observer_buffer: DEFAULT_OBSERVER_BUFFER,
        }
    }
}

/// Why an event could not be handed to an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryFailure {
    /// The observer's receiving side is gone.
    #[error("observer disconnected")]
    Disconnected,

    /// The observer's buffer is full.
    #[error("observer buffer full")]
    Lagging,
}

/// Outcome of a single publish pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Observers the event was queued for.
    pub delivered: usize,
    /// Observers removed because delivery failed.
    pub dropped: usize,
}

type EventSender = mpsc::Sender<Arc<DraftEvent>>;

struct HubInner {
    observers: DashMap<ObserverId, EventSender>,
    next_id: AtomicU64,
    config: HubConfig,
}

/// The observer registry and event fan-out.
///
/// Cloning is cheap; all clones share one observer set.
#[derive(Clone)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

impl NotificationHub {
    /// Create a hub with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Create a hub with custom configuration.
    #[must_use]
    pub fn with_config(config: HubConfig) -> Self {
        debug!("Creating notification hub with config: {:?}", config);
        Self {
            inner: Arc::new(HubInner {
                observers: DashMap::new(),
                next_id: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// Register a new observer.
    ///
    /// The returned [`Subscription`] unsubscribes itself when dropped.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.inner.config.observer_buffer.max(1));
        let id = ObserverId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.inner.observers.insert(id, sender);

        debug!(observer = %id, observers = self.observer_count(), "Observer subscribed");

        Subscription {
            id,
            receiver,
            hub: self.clone(),
        }
    }

    /// Remove an observer.
    ///
    /// Returns `true` if the observer was registered. Unknown or already
    /// removed observers are ignored.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let removed = self.inner.observers.remove(&id).is_some();
        if removed {
            debug!(observer = %id, observers = self.observer_count(), "Observer unsubscribed");
        }
        removed
    }

    /// Deliver an event to every registered observer.
    ///
    /// Failed observers are unsubscribed; the failure is only visible in
    /// the returned report.
    pub fn publish(&self, event: &DraftEvent) -> PublishReport {
        let event = Arc::new(event.clone());

        let targets: Vec<(ObserverId, EventSender)> = self
            .inner
            .observers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut report = PublishReport::default();
        let mut failed = Vec::new();

        for (id, sender) in targets {
            match deliver(&sender, &event) {
                Ok(()) => report.delivered += 1,
                Err(failure) => {
                    debug!(observer = %id, reason = %failure, "Dropping observer");
                    failed.push(id);
                }
            }
        }

        for id in &failed {
            self.inner.observers.remove(id);
        }
        report.dropped = failed.len();

        trace!(
            player = event.player_id,
            delivered = report.delivered,
            dropped = report.dropped,
            "Published draft event"
        );

        report
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.observers.len()
    }

    /// Check whether an observer is registered.
    #[must_use]
    pub fn contains(&self, id: ObserverId) -> bool {
        self.inner.observers.contains_key(&id)
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub")
            .field("observers", &self.observer_count())
            .field("config", &self.inner.config)
            .finish()
    }
}

fn deliver(sender: &EventSender, event: &Arc<DraftEvent>) -> Result<(), DeliveryFailure> {
    sender.try_send(Arc::clone(event)).map_err(|e| match e {
        TrySendError::Full(_) => DeliveryFailure::Lagging,
        TrySendError::Closed(_) => DeliveryFailure::Disconnected,
    })
}

/// A live observer registration.
///
/// Yields events in publish order. Once the hub drops the observer, buffered
/// events are still returned and then [`Subscription::recv`] returns `None`.
pub struct Subscription {
    id: ObserverId,
    receiver: mpsc::Receiver<Arc<DraftEvent>>,
    hub: NotificationHub,
}

impl Subscription {
    /// The observer id.
    #[must_use]
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the observer has been removed from the hub and
    /// its buffer is drained.
    pub async fn recv(&mut self) -> Option<Arc<DraftEvent>> {
        self.receiver.recv().await
    }

    /// Take the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<DraftEvent>> {
        self.receiver.try_recv().ok()
    }

    /// Stop accepting events while keeping the registration.
    ///
    /// This is what a broken transport looks like to the hub: the next
    /// publish fails for this observer and removes it.
    pub fn close(&mut self) {
        self.receiver.close();
    }

    /// Turn the subscription into a stream of events.
    ///
    /// Dropping the stream unsubscribes.
    pub fn into_stream(self) -> impl Stream<Item = Arc<DraftEvent>> + Send + 'static {
        stream::unfold(self, |mut subscription| async move {
            let event = subscription.recv().await?;
            Some((event, subscription))
        })
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[test]
    fn test_subscribe_unsubscribe() {
        let hub = NotificationHub::new();

        let sub1 = hub.subscribe();
        let sub2 = hub.subscribe();
        assert_ne!(sub1.id(), sub2.id());
        assert_eq!(hub.observer_count(), 2);

        assert!(hub.unsubscribe(sub1.id()));
        assert!(!hub.contains(sub1.id()));
        assert_eq!(hub.observer_count(), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let hub = NotificationHub::new();
        let sub = hub.subscribe();
        let other = hub.subscribe();

        assert!(hub.unsubscribe(sub.id()));
        assert!(!hub.unsubscribe(sub.id()));
        assert!(!hub.unsubscribe(ObserverId(12_345)));

        assert!(hub.contains(other.id()));
        assert_eq!(hub.observer_count(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub = NotificationHub::new();
        let sub = hub.subscribe();
        let id = sub.id();

        drop(sub);
        assert!(!hub.contains(id));
        assert_eq!(hub.observer_count(), 0);
    }

    #[test]
    fn test_publish_fans_out_to_all() {
        let hub = NotificationHub::new();
        let mut subs: Vec<_> = (0..5).map(|_| hub.subscribe()).collect();

        let report = hub.publish(&DraftEvent::new(2, 1));
        assert_eq!(report, PublishReport { delivered: 5, dropped: 0 });

        for sub in &mut subs {
            assert_eq!(sub.try_recv().as_deref(), Some(&DraftEvent::new(2, 1)));
            assert!(sub.try_recv().is_none());
        }
    }

    #[test]
    fn test_late_subscriber_gets_no_history() {
        let hub = NotificationHub::new();
        let mut early = hub.subscribe();

        hub.publish(&DraftEvent::new(1, 1));
        let mut late = hub.subscribe();

        assert!(early.try_recv().is_some());
        assert!(late.try_recv().is_none());
    }

    #[test]
    fn test_publish_preserves_order_per_observer() {
        let hub = NotificationHub::new();
        let mut sub = hub.subscribe();

        for seq in 1..=10 {
            hub.publish(&DraftEvent::new(seq * 7, seq));
        }

        let seen: Vec<_> = std::iter::from_fn(|| sub.try_recv())
            .map(|e| e.sequence)
            .collect();
        assert_eq!(seen, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_broken_observer_is_removed() {
        let hub = NotificationHub::new();
        let mut healthy = hub.subscribe();
        let mut broken = hub.subscribe();
        broken.close();

        let report = hub.publish(&DraftEvent::new(3, 1));
        assert_eq!(report, PublishReport { delivered: 1, dropped: 1 });
        assert!(!hub.contains(broken.id()));
        assert!(hub.contains(healthy.id()));
        assert!(healthy.try_recv().is_some());

        // Nothing left to drop on the next pass.
        let report = hub.publish(&DraftEvent::new(4, 2));
        assert_eq!(report, PublishReport { delivered: 1, dropped: 0 });
    }

    #[test]
    fn test_lagging_observer_is_evicted() {
        let hub = NotificationHub::with_config(HubConfig { observer_buffer: 2 });
        let mut slow = hub.subscribe();
        let mut fast = hub.subscribe();

        hub.publish(&DraftEvent::new(1, 1));
        assert!(fast.try_recv().is_some());
        hub.publish(&DraftEvent::new(2, 2));
        assert!(fast.try_recv().is_some());

        let report = hub.publish(&DraftEvent::new(3, 3));
        assert_eq!(report, PublishReport { delivered: 1, dropped: 1 });
        assert!(!hub.contains(slow.id()));
        assert!(hub.contains(fast.id()));

        // The evicted observer still drains what was buffered.
        assert_eq!(slow.try_recv().map(|e| e.sequence), Some(1));
        assert_eq!(slow.try_recv().map(|e| e.sequence), Some(2));
        assert!(slow.try_recv().is_none());
    }

    #[test]
    fn test_publish_without_observers() {
        let hub = NotificationHub::new();
        assert_eq!(hub.publish(&DraftEvent::new(1, 1)), PublishReport::default());
    }

    #[tokio::test]
    async fn test_recv_ends_after_eviction() {
        let hub = NotificationHub::with_config(HubConfig { observer_buffer: 1 });
        let mut sub = hub.subscribe();

        hub.publish(&DraftEvent::new(1, 1));
        hub.publish(&DraftEvent::new(2, 2));

        assert_eq!(sub.recv().await.map(|e| e.player_id), Some(1));
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_unsubscribes_on_drop() {
        let hub = NotificationHub::new();
        let sub = hub.subscribe();
        let id = sub.id();

        let mut stream = Box::pin(sub.into_stream());
        hub.publish(&DraftEvent::new(5, 1));
        assert_eq!(stream.next().await.map(|e| e.player_id), Some(5));

        drop(stream);
        assert!(!hub.contains(id));
    }

    #[tokio::test]
    async fn test_concurrent_subscribe_and_publish() {
        let hub = NotificationHub::new();

        let mut handles = Vec::new();
        for i in 0..32u64 {
            let hub = hub.clone();
            handles.push(tokio::spawn(async move {
                let sub = hub.subscribe();
                hub.publish(&DraftEvent::new(i, i + 1));
                drop(sub);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(hub.observer_count(), 0);
    }
}
