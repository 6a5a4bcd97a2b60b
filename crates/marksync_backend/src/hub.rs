//! Change hub distributing committed writes to filtered subscribers.

use marksync_client::{ChangeFeed, FeedError, FeedResult, SubscriptionHandle};
use marksync_model::{ChangeEvent, OwnerFilter};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

struct Subscriber {
    handle: SubscriptionHandle,
    channel: String,
    filter: OwnerFilter,
    sink: UnboundedSender<ChangeEvent>,
}

/// A change feed that distributes committed writes to subscribers.
///
/// The hub:
/// - Emits only committed writes
/// - Preserves commit order per subscriber
/// - Delivers each event only to subscribers whose owner filter matches
/// - Drops subscribers whose receiving end has gone away
pub struct ChangeHub {
    subscribers: RwLock<Vec<Subscriber>>,
    next_handle: AtomicU64,
    refuse_next: Mutex<Option<String>>,
}

impl ChangeHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_handle: AtomicU64::new(1),
            refuse_next: Mutex::new(None),
        }
    }

    /// Emits an event to every matching subscriber.
    ///
    /// Returns the number of subscribers it was delivered to.
    pub fn emit(&self, event: &ChangeEvent) -> usize {
        let mut delivered = 0;
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|sub| {
            if !sub.filter.matches(&event.record) {
                return true;
            }
            match sub.sink.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    debug!(handle = ?sub.handle, channel = %sub.channel, "dropping closed subscriber");
                    false
                }
            }
        });
        trace!(kind = ?event.kind, bookmark_id = %event.record.id, delivered, "change emitted");
        delivered
    }

    /// Makes the next `subscribe` call fail with `message`.
    pub fn fail_next_subscribe(&self, message: impl Into<String>) {
        *self.refuse_next.lock() = Some(message.into());
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed for ChangeHub {
    fn subscribe(
        &self,
        channel: &str,
        filter: &OwnerFilter,
        sink: UnboundedSender<ChangeEvent>,
    ) -> FeedResult<SubscriptionHandle> {
        if let Some(message) = self.refuse_next.lock().take() {
            return Err(FeedError::SubscribeFailed(message));
        }

        let handle = SubscriptionHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.subscribers.write().push(Subscriber {
            handle,
            channel: channel.to_string(),
            filter: *filter,
            sink,
        });
        debug!(?handle, channel, owner = %filter.owner, "subscriber added");
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|sub| sub.handle != handle);
        if subscribers.len() < before {
            debug!(?handle, "subscriber removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use marksync_model::{Bookmark, BookmarkId, OwnerId};
    use tokio::sync::mpsc;

    fn record(owner: OwnerId, id: u128) -> Bookmark {
        Bookmark {
            id: BookmarkId::from_u128(id),
            owner,
            url: "https://example.com".into(),
            title: "example.com".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn delivers_only_to_matching_owner() {
        let hub = ChangeHub::new();
        let alice = OwnerId::from_u128(1);
        let bob = OwnerId::from_u128(2);

        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        hub.subscribe("tab", &OwnerFilter::new(alice), tx_a).unwrap();
        hub.subscribe("tab", &OwnerFilter::new(bob), tx_b).unwrap();

        let event = ChangeEvent::insert(record(alice, 1));
        assert_eq!(hub.emit(&event), 1);

        assert_eq!(rx_a.try_recv().unwrap(), event);
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn preserves_emit_order() {
        let hub = ChangeHub::new();
        let owner = OwnerId::from_u128(1);
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.subscribe("tab", &OwnerFilter::new(owner), tx).unwrap();

        for id in 1..=5 {
            hub.emit(&ChangeEvent::insert(record(owner, id)));
        }

        let received: Vec<u128> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.record.id.as_uuid().as_u128())
            .collect();
        assert_eq!(received, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn unsubscribe_and_cleanup() {
        let hub = ChangeHub::new();
        let owner = OwnerId::from_u128(1);

        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = hub.subscribe("tab", &OwnerFilter::new(owner), tx).unwrap();
        assert_eq!(hub.subscriber_count(), 1);
        hub.unsubscribe(handle);
        assert_eq!(hub.subscriber_count(), 0);

        // Dropped receivers are pruned on the next matching emit.
        let (tx, rx) = mpsc::unbounded_channel();
        hub.subscribe("tab", &OwnerFilter::new(owner), tx).unwrap();
        drop(rx);
        hub.emit(&ChangeEvent::insert(record(owner, 1)));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn injected_subscribe_failure() {
        let hub = ChangeHub::new();
        hub.fail_next_subscribe("realtime unavailable");

        let (tx, _rx) = mpsc::unbounded_channel();
        let filter = OwnerFilter::new(OwnerId::from_u128(1));
        assert_eq!(
            hub.subscribe("tab", &filter, tx.clone()),
            Err(FeedError::SubscribeFailed("realtime unavailable".into()))
        );
        assert!(hub.subscribe("tab", &filter, tx).is_ok());
    }
}
