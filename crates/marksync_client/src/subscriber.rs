//! Change feed subscription owned by a mounted controller.

use crate::error::FeedResult;
use crate::remote::{ChangeFeed, SubscriptionHandle};
use marksync_model::{ChangeEvent, OwnerFilter};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::debug;

/// A live subscription to the change feed.
///
/// Acquired when a controller mounts and released exactly once: on
/// [`release`](Self::release), or on drop. Dropping also aborts the task
/// forwarding events to the controller, so a guard that goes out of scope
/// during a failed setup leaves nothing behind.
pub struct FeedSubscription {
    feed: Arc<dyn ChangeFeed>,
    handle: Option<SubscriptionHandle>,
    forwarder: Option<JoinHandle<()>>,
}

impl FeedSubscription {
    /// Subscribes to `filter` on `channel`.
    ///
    /// Returns the guard and the receiving end of the event stream. Events
    /// arriving before anyone reads the receiver are buffered in order.
    pub fn open(
        feed: Arc<dyn ChangeFeed>,
        channel: &str,
        filter: OwnerFilter,
    ) -> FeedResult<(Self, UnboundedReceiver<ChangeEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = feed.subscribe(channel, &filter, tx)?;
        debug!(?handle, channel, owner = %filter.owner, "change feed subscribed");

        Ok((
            Self {
                feed,
                handle: Some(handle),
                forwarder: None,
            },
            rx,
        ))
    }

    /// Attaches the task that forwards events to the controller.
    pub fn attach(&mut self, forwarder: JoinHandle<()>) {
        if let Some(previous) = self.forwarder.replace(forwarder) {
            previous.abort();
        }
    }

    /// Returns the feed handle, or `None` once released.
    pub fn handle(&self) -> Option<SubscriptionHandle> {
        self.handle
    }

    /// Unsubscribes now instead of waiting for drop.
    pub fn release(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        if let Some(handle) = self.handle.take() {
            self.feed.unsubscribe(handle);
            debug!(?handle, "change feed unsubscribed");
        }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.teardown();
    }
}
