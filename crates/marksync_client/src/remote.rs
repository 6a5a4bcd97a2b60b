//! Collaborator interfaces consumed by the client.
//!
//! These traits abstract the managed backend, allowing different
//! implementations (a hosted platform, the in-memory reference backend,
//! test doubles).

use crate::error::{AuthResult, FeedResult, StoreResult};
use async_trait::async_trait;
use marksync_model::{Bookmark, BookmarkId, ChangeEvent, NewBookmark, OwnerFilter, User};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// The auth provider owns the session; the client never caches it.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the user behind the current session, if any.
    async fn current_user(&self) -> AuthResult<Option<User>>;

    /// Starts an OAuth hand-off and returns the URL to redirect the browser to.
    async fn begin_oauth_redirect(
        &self,
        provider: &str,
        return_url: &str,
        params: &[(String, String)],
    ) -> AuthResult<String>;

    /// Ends the current session.
    async fn sign_out(&self) -> AuthResult<()>;
}

/// Remote storage for bookmark rows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetches every record matching the filter, newest first.
    async fn fetch_all(&self, filter: &OwnerFilter) -> StoreResult<Vec<Bookmark>>;

    /// Creates a record and returns it with its server-assigned fields.
    async fn create(&self, new: NewBookmark) -> StoreResult<Bookmark>;

    /// Deletes a record.
    async fn delete(&self, id: BookmarkId) -> StoreResult<()>;

    /// Fetches a single record.
    async fn fetch_one(&self, id: BookmarkId) -> StoreResult<Option<Bookmark>>;
}

/// Push-based stream of insert/delete events.
///
/// Delivery is at-least-once with no reordering inside one subscription.
/// Registration is synchronous so it can be undone from `Drop`.
pub trait ChangeFeed: Send + Sync {
    /// Registers `sink` to receive events matching `filter`.
    fn subscribe(
        &self,
        channel: &str,
        filter: &OwnerFilter,
        sink: UnboundedSender<ChangeEvent>,
    ) -> FeedResult<SubscriptionHandle>;

    /// Removes a subscription. Unknown handles are ignored.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}

/// Opaque handle identifying one feed subscription.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Creates a handle from a feed-assigned number.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the feed-assigned number.
    pub const fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionHandle({})", self.0)
    }
}
