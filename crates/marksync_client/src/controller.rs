//! Reconciling list controller.
//!
//! Owns the signed-in user's bookmark list and merges the server snapshot,
//! the user's own adds and deletes, and change feed events into it.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::list::BookmarkList;
use crate::live::{bump, LiveIndicator};
use crate::remote::{ChangeFeed, RecordStore};
use crate::subscriber::FeedSubscription;
use marksync_model::{Bookmark, BookmarkId, ChangeEvent, ChangeKind, NewBookmark, OwnerFilter, OwnerId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// How a mutation reaches the local list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStyle {
    /// The list changes only after the store confirms.
    Confirmed,
    /// The list changes first; a store failure rolls it back.
    Optimistic,
}

/// Result of a successful [`BookmarkController::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The created record was prepended.
    Inserted(Bookmark),
    /// The record was already in the list (the feed delivered it first).
    AlreadyPresent(BookmarkId),
    /// The controller was unmounted before the store answered.
    Discarded,
}

/// Point-in-time copy of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    /// Bookmarks in display order.
    pub bookmarks: Vec<Bookmark>,
    /// Pending error message, if any.
    pub error: Option<String>,
    /// True while an add is waiting on the store.
    pub adding: bool,
    /// Bookmark whose delete is waiting on the store.
    pub deleting: Option<BookmarkId>,
    /// True while the live indicator is lit.
    pub live: bool,
    /// Current URL form input.
    pub url_input: String,
    /// Current title form input.
    pub title_input: String,
}

#[derive(Debug, Default)]
struct ControllerState {
    list: BookmarkList,
    error: Option<String>,
    adding: bool,
    deleting: Option<BookmarkId>,
    url_input: String,
    title_input: String,
}

struct Shared {
    owner: OwnerId,
    store: Arc<dyn RecordStore>,
    state: Mutex<ControllerState>,
    live: LiveIndicator,
    revision: Arc<watch::Sender<u64>>,
    mounted: AtomicBool,
    subscription: Mutex<Option<FeedSubscription>>,
}

impl Shared {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn update<R>(&self, f: impl FnOnce(&mut ControllerState) -> R) -> R {
        let result = f(&mut self.state.lock());
        bump(&self.revision);
        result
    }

    fn apply_remote(&self, event: ChangeEvent) {
        self.live.flash();

        let id = event.record.id;
        match event.kind {
            ChangeKind::Insert => {
                if event.record.owner != self.owner {
                    warn!(bookmark_id = %id, "ignoring insert event for another owner");
                    return;
                }
                let inserted = self.update(|state| state.list.prepend_if_absent(event.record));
                debug!(bookmark_id = %id, inserted, "remote insert");
            }
            ChangeKind::Delete => {
                let removed = self.update(|state| state.list.remove(id).is_some());
                debug!(bookmark_id = %id, removed, "remote delete");
            }
        }
    }
}

async fn forward_events(shared: Weak<Shared>, mut events: UnboundedReceiver<ChangeEvent>) {
    while let Some(event) = events.recv().await {
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !shared.is_mounted() {
            break;
        }
        shared.apply_remote(event);
    }
    debug!("change feed forwarder stopped");
}

/// The reconciling list controller.
///
/// One instance per mounted dashboard. Cloning yields another handle to the
/// same controller; the feed subscription is released when the controller
/// is [unmounted](Self::unmount) or the last handle is dropped.
///
/// State locks are never held across an `.await`, so operations interleave
/// only at store calls, the same way UI event handlers would.
#[derive(Clone)]
pub struct BookmarkController {
    shared: Arc<Shared>,
}

impl BookmarkController {
    /// Adds are not optimistic: a record enters the list only after the
    /// store confirms it, or when the feed reports it.
    pub const ADD_STYLE: MutationStyle = MutationStyle::Confirmed;

    /// Deletes are optimistic: the record leaves the list before the store
    /// is asked, and comes back if the store refuses.
    pub const DELETE_STYLE: MutationStyle = MutationStyle::Optimistic;

    /// Mounts a controller for `owner`, seeded with `snapshot`.
    ///
    /// Subscribes to the owner's change feed and starts forwarding events.
    /// Must be called inside a tokio runtime.
    pub fn mount(
        owner: OwnerId,
        snapshot: Vec<Bookmark>,
        store: Arc<dyn RecordStore>,
        feed: Arc<dyn ChangeFeed>,
        config: ClientConfig,
    ) -> ClientResult<Self> {
        let (mut subscription, events) =
            FeedSubscription::open(feed, &config.channel_name, OwnerFilter::new(owner))?;
        // From here on, an early return drops `subscription`, which unsubscribes.
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ClientError::NoRuntime)?;

        let (revision, _) = watch::channel(0u64);
        let revision = Arc::new(revision);
        let count = snapshot.len();

        let shared = Arc::new(Shared {
            owner,
            store,
            state: Mutex::new(ControllerState {
                list: BookmarkList::from_snapshot(snapshot),
                ..Default::default()
            }),
            live: LiveIndicator::new(config.live_indicator_ttl, Arc::clone(&revision)),
            revision,
            mounted: AtomicBool::new(true),
            subscription: Mutex::new(None),
        });

        subscription.attach(runtime.spawn(forward_events(Arc::downgrade(&shared), events)));
        *shared.subscription.lock() = Some(subscription);

        info!(%owner, bookmarks = count, "bookmark controller mounted");
        Ok(Self { shared })
    }

    /// Owner whose bookmarks this controller manages.
    pub fn owner(&self) -> OwnerId {
        self.shared.owner
    }

    /// Returns true until [`unmount`](Self::unmount) is called.
    pub fn is_mounted(&self) -> bool {
        self.shared.is_mounted()
    }

    /// Releases the feed subscription and stops applying results.
    ///
    /// Store calls already in flight run to completion, but their results
    /// are discarded.
    pub fn unmount(&self) {
        if !self.shared.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(subscription) = self.shared.subscription.lock().take() {
            subscription.release();
        }
        self.shared.live.cancel();
        info!(owner = %self.shared.owner, "bookmark controller unmounted");
    }

    /// Validates input, creates the bookmark remotely, and prepends it.
    ///
    /// Validation failures set the pending error and never reach the store.
    /// Store failures set the pending error to the store's message and leave
    /// the list untouched. On success the form inputs are cleared.
    pub async fn add(&self, url: &str, title: &str) -> ClientResult<AddOutcome> {
        let shared = &self.shared;
        shared.update(|state| state.error = None);

        let new = match NewBookmark::from_input(shared.owner, url, title) {
            Ok(new) => new,
            Err(err) => {
                debug!(%err, "add rejected locally");
                shared.update(|state| state.error = Some(err.to_string()));
                return Err(err.into());
            }
        };

        shared.update(|state| state.adding = true);
        debug!(url = %new.url, title = %new.title, "creating bookmark");
        let result = shared.store.create(new).await;

        if !shared.is_mounted() {
            debug!("add finished after unmount, result discarded");
            return Ok(AddOutcome::Discarded);
        }

        match result {
            Ok(record) => {
                let id = record.id;
                let inserted = shared.update(|state| {
                    state.adding = false;
                    state.url_input.clear();
                    state.title_input.clear();
                    state.list.prepend_if_absent(record.clone())
                });
                if inserted {
                    info!(bookmark_id = %id, "bookmark added");
                    Ok(AddOutcome::Inserted(record))
                } else {
                    debug!(bookmark_id = %id, "bookmark already delivered by feed");
                    Ok(AddOutcome::AlreadyPresent(id))
                }
            }
            Err(err) => {
                warn!(%err, "create failed");
                shared.update(|state| {
                    state.adding = false;
                    state.error = Some(err.message().to_string());
                });
                Err(err.into())
            }
        }
    }

    /// Submits the current form inputs, like pressing the save button.
    ///
    /// Returns `None` without doing anything while an add is in flight.
    pub async fn submit(&self) -> Option<ClientResult<AddOutcome>> {
        let (url, title) = {
            let state = self.shared.state.lock();
            if state.adding {
                return None;
            }
            (state.url_input.clone(), state.title_input.clone())
        };
        Some(self.add(&url, &title).await)
    }

    /// Removes the bookmark locally, then deletes it remotely.
    ///
    /// If the store refuses, the record is fetched again and, if it still
    /// exists, re-inserted at the front of the list (not at its old
    /// position), and the store's message becomes the pending error.
    pub async fn delete(&self, id: BookmarkId) -> ClientResult<()> {
        let shared = &self.shared;
        let removed = shared.update(|state| {
            state.deleting = Some(id);
            state.list.remove(id).is_some()
        });
        debug!(bookmark_id = %id, removed, "deleting bookmark");

        let result = shared.store.delete(id).await;

        if !shared.is_mounted() {
            debug!(bookmark_id = %id, "delete finished after unmount, result discarded");
            return result.map_err(Into::into);
        }

        shared.update(|state| {
            if state.deleting == Some(id) {
                state.deleting = None;
            }
        });

        let err = match result {
            Ok(()) => {
                info!(bookmark_id = %id, "bookmark deleted");
                return Ok(());
            }
            Err(err) => err,
        };
        warn!(bookmark_id = %id, %err, "delete failed, rolling back");

        let restored = match shared.store.fetch_one(id).await {
            Ok(record) => record,
            Err(fetch_err) => {
                warn!(bookmark_id = %id, err = %fetch_err, "rollback fetch failed");
                None
            }
        };

        if !shared.is_mounted() {
            return Err(err.into());
        }

        shared.update(|state| {
            if let Some(record) = restored.filter(|r| r.owner == shared.owner) {
                state.list.prepend_if_absent(record);
            }
            state.error = Some(err.message().to_string());
        });
        Err(err.into())
    }

    /// Applies a change feed event.
    ///
    /// Inserts are prepended unless the id is already present; deletes remove
    /// the id whoever initiated them. Every event flashes the live indicator.
    pub fn on_remote_change(&self, event: ChangeEvent) {
        if !self.shared.is_mounted() {
            return;
        }
        self.shared.apply_remote(event);
    }

    /// Sets the URL form input.
    pub fn set_url_input(&self, value: impl Into<String>) {
        let value = value.into();
        self.shared.update(|state| state.url_input = value);
    }

    /// Sets the title form input.
    pub fn set_title_input(&self, value: impl Into<String>) {
        let value = value.into();
        self.shared.update(|state| state.title_input = value);
    }

    /// Clears the pending error.
    pub fn dismiss_error(&self) {
        self.shared.update(|state| state.error = None);
    }

    /// Pending error message.
    pub fn error(&self) -> Option<String> {
        self.shared.state.lock().error.clone()
    }

    /// Bookmarks in display order.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.shared.state.lock().list.as_slice().to_vec()
    }

    /// Bookmark ids in display order.
    pub fn ids(&self) -> Vec<BookmarkId> {
        self.shared.state.lock().list.ids()
    }

    /// True while an add is waiting on the store.
    pub fn is_adding(&self) -> bool {
        self.shared.state.lock().adding
    }

    /// Bookmark whose delete is waiting on the store.
    pub fn deleting(&self) -> Option<BookmarkId> {
        self.shared.state.lock().deleting
    }

    /// True while the live indicator is lit.
    pub fn is_live(&self) -> bool {
        self.shared.live.is_lit()
    }

    /// Copies the current state for rendering.
    pub fn snapshot(&self) -> ControllerSnapshot {
        let state = self.shared.state.lock();
        ControllerSnapshot {
            bookmarks: state.list.as_slice().to_vec(),
            error: state.error.clone(),
            adding: state.adding,
            deleting: state.deleting,
            live: self.shared.live.is_lit(),
            url_input: state.url_input.clone(),
            title_input: state.title_input.clone(),
        }
    }

    /// Returns a receiver that changes whenever the state changes.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }
}
