//! In-memory bookmark table and owner-scoped stores.

use crate::config::BackendConfig;
use crate::hub::ChangeHub;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marksync_client::{RecordStore, StoreError, StoreResult};
use marksync_model::{Bookmark, BookmarkId, ChangeEvent, NewBookmark, OwnerFilter, OwnerId};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info};

const RLS_VIOLATION: &str = "new row violates row-level security policy for table \"bookmarks\"";

#[derive(Default)]
struct Faults {
    fetch_all: Option<String>,
    create: Option<String>,
    delete: Option<String>,
}

struct BackendInner {
    rows: RwLock<Vec<Bookmark>>,
    hub: Arc<ChangeHub>,
    clock: Mutex<DateTime<Utc>>,
    step: chrono::Duration,
    faults: Mutex<Faults>,
}

impl BackendInner {
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut clock = self.clock.lock();
        let now = *clock;
        *clock = now + self.step;
        now
    }

    // Emitting under the `rows` write lock keeps feed order equal to commit order.
    fn commit_insert(&self, new: NewBookmark) -> Bookmark {
        let mut rows = self.rows.write();
        let record = new.into_bookmark(BookmarkId::new(), self.next_timestamp());
        rows.push(record.clone());
        self.hub.emit(&ChangeEvent::insert(record.clone()));
        record
    }

    fn commit_delete(&self, owner: OwnerId, id: BookmarkId) -> Option<Bookmark> {
        let mut rows = self.rows.write();
        let position = rows.iter().position(|r| r.id == id && r.owner == owner)?;
        let removed = rows.remove(position);
        self.hub.emit(&ChangeEvent::delete(removed.clone()));
        Some(removed)
    }

    fn rows_for(&self, owner: OwnerId) -> Vec<Bookmark> {
        let mut rows: Vec<Bookmark> = self
            .rows
            .read()
            .iter()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

/// The bookmark table shared by every session.
///
/// Cloning yields another handle to the same table.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<BackendInner>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new(config: BackendConfig) -> Self {
        let step = chrono::Duration::from_std(config.clock_step)
            .unwrap_or_else(|_| chrono::Duration::seconds(1));
        Self {
            inner: Arc::new(BackendInner {
                rows: RwLock::new(Vec::new()),
                hub: Arc::new(ChangeHub::new()),
                clock: Mutex::new(config.clock_start),
                step,
                faults: Mutex::new(Faults::default()),
            }),
        }
    }

    /// The change hub fed by this table.
    pub fn hub(&self) -> Arc<ChangeHub> {
        Arc::clone(&self.inner.hub)
    }

    /// Returns a store that can only see and touch `owner`'s rows.
    pub fn store_for(&self, owner: OwnerId) -> ScopedStore {
        ScopedStore {
            owner,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Inserts a row as another client would, emitting the insert event.
    pub fn insert_remote(&self, new: NewBookmark) -> Bookmark {
        let record = self.inner.commit_insert(new);
        debug!(bookmark_id = %record.id, owner = %record.owner, "remote insert");
        record
    }

    /// Deletes a row as another client would, emitting the delete event.
    pub fn delete_remote(&self, owner: OwnerId, id: BookmarkId) -> Option<Bookmark> {
        self.inner.commit_delete(owner, id)
    }

    /// Returns `owner`'s rows, newest first.
    pub fn rows_for(&self, owner: OwnerId) -> Vec<Bookmark> {
        self.inner.rows_for(owner)
    }

    /// Total number of rows across all owners.
    pub fn row_count(&self) -> usize {
        self.inner.rows.read().len()
    }

    /// Makes the next `fetch_all` fail with `message`.
    pub fn fail_next_fetch_all(&self, message: impl Into<String>) {
        self.inner.faults.lock().fetch_all = Some(message.into());
    }

    /// Makes the next `create` fail with `message`.
    pub fn fail_next_create(&self, message: impl Into<String>) {
        self.inner.faults.lock().create = Some(message.into());
    }

    /// Makes the next `delete` fail with `message`. The row is kept.
    pub fn fail_next_delete(&self, message: impl Into<String>) {
        self.inner.faults.lock().delete = Some(message.into());
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

/// A record store bound to one owner.
///
/// Mirrors row-level security: rows of other owners are invisible, creating
/// a row for another owner is rejected, and deleting a row that is not
/// visible affects nothing and succeeds.
#[derive(Clone)]
pub struct ScopedStore {
    owner: OwnerId,
    inner: Arc<BackendInner>,
}

impl ScopedStore {
    /// Owner this store is bound to.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }
}

#[async_trait]
impl RecordStore for ScopedStore {
    async fn fetch_all(&self, filter: &OwnerFilter) -> StoreResult<Vec<Bookmark>> {
        if let Some(message) = self.inner.faults.lock().fetch_all.take() {
            return Err(StoreError::Unavailable(message));
        }
        if filter.owner != self.owner {
            return Ok(Vec::new());
        }
        Ok(self.inner.rows_for(self.owner))
    }

    async fn create(&self, new: NewBookmark) -> StoreResult<Bookmark> {
        if let Some(message) = self.inner.faults.lock().create.take() {
            return Err(StoreError::Rejected(message));
        }
        if new.owner != self.owner {
            return Err(StoreError::rejected(RLS_VIOLATION));
        }
        let record = self.inner.commit_insert(new);
        info!(bookmark_id = %record.id, owner = %self.owner, "row created");
        Ok(record)
    }

    async fn delete(&self, id: BookmarkId) -> StoreResult<()> {
        if let Some(message) = self.inner.faults.lock().delete.take() {
            return Err(StoreError::Rejected(message));
        }
        match self.inner.commit_delete(self.owner, id) {
            Some(_) => info!(bookmark_id = %id, owner = %self.owner, "row deleted"),
            None => debug!(bookmark_id = %id, owner = %self.owner, "delete matched no rows"),
        }
        Ok(())
    }

    async fn fetch_one(&self, id: BookmarkId) -> StoreResult<Option<Bookmark>> {
        Ok(self
            .inner
            .rows
            .read()
            .iter()
            .find(|r| r.id == id && r.owner == self.owner)
            .cloned())
    }
}
