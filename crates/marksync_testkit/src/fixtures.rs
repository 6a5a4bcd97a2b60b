//! Test fixtures and session helpers.
//!
//! Provides convenience functions for building bookmarks and users and for
//! wiring the reference backend to a gate and controller.

use chrono::{DateTime, TimeZone, Utc};
use marksync_backend::{BackendConfig, MemoryAuthProvider, MemoryBackend};
use marksync_client::{
    load_dashboard, BookmarkController, ChangeFeed, ClientConfig, Dashboard, DashboardLoad,
    GateConfig, RecordStore, SessionGate,
};
use marksync_model::{Bookmark, BookmarkId, NewBookmark, OwnerId, User};
use std::sync::Arc;
use std::time::Duration;

/// Unix time of the fixture epoch (2026-01-01T00:00:00Z).
pub const FIXTURE_EPOCH: i64 = 1_767_225_600;

const SAMPLE_BOOKMARKS: &str = include_str!("../fixtures/bookmarks.json");

/// Owner id used by [`default_user`].
pub const DEFAULT_OWNER: OwnerId = OwnerId::from_u128(1);

/// The default signed-in user.
pub fn default_user() -> User {
    User::new(DEFAULT_OWNER)
        .with_email("ada@example.com")
        .with_full_name("Ada Lovelace")
}

/// A user with a numbered id and no metadata.
pub fn user(n: u128) -> User {
    User::new(OwnerId::from_u128(n)).with_email(format!("user{n}@example.com"))
}

/// Builder for bookmark fixtures.
#[derive(Debug, Clone)]
pub struct BookmarkBuilder {
    id: BookmarkId,
    owner: OwnerId,
    url: String,
    title: String,
    created_at: DateTime<Utc>,
}

impl BookmarkBuilder {
    /// Starts a bookmark with a numbered id, owned by [`DEFAULT_OWNER`].
    ///
    /// The creation time is `n` seconds after [`FIXTURE_EPOCH`], so higher
    /// numbers are newer.
    pub fn new(n: u128) -> Self {
        Self {
            id: BookmarkId::from_u128(n),
            owner: DEFAULT_OWNER,
            url: format!("https://site{n}.example.com/"),
            title: format!("Site {n}"),
            created_at: at(n as i64),
        }
    }

    /// Sets the owner.
    pub fn owned_by(mut self, owner: OwnerId) -> Self {
        self.owner = owner;
        self
    }

    /// Sets the URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the creation time in seconds after [`FIXTURE_EPOCH`].
    pub fn created(mut self, secs: i64) -> Self {
        self.created_at = at(secs);
        self
    }

    /// Builds the bookmark.
    pub fn build(self) -> Bookmark {
        Bookmark {
            id: self.id,
            owner: self.owner,
            url: self.url,
            title: self.title,
            created_at: self.created_at,
        }
    }
}

/// Shorthand for `BookmarkBuilder::new(n).build()`.
pub fn bookmark(n: u128) -> Bookmark {
    BookmarkBuilder::new(n).build()
}

/// Returns the time `secs` seconds after [`FIXTURE_EPOCH`].
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(FIXTURE_EPOCH + secs, 0)
        .single()
        .expect("fixture timestamp out of range")
}

/// Numeric ids of `bookmarks`, in order.
pub fn numeric_ids(bookmarks: &[Bookmark]) -> Vec<u128> {
    bookmarks.iter().map(|b| b.id.as_uuid().as_u128()).collect()
}

/// Parses a JSON array of bookmark rows.
pub fn load_bookmarks(json: &str) -> serde_json::Result<Vec<Bookmark>> {
    serde_json::from_str(json)
}

/// The bundled sample snapshot: three rows for [`DEFAULT_OWNER`], newest first.
pub fn sample_snapshot() -> Vec<Bookmark> {
    load_bookmarks(SAMPLE_BOOKMARKS).expect("bundled fixture must parse")
}

/// Waits until `cond` holds for `controller`, re-checking on every state change.
///
/// Panics if the condition does not hold within five seconds.
pub async fn wait_until(
    controller: &BookmarkController,
    mut cond: impl FnMut(&BookmarkController) -> bool,
) {
    let mut revisions = controller.watch();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond(controller) {
            revisions
                .changed()
                .await
                .expect("controller state channel closed");
        }
    })
    .await
    .expect("condition not reached before timeout");
}

/// A reference backend plus one browser tab's view of it.
pub struct TestSession {
    /// The shared bookmark table.
    pub backend: MemoryBackend,
    /// The auth provider holding the session.
    pub auth: Arc<MemoryAuthProvider>,
    /// Gate over `auth`.
    pub gate: SessionGate,
    /// The user this tab acts as.
    pub user: User,
}

impl TestSession {
    /// A session signed in as [`default_user`].
    pub fn signed_in() -> Self {
        let session = Self::signed_out();
        session.auth.sign_in_as(session.user.clone());
        session
    }

    /// A session for [`default_user`] with nobody signed in.
    pub fn signed_out() -> Self {
        Self::with_backend(MemoryBackend::default(), default_user())
    }

    /// A session for `user` over an existing backend, not yet signed in.
    pub fn with_backend(backend: MemoryBackend, user: User) -> Self {
        let auth = Arc::new(MemoryAuthProvider::new(&BackendConfig::default()));
        let gate = SessionGate::new(auth.clone(), GateConfig::default());
        Self {
            backend,
            auth,
            gate,
            user,
        }
    }

    /// Opens another tab on the same backend and session.
    pub fn open_tab(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            auth: Arc::clone(&self.auth),
            gate: SessionGate::new(self.auth.clone(), GateConfig::default()),
            user: self.user.clone(),
        }
    }

    /// Owner id of this tab's user.
    pub fn owner(&self) -> OwnerId {
        self.user.id
    }

    /// Record store scoped to this tab's user.
    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::new(self.backend.store_for(self.owner()))
    }

    /// The backend's change feed.
    pub fn feed(&self) -> Arc<dyn ChangeFeed> {
        self.backend.hub()
    }

    /// Client config used when mounting.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
    }

    /// Runs the dashboard load for this tab.
    pub async fn load(&self) -> DashboardLoad {
        load_dashboard(&self.gate, self.store(), self.feed(), self.client_config())
            .await
            .expect("dashboard load failed")
    }

    /// Loads the dashboard, panicking on a redirect.
    pub async fn dashboard(&self) -> Dashboard {
        match self.load().await {
            DashboardLoad::Ready(dashboard) => dashboard,
            DashboardLoad::Redirect(route) => {
                panic!("expected dashboard, redirected to {}", route.path())
            }
        }
    }

    /// Mounts a controller directly, skipping the gate.
    pub fn mount(&self, snapshot: Vec<Bookmark>) -> BookmarkController {
        BookmarkController::mount(
            self.owner(),
            snapshot,
            self.store(),
            self.feed(),
            self.client_config(),
        )
        .expect("controller mount failed")
    }

    /// Inserts a row for this tab's user as some other client would.
    pub fn seed(&self, url: &str, title: &str) -> Bookmark {
        let new = NewBookmark::from_input(self.owner(), url, title).expect("seed url must be valid");
        self.backend.insert_remote(new)
    }
}
