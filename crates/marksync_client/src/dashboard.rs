//! Dashboard loading: session check, snapshot fetch, controller mount.

use crate::config::ClientConfig;
use crate::controller::BookmarkController;
use crate::error::ClientResult;
use crate::gate::{GateDecision, Route, SessionGate};
use crate::remote::{ChangeFeed, RecordStore};
use crate::view::{HeaderView, ListView};
use marksync_model::{Bookmark, OwnerFilter, OwnerId, User};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of loading the dashboard.
pub enum DashboardLoad {
    /// The dashboard is ready to render.
    Ready(Dashboard),
    /// The visitor must be sent elsewhere.
    Redirect(Route),
}

/// A loaded dashboard: the signed-in user and their mounted controller.
pub struct Dashboard {
    user: User,
    controller: BookmarkController,
}

impl Dashboard {
    /// The signed-in user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// The bookmark controller.
    pub fn controller(&self) -> &BookmarkController {
        &self.controller
    }

    /// Header view for the signed-in user.
    pub fn header(&self) -> HeaderView {
        HeaderView::for_user(&self.user)
    }

    /// Current bookmark panel.
    pub fn list(&self) -> ListView {
        ListView::from_snapshot(&self.controller.snapshot())
    }
}

/// Fetches the owner's bookmarks once, newest first.
///
/// A failed fetch renders as an empty list rather than an error page; the
/// change feed and later actions still work.
pub async fn fetch_snapshot(store: &dyn RecordStore, owner: OwnerId) -> Vec<Bookmark> {
    match store.fetch_all(&OwnerFilter::new(owner)).await {
        Ok(bookmarks) => {
            debug!(%owner, count = bookmarks.len(), "snapshot fetched");
            bookmarks
        }
        Err(err) => {
            warn!(%owner, %err, "snapshot fetch failed, starting empty");
            Vec::new()
        }
    }
}

/// Loads the dashboard for the current session.
pub async fn load_dashboard(
    gate: &SessionGate,
    store: Arc<dyn RecordStore>,
    feed: Arc<dyn ChangeFeed>,
    config: ClientConfig,
) -> ClientResult<DashboardLoad> {
    let user = match gate.guard_dashboard().await {
        GateDecision::Render(user) => user,
        GateDecision::Redirect(route) => return Ok(DashboardLoad::Redirect(route)),
    };

    let snapshot = fetch_snapshot(store.as_ref(), user.id).await;
    let controller = BookmarkController::mount(user.id, snapshot, store, feed, config)?;

    Ok(DashboardLoad::Ready(Dashboard { user, controller }))
}
