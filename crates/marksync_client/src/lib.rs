//! # marksync client
//!
//! Live-syncing bookmark list for one signed-in user.
//!
//! This crate provides:
//! - Collaborator traits for the auth provider, record store, and change feed
//! - The session gate deciding between landing and dashboard views
//! - Dashboard loading (session check, snapshot fetch, controller mount)
//! - The reconciling list controller
//! - The change feed subscriber and the live activity indicator
//! - Plain-data view models for the landing and dashboard views
//!
//! ## Reconciliation
//!
//! The controller merges three sources into one ordered list:
//! 1. The server snapshot fetched once at load time (newest first)
//! 2. The user's own adds and deletes
//! 3. Insert/delete events pushed by the change feed
//!
//! ## Key Invariants
//!
//! - A bookmark `id` appears at most once in the list
//! - New entries are prepended; the list is never re-sorted
//! - Deletes are applied locally before the store is asked; adds are not
//! - A failed delete re-inserts the record at the front of the list
//! - Duplicate feed deliveries are harmless
//! - The feed subscription is released when the controller goes away

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod controller;
mod dashboard;
mod error;
mod gate;
mod list;
mod live;
mod remote;
mod subscriber;
mod view;

pub use config::{ClientConfig, GateConfig};
pub use controller::{AddOutcome, BookmarkController, ControllerSnapshot, MutationStyle};
pub use dashboard::{fetch_snapshot, load_dashboard, Dashboard, DashboardLoad};
pub use error::{
    AuthError, AuthResult, ClientError, ClientResult, FeedError, FeedResult, StoreError,
    StoreResult,
};
pub use gate::{GateDecision, LandingDecision, Route, SessionGate};
pub use list::BookmarkList;
pub use live::LiveIndicator;
pub use remote::{AuthProvider, ChangeFeed, RecordStore, SubscriptionHandle};
pub use subscriber::FeedSubscription;
pub use view::{Avatar, BookmarkRow, FormView, HeaderView, LandingView, ListView};
