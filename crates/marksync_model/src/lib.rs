//! # marksync model
//!
//! Data model shared by every marksync crate.
//!
//! This crate provides:
//! - `Bookmark`, the only persisted entity, and its identifiers
//! - `User` as reported by the auth provider
//! - URL validation and title/domain derivation
//! - Change events delivered by the live change feed
//!
//! This is a pure model crate with no I/O operations.
//!
//! ## Key Invariants
//!
//! - A bookmark `id` is server-assigned and never changes
//! - Every bookmark belongs to exactly one owner
//! - Bookmark URLs always use the `http` or `https` scheme

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bookmark;
mod change;
mod error;
mod id;
mod link;
mod user;

pub use bookmark::{Bookmark, NewBookmark};
pub use change::{ChangeEvent, ChangeKind, OwnerFilter};
pub use error::{ModelError, ModelResult, ValidationError};
pub use id::{BookmarkId, OwnerId};
pub use link::{display_domain, resolve_title, validate_url, CheckedUrl};
pub use user::{User, UserMetadata};
