//! # marksync backend
//!
//! In-memory reference implementations of the collaborators the marksync
//! client talks to.
//!
//! This crate provides:
//! - `MemoryBackend`, a bookmark table with owner-scoped stores
//! - `ChangeHub`, a filtered change feed fed by every committed write
//! - `MemoryAuthProvider`, a session holder with signed OAuth state tokens
//! - Failure injection for exercising client error paths
//!
//! # Architecture
//!
//! Every write goes through a `ScopedStore` bound to one owner, which
//! mirrors row-level security: an owner can never read, create, or delete
//! another owner's rows. Committed writes are emitted to the `ChangeHub`,
//! which forwards each event only to subscribers whose filter matches.
//!
//! # Example
//!
//! ```rust,ignore
//! use marksync_backend::{BackendConfig, MemoryBackend};
//!
//! let backend = MemoryBackend::new(BackendConfig::default());
//! let store = backend.store_for(owner);
//! let feed = backend.hub();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod error;
mod hub;
mod store;

pub use auth::{MemoryAuthProvider, StateTokens};
pub use config::BackendConfig;
pub use error::{BackendError, BackendResult};
pub use hub::ChangeHub;
pub use store::{MemoryBackend, ScopedStore};
