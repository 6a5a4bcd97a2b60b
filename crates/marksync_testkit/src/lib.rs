//! # marksync Testkit
//!
//! Test utilities for marksync.
//!
//! This crate provides:
//! - Bookmark and user fixtures, including a JSON snapshot fixture
//! - A `TestSession` wiring the reference backend to a gate and controller
//! - Property-based test generators using proptest
//! - One-time tracing initialization for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marksync_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn test_with_session() {
//!     let session = TestSession::signed_in();
//!     let dashboard = session.load().await;
//!     // ... test operations
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
mod logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::init_tracing;
}

pub use fixtures::*;
pub use generators::*;
pub use logging::init_tracing;
