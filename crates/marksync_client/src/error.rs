//! Error types for the client.

use marksync_model::ValidationError;
use thiserror::Error;

/// Result type for controller and gate operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for record store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for auth provider calls.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type for change feed calls.
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors reported by the remote record store.
///
/// The message is the store's own text and is shown to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store refused the request (policy, constraint, missing row).
    #[error("{0}")]
    Rejected(String),

    /// The store could not be reached or failed internally.
    #[error("{0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates a rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Creates an unavailability error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns the store's message text.
    pub fn message(&self) -> &str {
        match self {
            StoreError::Rejected(message) | StoreError::Unavailable(message) => message,
        }
    }
}

/// Errors reported by the auth provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The provider call failed.
    #[error("auth provider error: {0}")]
    Provider(String),

    /// The requested OAuth provider is not configured.
    #[error("unsupported oauth provider: {0}")]
    UnsupportedProvider(String),

    /// An OAuth state token did not verify.
    #[error("invalid oauth state: {0}")]
    InvalidState(String),
}

/// Errors reported by the change feed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The subscription could not be established.
    #[error("subscribe failed: {0}")]
    SubscribeFailed(String),
}

/// Errors that can occur in the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Local input validation failed; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The auth provider failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The change feed failed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// No tokio runtime is available to drive the feed subscription.
    #[error("no async runtime available")]
    NoRuntime,
}

impl ClientError {
    /// Returns true if the error was caught locally before any remote call.
    pub fn is_local(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// Text shown in the pending-error slot.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Store(err) => err.message().to_string(),
            other => other.to_string(),
        }
    }
}
