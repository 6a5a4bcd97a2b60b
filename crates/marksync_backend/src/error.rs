//! Error types for the reference backend.

use marksync_client::AuthError;
use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur in the reference backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// A state token was malformed or its signature did not match.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// A state token is older than the configured expiry.
    #[error("token expired")]
    TokenExpired,

    /// The OAuth provider is not in the configured list.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The configured authorize endpoint is not a URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The signing secret was rejected.
    #[error("invalid signing key")]
    InvalidKey,
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::UnknownProvider(name) => AuthError::UnsupportedProvider(name),
            BackendError::InvalidToken(_) | BackendError::TokenExpired => {
                AuthError::InvalidState(err.to_string())
            }
            other => AuthError::Provider(other.to_string()),
        }
    }
}
