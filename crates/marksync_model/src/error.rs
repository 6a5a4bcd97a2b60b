//! Error types for the bookmark model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while validating user input for a new bookmark.
///
/// The display text of each variant is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The URL field was empty after trimming.
    #[error("URL is required.")]
    MissingUrl,

    /// The URL does not start with `http://` or `https://`.
    #[error("URL must start with \"http://\" or \"https://\".")]
    UnsupportedScheme,

    /// The URL has an accepted prefix but cannot be parsed or has no host.
    #[error("URL is not valid.")]
    Malformed,
}

/// Errors that can occur in the model layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Input validation failed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An identifier string was not a UUID.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
