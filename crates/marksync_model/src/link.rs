//! URL validation and display helpers.

use crate::error::ValidationError;
use url::Url;

const ACCEPTED_PREFIXES: [&str; 2] = ["http://", "https://"];

/// A URL that passed [`validate_url`].
///
/// Keeps the trimmed input exactly as typed (the stored form) next to the
/// parsed hostname used for default titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedUrl {
    raw: String,
    host: String,
}

impl CheckedUrl {
    /// Returns the trimmed URL as entered by the user.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed hostname.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Consumes the checked URL, returning the stored string form.
    pub fn into_string(self) -> String {
        self.raw
    }
}

/// Validates a user-supplied bookmark URL.
///
/// Surrounding whitespace is ignored. The scheme check is a literal prefix
/// match on `http://` or `https://`.
pub fn validate_url(raw: &str) -> Result<CheckedUrl, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingUrl);
    }
    if !ACCEPTED_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        return Err(ValidationError::UnsupportedScheme);
    }

    let parsed = Url::parse(trimmed).map_err(|_| ValidationError::Malformed)?;
    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return Err(ValidationError::Malformed),
    };

    Ok(CheckedUrl {
        raw: trimmed.to_string(),
        host,
    })
}

/// Returns the title to store: the trimmed title if non-empty, else the hostname.
pub fn resolve_title(title: &str, url: &CheckedUrl) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        url.host().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Returns the domain shown next to a bookmark.
///
/// A leading `www.` is dropped. Unparsable URLs are shown as-is.
pub fn display_domain(raw_url: &str) -> String {
    match Url::parse(raw_url) {
        Ok(url) => match url.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => raw_url.to_string(),
        },
        Err(_) => raw_url.to_string(),
    }
}
