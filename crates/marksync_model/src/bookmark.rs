//! The bookmark entity.

use crate::error::ValidationError;
use crate::id::{BookmarkId, OwnerId};
use crate::link::{resolve_title, validate_url};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved URL belonging to one owner.
///
/// Field names on the wire follow the row shape of the record store
/// (`user_id`, `created_at`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Server-assigned identifier.
    pub id: BookmarkId,
    /// Owner of the bookmark.
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    /// Absolute `http`/`https` URL.
    pub url: String,
    /// Display label.
    pub title: String,
    /// Server-assigned creation time. Lists are ordered by this, newest first.
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    /// Returns true if the bookmark was created after `other`.
    pub fn is_newer_than(&self, other: &Bookmark) -> bool {
        self.created_at > other.created_at
    }
}

/// Fields of a create request, before the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookmark {
    /// Owner the bookmark is created for.
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    /// Trimmed URL.
    pub url: String,
    /// Resolved title.
    pub title: String,
}

impl NewBookmark {
    /// Builds a create request from raw form input.
    ///
    /// Validates the URL and falls back to its hostname when `title` is blank.
    pub fn from_input(owner: OwnerId, url: &str, title: &str) -> Result<Self, ValidationError> {
        let checked = validate_url(url)?;
        let title = resolve_title(title, &checked);
        Ok(Self {
            owner,
            url: checked.into_string(),
            title,
        })
    }

    /// Completes the request into a stored bookmark.
    pub fn into_bookmark(self, id: BookmarkId, created_at: DateTime<Utc>) -> Bookmark {
        Bookmark {
            id,
            owner: self.owner,
            url: self.url,
            title: self.title,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn from_input_resolves_title() {
        let owner = OwnerId::from_u128(1);
        let new = NewBookmark::from_input(owner, "https://example.com/page", "").unwrap();
        assert_eq!(new.title, "example.com");
        assert_eq!(new.url, "https://example.com/page");
        assert_eq!(new.owner, owner);
    }

    #[test]
    fn from_input_rejects_invalid_url() {
        let owner = OwnerId::from_u128(1);
        assert_eq!(
            NewBookmark::from_input(owner, "ftp://host", "x"),
            Err(ValidationError::UnsupportedScheme)
        );
    }

    #[test]
    fn serde_uses_row_field_names() {
        let created = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let bookmark = NewBookmark::from_input(OwnerId::from_u128(2), "https://docs.rs", "Docs")
            .unwrap()
            .into_bookmark(BookmarkId::from_u128(9), created);

        let json = serde_json::to_value(&bookmark).unwrap();
        assert_eq!(json["user_id"], OwnerId::from_u128(2).to_string());
        assert_eq!(json["title"], "Docs");
        assert!(json.get("created_at").is_some());

        let back: Bookmark = serde_json::from_value(json).unwrap();
        assert_eq!(back, bookmark);
    }

    #[test]
    fn newer_than_compares_creation_time() {
        let owner = OwnerId::from_u128(1);
        let older = NewBookmark::from_input(owner, "https://a.com", "")
            .unwrap()
            .into_bookmark(BookmarkId::from_u128(1), Utc.timestamp_opt(100, 0).unwrap());
        let newer = NewBookmark::from_input(owner, "https://b.com", "")
            .unwrap()
            .into_bookmark(BookmarkId::from_u128(2), Utc.timestamp_opt(200, 0).unwrap());
        assert!(newer.is_newer_than(&older));
        assert!(!older.is_newer_than(&newer));
    }
}
