//! Authenticated user as reported by the auth provider.

use crate::id::OwnerId;
use serde::{Deserialize, Serialize};

/// Profile metadata supplied by the OAuth provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    /// Full display name.
    pub full_name: Option<String>,
    /// Short name, used when `full_name` is missing.
    pub name: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

/// The user behind the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier that owns bookmarks.
    pub id: OwnerId,
    /// Email address, if the provider shared one.
    pub email: Option<String>,
    /// Provider metadata.
    #[serde(default, rename = "user_metadata")]
    pub metadata: UserMetadata,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl User {
    /// Creates a user with no email or metadata.
    pub fn new(id: OwnerId) -> Self {
        Self {
            id,
            email: None,
            metadata: UserMetadata::default(),
        }
    }

    /// Sets the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the full name.
    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.full_name = Some(name.into());
        self
    }

    /// Sets the avatar URL.
    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.metadata.avatar_url = Some(url.into());
        self
    }

    /// Name shown in the header: full name, then name, then email, then `"User"`.
    pub fn display_name(&self) -> &str {
        non_empty(&self.metadata.full_name)
            .or_else(|| non_empty(&self.metadata.name))
            .or_else(|| non_empty(&self.email))
            .unwrap_or("User")
    }

    /// First word of the display name.
    pub fn first_name(&self) -> &str {
        let name = self.display_name();
        name.split(' ').next().unwrap_or(name)
    }

    /// Uppercased first character of the display name, for avatar placeholders.
    pub fn initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    /// Avatar URL, if any.
    pub fn avatar_url(&self) -> Option<&str> {
        non_empty(&self.metadata.avatar_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_fallbacks() {
        let id = OwnerId::from_u128(1);
        assert_eq!(User::new(id).display_name(), "User");
        assert_eq!(
            User::new(id).with_email("ada@example.com").display_name(),
            "ada@example.com"
        );

        let mut named = User::new(id).with_email("ada@example.com");
        named.metadata.name = Some("ada".into());
        assert_eq!(named.display_name(), "ada");

        let full = named.with_full_name("Ada Lovelace");
        assert_eq!(full.display_name(), "Ada Lovelace");
        assert_eq!(full.first_name(), "Ada");
        assert_eq!(full.initial(), "A");
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let user = User::new(OwnerId::from_u128(1))
            .with_full_name("")
            .with_email("grace@example.com")
            .with_avatar_url("");
        assert_eq!(user.display_name(), "grace@example.com");
        assert_eq!(user.initial(), "G");
        assert_eq!(user.avatar_url(), None);
    }
}
