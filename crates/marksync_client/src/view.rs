//! Plain-data view models for the landing and dashboard views.
//!
//! Everything here is derived from controller or session state; nothing is
//! stored.

use crate::controller::ControllerSnapshot;
use crate::gate::Route;
use chrono::{DateTime, Utc};
use marksync_model::{display_domain, Bookmark, BookmarkId, User};
use url::form_urlencoded;

const FAVICON_ENDPOINT: &str = "https://www.google.com/s2/favicons";

/// Dashboard header: who is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    /// Full display name.
    pub display_name: String,
    /// First word of the display name.
    pub first_name: String,
    /// Avatar to show.
    pub avatar: Avatar,
}

/// Avatar image or a one-letter placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    /// Provider-supplied image URL.
    Image(String),
    /// Uppercased initial.
    Initial(String),
}

impl HeaderView {
    /// Builds the header for `user`.
    pub fn for_user(user: &User) -> Self {
        let avatar = match user.avatar_url() {
            Some(url) => Avatar::Image(url.to_string()),
            None => Avatar::Initial(user.initial()),
        };
        Self {
            display_name: user.display_name().to_string(),
            first_name: user.first_name().to_string(),
            avatar,
        }
    }
}

/// The add-bookmark form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    /// URL input value.
    pub url_input: String,
    /// Title input value.
    pub title_input: String,
    /// Placeholder for the URL input.
    pub url_placeholder: &'static str,
    /// Placeholder for the title input.
    pub title_placeholder: &'static str,
    /// Pending error shown under the inputs.
    pub error: Option<String>,
    /// Submit button label.
    pub submit_label: &'static str,
    /// True while an add is in flight.
    pub submit_disabled: bool,
}

/// One entry of the bookmark list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkRow {
    /// Bookmark id, the target of the delete action.
    pub id: BookmarkId,
    /// Link text.
    pub title: String,
    /// Link target.
    pub href: String,
    /// Domain shown under the title.
    pub domain: String,
    /// Creation date, e.g. `Oct 18, 2026`.
    pub created_on: String,
    /// Favicon image URL.
    pub favicon_url: String,
    /// True while this row's delete is in flight (row dimmed, delete disabled).
    pub deleting: bool,
}

impl BookmarkRow {
    fn new(bookmark: &Bookmark, deleting: Option<BookmarkId>) -> Self {
        let domain = display_domain(&bookmark.url);
        let query: String = form_urlencoded::byte_serialize(domain.as_bytes()).collect();
        Self {
            id: bookmark.id,
            title: bookmark.title.clone(),
            href: bookmark.url.clone(),
            favicon_url: format!("{FAVICON_ENDPOINT}?domain={query}&sz=32"),
            domain,
            created_on: format_date(&bookmark.created_at),
            deleting: deleting == Some(bookmark.id),
        }
    }
}

/// Formats a creation timestamp for display.
fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// The dashboard's bookmark panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// Section heading.
    pub heading: &'static str,
    /// Count line under the heading.
    pub summary: String,
    /// True while the live indicator is lit.
    pub live: bool,
    /// The add form.
    pub form: FormView,
    /// Rows in display order.
    pub rows: Vec<BookmarkRow>,
}

impl ListView {
    /// Derives the panel from a controller snapshot.
    pub fn from_snapshot(snapshot: &ControllerSnapshot) -> Self {
        let count = snapshot.bookmarks.len();
        let summary = match count {
            0 => "No bookmarks yet \u{2014} add your first below.".to_string(),
            1 => "1 bookmark".to_string(),
            n => format!("{n} bookmarks"),
        };

        Self {
            heading: "Your Bookmarks",
            summary,
            live: snapshot.live,
            form: FormView {
                url_input: snapshot.url_input.clone(),
                title_input: snapshot.title_input.clone(),
                url_placeholder: "https://example.com",
                title_placeholder: "Title (optional \u{2014} defaults to domain)",
                error: snapshot.error.clone(),
                submit_label: if snapshot.adding {
                    "Saving\u{2026}"
                } else {
                    "Save Bookmark"
                },
                submit_disabled: snapshot.adding,
            },
            rows: snapshot
                .bookmarks
                .iter()
                .map(|b| BookmarkRow::new(b, snapshot.deleting))
                .collect(),
        }
    }

    /// True when there is nothing to list.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The landing/login view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingView {
    /// Product name.
    pub product_name: &'static str,
    /// Headline.
    pub headline: &'static str,
    /// Short description.
    pub tagline: &'static str,
    /// Label of the sign-in action.
    pub sign_in_label: String,
    /// Target of the sign-in action.
    pub sign_in_href: String,
    /// Error banner, when the route carries an error code.
    pub error: Option<String>,
}

impl LandingView {
    /// Builds the landing view for `route` and the given provider label.
    pub fn new(route: &Route, provider_label: &str, sign_in_href: impl Into<String>) -> Self {
        let error = match route {
            Route::Landing { error: Some(code) } => Some(error_text(code).to_string()),
            _ => None,
        };
        Self {
            product_name: "Bookmark URL",
            headline: "Your bookmarks, always in sync.",
            tagline: "Save links privately. Access them anywhere. Updates across all your tabs in real time.",
            sign_in_label: format!("Continue with {provider_label}"),
            sign_in_href: sign_in_href.into(),
            error,
        }
    }
}

fn error_text(code: &str) -> &'static str {
    match code {
        "oauth_error" => "Sign-in failed. Please try again.",
        "session_error" => "We could not check your session. Please sign in again.",
        _ => "Something went wrong. Please try again.",
    }
}
