//! Change events delivered by the live change feed.

use crate::bookmark::Bookmark;
use crate::id::OwnerId;
use serde::{Deserialize, Serialize};

/// Type of change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// A bookmark was inserted.
    Insert,
    /// A bookmark was deleted.
    Delete,
}

/// A single change event from the change feed.
///
/// For deletes only `record.id` is significant; the rest of the record is
/// whatever the feed still knew about the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Type of change.
    pub kind: ChangeKind,
    /// Affected record.
    pub record: Bookmark,
}

impl ChangeEvent {
    /// Creates an insert event.
    pub fn insert(record: Bookmark) -> Self {
        Self {
            kind: ChangeKind::Insert,
            record,
        }
    }

    /// Creates a delete event.
    pub fn delete(record: Bookmark) -> Self {
        Self {
            kind: ChangeKind::Delete,
            record,
        }
    }
}

/// Server-side filter restricting a feed or fetch to one owner's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerFilter {
    /// Owner whose records pass the filter.
    pub owner: OwnerId,
}

impl OwnerFilter {
    /// Creates a filter for `owner`.
    pub fn new(owner: OwnerId) -> Self {
        Self { owner }
    }

    /// Returns true if the record belongs to the filtered owner.
    pub fn matches(&self, record: &Bookmark) -> bool {
        record.owner == self.owner
    }
}
