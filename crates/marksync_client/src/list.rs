//! Ordered, id-deduplicated bookmark collection.

use marksync_model::{Bookmark, BookmarkId};

/// The controller's in-memory list.
///
/// Seeded verbatim from the server snapshot (newest first). After that,
/// entries are only ever prepended or removed, never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkList {
    entries: Vec<Bookmark>,
}

impl BookmarkList {
    /// Seeds the list from a server snapshot, keeping its order.
    pub fn from_snapshot(snapshot: Vec<Bookmark>) -> Self {
        Self { entries: snapshot }
    }

    /// Returns true if an entry with `id` exists.
    pub fn contains(&self, id: BookmarkId) -> bool {
        self.entries.iter().any(|b| b.id == id)
    }

    /// Prepends `record` unless its id is already present.
    ///
    /// Returns true if the record was inserted.
    pub fn prepend_if_absent(&mut self, record: Bookmark) -> bool {
        if self.contains(record.id) {
            return false;
        }
        self.entries.insert(0, record);
        true
    }

    /// Removes every entry with `id`, returning the first one removed.
    pub fn remove(&mut self, id: BookmarkId) -> Option<Bookmark> {
        let position = self.entries.iter().position(|b| b.id == id)?;
        let removed = self.entries.remove(position);
        self.entries.retain(|b| b.id != id);
        Some(removed)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in display order.
    pub fn as_slice(&self) -> &[Bookmark] {
        &self.entries
    }

    /// Ids in display order.
    pub fn ids(&self) -> Vec<BookmarkId> {
        self.entries.iter().map(|b| b.id).collect()
    }

    /// Iterates over entries in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Bookmark> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a BookmarkList {
    type Item = &'a Bookmark;
    type IntoIter = std::slice::Iter<'a, Bookmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
