//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use crate::fixtures::{at, DEFAULT_OWNER};
use marksync_model::{Bookmark, BookmarkId, ChangeEvent, OwnerId};
use proptest::prelude::*;

/// Strategy for generating URLs the validator accepts.
pub fn url_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("http"), Just("https")],
        prop::option::of(Just("www.")),
        prop::string::string_regex("[a-z][a-z0-9]{0,15}").expect("Invalid regex"),
        prop_oneof![Just("com"), Just("org"), Just("dev"), Just("io")],
        prop::string::string_regex("(/[a-z0-9]{1,8}){0,3}").expect("Invalid regex"),
    )
        .prop_map(|(scheme, www, name, tld, path)| {
            format!("{scheme}://{}{name}.{tld}{path}", www.unwrap_or(""))
        })
}

/// Strategy for generating raw form input the validator must reject.
pub fn invalid_url_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        prop::string::string_regex("[ \t]{1,4}").expect("Invalid regex"),
        prop::string::string_regex("(ftp|file|mailto|javascript):[a-z/]{1,12}")
            .expect("Invalid regex"),
        prop::string::string_regex("[a-z]{1,12}\\.(com|org)").expect("Invalid regex"),
    ]
}

/// Strategy for generating a bookmark for `owner` with the given numeric id.
pub fn bookmark_strategy(owner: OwnerId, n: u128) -> impl Strategy<Value = Bookmark> {
    (url_strategy(), "[A-Za-z ]{0,24}", 0i64..1_000_000).prop_map(move |(url, title, secs)| {
        Bookmark {
            id: BookmarkId::from_u128(n),
            owner,
            url,
            title,
            created_at: at(secs),
        }
    })
}

/// Strategy for generating `min..max` bookmarks with pairwise-distinct ids.
///
/// Ids are numbered from 1 in generation order.
pub fn distinct_bookmarks_strategy(
    min: usize,
    max: usize,
) -> impl Strategy<Value = Vec<Bookmark>> {
    (min..max).prop_flat_map(|len| {
        (1..=len as u128)
            .map(|n| bookmark_strategy(DEFAULT_OWNER, n))
            .collect::<Vec<_>>()
    })
}

/// One change feed delivery.
#[derive(Debug, Clone)]
pub enum FeedOp {
    /// Deliver an insert event.
    Insert(Bookmark),
    /// Deliver a delete event.
    Delete(Bookmark),
}

impl FeedOp {
    /// Converts to the event the feed would push.
    pub fn to_event(&self) -> ChangeEvent {
        match self {
            FeedOp::Insert(record) => ChangeEvent::insert(record.clone()),
            FeedOp::Delete(record) => ChangeEvent::delete(record.clone()),
        }
    }

    /// The record the event refers to.
    pub fn record(&self) -> &Bookmark {
        match self {
            FeedOp::Insert(record) | FeedOp::Delete(record) => record,
        }
    }
}

/// Strategy for generating a snapshot plus insert operations for new ids.
///
/// Every generated record has a distinct id, so the inserts never collide
/// with the snapshot or with each other.
pub fn feed_scenario_strategy(
    max_snapshot: usize,
    max_inserts: usize,
) -> impl Strategy<Value = (Vec<Bookmark>, Vec<FeedOp>)> {
    (0..=max_snapshot, 1..=max_inserts).prop_flat_map(|(snapshot_len, insert_len)| {
        let snapshot: Vec<_> = (1..=snapshot_len as u128)
            .map(|n| bookmark_strategy(DEFAULT_OWNER, n))
            .collect();
        let first = snapshot_len as u128 + 1;
        let inserts: Vec<_> = (first..first + insert_len as u128)
            .map(|n| bookmark_strategy(DEFAULT_OWNER, n).prop_map(FeedOp::Insert))
            .collect();
        (snapshot, inserts)
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
