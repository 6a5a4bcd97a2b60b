//! Property tests for reconciliation.

use marksync_client::{AddOutcome, BookmarkController, BookmarkList, ClientConfig};
use marksync_model::{BookmarkId, ChangeEvent};
use marksync_testkit::prelude::*;
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::HashSet;
use std::sync::Arc;

/// Mounts a controller whose forwarder is never polled, so events are only
/// applied through `on_remote_change`.
fn mounted(
    runtime: &tokio::runtime::Runtime,
    snapshot: Vec<marksync_model::Bookmark>,
) -> BookmarkController {
    let _guard = runtime.enter();
    let session = TestSession::signed_in();
    BookmarkController::mount(
        session.owner(),
        snapshot,
        Arc::new(session.backend.store_for(session.owner())),
        session.feed(),
        ClientConfig::default(),
    )
    .unwrap()
}

/// One step of a session mixing this tab's actions with other clients' writes.
#[derive(Debug, Clone)]
enum Step {
    /// This tab adds a bookmark.
    Add,
    /// This tab deletes one of its own adds.
    Delete(Index),
    /// Another client inserts a row.
    RemoteInsert,
    /// Another client deletes one of its own rows.
    RemoteDelete(Index),
    /// Lets the feed forwarder catch up partway.
    Yield,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Add),
        2 => any::<Index>().prop_map(Step::Delete),
        3 => Just(Step::RemoteInsert),
        2 => any::<Index>().prop_map(Step::RemoteDelete),
        2 => Just(Step::Yield),
    ]
}

fn take_at(ids: &mut Vec<BookmarkId>, index: &Index) -> Option<BookmarkId> {
    if ids.is_empty() {
        return None;
    }
    let at = index.index(ids.len());
    Some(ids.remove(at))
}

/// Runs `steps` against a mounted controller and returns the expected and the
/// final id sets once the feed has drained.
async fn run_session(seeded: usize, steps: &[Step]) -> (HashSet<BookmarkId>, Vec<BookmarkId>) {
    let session = TestSession::signed_in();
    let others = session.open_tab();
    let mut remote: Vec<BookmarkId> = (0..seeded)
        .map(|n| others.seed(&format!("https://seed{n}.example.com"), "").id)
        .collect();
    let controller = session.mount(session.backend.rows_for(session.owner()));

    let mut local = Vec::new();
    let mut removed = HashSet::new();
    for (n, step) in steps.iter().enumerate() {
        match step {
            Step::Add => {
                let url = format!("https://local{n}.example.com");
                let id = match controller.add(&url, "").await.unwrap() {
                    AddOutcome::Inserted(record) => record.id,
                    AddOutcome::AlreadyPresent(id) => id,
                    AddOutcome::Discarded => panic!("controller is still mounted"),
                };
                local.push(id);
            }
            Step::Delete(index) => {
                if let Some(id) = take_at(&mut local, index) {
                    controller.delete(id).await.unwrap();
                    removed.insert(id);
                }
            }
            Step::RemoteInsert => {
                let url = format!("https://remote{n}.example.com");
                remote.push(others.seed(&url, "").id);
            }
            Step::RemoteDelete(index) => {
                if let Some(id) = take_at(&mut remote, index) {
                    others.backend.delete_remote(others.owner(), id);
                    removed.insert(id);
                }
            }
            Step::Yield => tokio::task::yield_now().await,
        }
    }

    // Events arrive in commit order, so once the marker shows up every
    // earlier event has been applied.
    let marker = others.seed("https://marker.example.com", "").id;
    wait_until(&controller, |c| c.ids().contains(&marker)).await;

    let mut expected: HashSet<BookmarkId> = local.into_iter().chain(remote).collect();
    expected.insert(marker);
    assert!(expected.is_disjoint(&removed));
    (expected, controller.ids())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    /// The final id set is independent of how disjoint inserts and deletes
    /// interleave.
    #[test]
    fn disjoint_events_commute(
        (snapshot, ops) in feed_scenario_strategy(6, 8),
        delete_mask in prop::collection::vec(any::<bool>(), 14),
        seed in any::<u64>(),
    ) {
        let mut events: Vec<ChangeEvent> = ops.iter().map(FeedOp::to_event).collect();
        let mut expected: HashSet<BookmarkId> = snapshot
            .iter()
            .chain(ops.iter().map(FeedOp::record))
            .map(|r| r.id)
            .collect();

        for (record, delete) in snapshot.iter().chain(ops.iter().map(FeedOp::record)).zip(&delete_mask) {
            if *delete {
                events.push(ChangeEvent::delete(record.clone()));
                expected.remove(&record.id);
            }
        }

        let mut forward = BookmarkList::from_snapshot(snapshot.clone());
        for event in &events {
            apply(&mut forward, event);
        }

        // Deterministic shuffle. A delete seen before its insert is replayed last.
        let mut shuffled = events.clone();
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            shuffled.swap(i, j);
        }
        let mut reordered = BookmarkList::from_snapshot(snapshot.clone());
        let mut pending_deletes = Vec::new();
        for event in &shuffled {
            if is_delete(event) && !reordered.contains(event.record.id) {
                pending_deletes.push(event.clone());
                continue;
            }
            apply(&mut reordered, event);
        }
        for event in &pending_deletes {
            apply(&mut reordered, event);
        }

        let forward_ids: HashSet<_> = forward.ids().into_iter().collect();
        let reordered_ids: HashSet<_> = reordered.ids().into_iter().collect();
        prop_assert_eq!(&forward_ids, &expected);
        prop_assert_eq!(&reordered_ids, &expected);
        prop_assert_eq!(forward.len(), expected.len());
        prop_assert_eq!(reordered.len(), expected.len());
    }

    /// Own adds and deletes interleaved with other clients' writes on
    /// disjoint rows end in the same set regardless of order.
    #[test]
    fn own_and_remote_mutations_commute(
        seeded in 0usize..4,
        steps in prop::collection::vec(step_strategy(), 0..24),
    ) {
        let (expected, final_ids) = runtime().block_on(run_session(seeded, &steps));
        let unique: HashSet<BookmarkId> = final_ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), final_ids.len());
        prop_assert_eq!(unique, expected);
    }

    /// Delivering an insert for an id already present changes nothing.
    #[test]
    fn repeated_inserts_are_idempotent(
        (snapshot, ops) in feed_scenario_strategy(5, 5),
        repeats in 1usize..4,
    ) {
        let runtime = runtime();
        let controller = mounted(&runtime, snapshot);
        for op in &ops {
            controller.on_remote_change(op.to_event());
        }
        let before = controller.ids();

        for _ in 0..repeats {
            for op in &ops {
                controller.on_remote_change(op.to_event());
            }
        }
        prop_assert_eq!(controller.ids(), before);
        let unique: HashSet<_> = controller.ids().into_iter().collect();
        prop_assert_eq!(unique.len(), controller.ids().len());
    }

    /// Inserts are prepended in arrival order on top of the untouched snapshot.
    #[test]
    fn inserts_prepend_without_resorting((snapshot, ops) in feed_scenario_strategy(5, 5)) {
        let runtime = runtime();
        let controller = mounted(&runtime, snapshot.clone());
        for op in &ops {
            controller.on_remote_change(op.to_event());
        }

        let mut expected: Vec<BookmarkId> = ops.iter().rev().map(|op| op.record().id).collect();
        expected.extend(snapshot.iter().map(|r| r.id));
        prop_assert_eq!(controller.ids(), expected);
    }
}

fn is_delete(event: &ChangeEvent) -> bool {
    event.kind == marksync_model::ChangeKind::Delete
}

fn apply(list: &mut BookmarkList, event: &ChangeEvent) {
    if is_delete(event) {
        list.remove(event.record.id);
    } else {
        list.prepend_if_absent(event.record.clone());
    }
}
