// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Bulk reconciliation and its outcomes.

use tick_core::SyncEngine;

use crate::common::{
    Call, MemoryStore, RecordingObserver, ScriptedRemote, item, item_changed_at, item_with_id,
};

#[tokio::test(start_paused = true)]
async fn add_then_failed_delete_is_healed_by_reconcile() {
    // Arrange
    let store = MemoryStore::default();
    let remote = ScriptedRemote::with(&[], 4);
    let engine = SyncEngine::new(store.clone(), remote.clone());
    engine.load_all().await.unwrap();

    // Act: the add succeeds, the delete times out
    let a = engine.add(item("A")).await.unwrap();
    assert_eq!(engine.revision().await, 5);
    assert!(!engine.is_dirty().await);

    remote.set_offline(true);
    let deleted = engine.delete(a.id()).await.unwrap();
    assert_eq!(deleted, a);
    assert!(engine.is_dirty().await);

    remote.set_offline(false);
    engine.wait_idle().await;

    // Assert
    assert_eq!(
        remote.calls().last(),
        Some(&Call::BulkReplace(Vec::new(), 5))
    );
    assert!(remote.items().is_empty());
    assert!(engine.items().await.is_empty());
    assert!(store.ids().is_empty());
    assert!(!engine.is_dirty().await);
    assert_eq!(engine.revision().await, 6);
}

#[tokio::test]
async fn sync_now_replaces_map_and_store_wholesale() {
    // Arrange
    let keep = item_with_id("keep", "stays");
    let gone = item_with_id("gone", "deleted elsewhere");
    let store = MemoryStore::with(&[keep.clone(), gone.clone()]);
    let remote = ScriptedRemote::with(&[keep.clone(), gone.clone()], 9);
    remote.reject_on_bulk("gone");
    let observer = RecordingObserver::default();
    let engine = SyncEngine::builder(store.clone(), remote.clone())
        .observer(observer.clone())
        .build();
    engine.load_all().await.unwrap();

    // Act
    let clean = engine.sync_now().await;

    // Assert
    assert!(clean);
    assert_eq!(engine.items().await, vec![keep.clone()]);
    assert_eq!(store.ids(), vec!["keep".to_string()]);
    assert_eq!(engine.revision().await, 10);

    let updates = observer.updates();
    assert_eq!(updates, vec![vec![keep]]);
    assert_eq!(observer.started(), 2);
    assert_eq!(observer.stopped(), 2);
}

#[tokio::test]
async fn sync_now_adopts_server_revision_as_is() {
    let remote = ScriptedRemote::with(&[], 50);
    let engine = SyncEngine::new(MemoryStore::default(), remote.clone());
    engine.load_all().await.unwrap();
    remote.put(&item_with_id("x", "elsewhere"), 2);

    assert!(engine.sync_now().await);

    // the bulk replace wiped "x" and answered with the server's own counter
    assert_eq!(engine.revision().await, 3);
    assert!(remote.items().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dirty_engine_keeps_changes_local_until_catch_up() {
    let remote = ScriptedRemote::with(&[], 1);
    remote.set_offline(true);
    let engine = SyncEngine::new(MemoryStore::default(), remote.clone());
    engine.load_all().await.unwrap();
    remote.set_offline(false);
    assert!(engine.is_dirty().await);

    // both intents stay local, then catch-up pushes them together
    let a = engine.add(item("a")).await.unwrap();
    engine.toggle_done(a.id()).await.unwrap();
    assert!(engine.is_dirty().await);

    engine.wait_idle().await;
    assert!(!engine.is_dirty().await);
    assert!(remote.items()[0].is_done());
}

#[tokio::test(start_paused = true)]
async fn revision_conflict_rebases_and_retries() {
    // Arrange: the server moved on while we were offline
    let theirs = item_changed_at("theirs", "from phone", Some(40));
    let remote = ScriptedRemote::with(&[theirs.clone()], 10);
    remote.check_revision(true);
    remote.set_offline(true);
    let engine = SyncEngine::new(MemoryStore::default(), remote.clone());
    engine.load_all().await.unwrap();
    remote.set_offline(false);

    // Act
    let mine = engine.add(item("from laptop")).await.unwrap();
    engine.wait_idle().await;

    // Assert
    let calls = remote.calls();
    let bulk_revisions: Vec<i64> = calls
        .iter()
        .filter_map(|c| match c {
            Call::BulkReplace(_, revision) => Some(*revision),
            _ => None,
        })
        .collect();
    assert_eq!(bulk_revisions, vec![0, 10]);
    assert!(calls.contains(&Call::GetAll));

    assert!(!engine.is_dirty().await);
    assert_eq!(engine.revision().await, 11);
    let server = remote.items();
    assert!(server.contains(&theirs));
    assert!(server.contains(&mine));
}

#[tokio::test(start_paused = true)]
async fn persistent_conflicts_stop_rearming() {
    let remote = ScriptedRemote::with(&[], 1);
    let engine = SyncEngine::new(MemoryStore::default(), remote.clone());
    engine.load_all().await.unwrap();
    remote.conflict_next(100);

    engine.add(item("stuck")).await.unwrap();
    engine.wait_idle().await;

    assert!(engine.is_dirty().await);
    assert_eq!(remote.bulk_replaces(), 4);
}
