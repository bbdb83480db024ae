// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Initial load: local snapshot first, then the server list merged in.

use tick_core::{SyncEngine, SyncError};

use crate::common::{Call, MemoryStore, ScriptedRemote, item_changed_at, item_with_id};

#[tokio::test(start_paused = true)]
async fn load_all_merges_by_last_write_wins() {
    // Arrange
    let store = MemoryStore::with(&[
        item_changed_at("a", "local a", Some(10)),
        item_changed_at("b", "local b", Some(30)),
        item_changed_at("c", "local c", None),
        item_with_id("mine", "local only"),
    ]);
    let remote = ScriptedRemote::with(
        &[
            item_changed_at("a", "server a", Some(20)),
            item_changed_at("b", "server b", Some(20)),
            item_changed_at("c", "server c", None),
            item_with_id("theirs", "server only"),
        ],
        7,
    );
    let engine = SyncEngine::new(store.clone(), remote.clone());

    // Act
    let items = engine.load_all().await.unwrap();

    // Assert
    let text = |id: &str| {
        items
            .iter()
            .find(|i| i.id() == id)
            .map(|i| i.text().to_string())
    };
    assert_eq!(items.len(), 5);
    assert_eq!(text("a").as_deref(), Some("server a"));
    assert_eq!(text("b").as_deref(), Some("local b"));
    assert_eq!(text("c").as_deref(), Some("local c"));
    assert_eq!(text("mine").as_deref(), Some("local only"));
    assert_eq!(text("theirs").as_deref(), Some("server only"));

    assert_eq!(store.get("a").unwrap().text(), "server a");
    assert_eq!(store.get("theirs").unwrap().text(), "server only");
    assert_eq!(engine.revision().await, 7);
}

#[tokio::test(start_paused = true)]
async fn load_all_with_diverged_lists_schedules_catch_up() {
    // Arrange
    let store = MemoryStore::with(&[item_with_id("mine", "local only")]);
    let remote = ScriptedRemote::with(&[item_with_id("theirs", "server only")], 3);
    let engine = SyncEngine::new(store.clone(), remote.clone());

    // Act
    engine.load_all().await.unwrap();
    assert!(engine.is_dirty().await);
    engine.wait_idle().await;

    // Assert
    assert_eq!(remote.bulk_replaces(), 1);
    assert!(!engine.is_dirty().await);
    assert_eq!(remote.items().len(), 2);
    assert_eq!(engine.revision().await, 4);
}

#[tokio::test(start_paused = true)]
async fn load_all_of_matching_lists_stays_clean() {
    let list = [item_with_id("a", "same"), item_changed_at("b", "same", Some(5))];
    let store = MemoryStore::with(&list);
    let remote = ScriptedRemote::with(&list, 2);
    let engine = SyncEngine::new(store, remote.clone());

    engine.load_all().await.unwrap();
    engine.wait_idle().await;

    assert!(!engine.is_dirty().await);
    assert_eq!(remote.calls(), vec![Call::GetAll]);
}

#[tokio::test(start_paused = true)]
async fn load_all_returns_local_snapshot_when_offline() {
    // Arrange
    let store = MemoryStore::with(&[item_with_id("a", "kept")]);
    let remote = ScriptedRemote::default();
    remote.set_offline(true);
    let engine = SyncEngine::new(store, remote.clone());

    // Act
    let items = engine.load_all().await.unwrap();
    engine.wait_idle().await;

    // Assert
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text(), "kept");
    assert!(engine.is_dirty().await);
    assert_eq!(remote.bulk_replaces(), 0);
}

#[tokio::test]
async fn load_all_propagates_store_failure() {
    let store = MemoryStore::default();
    store.fail(true);
    let remote = ScriptedRemote::default();
    let engine = SyncEngine::new(store, remote.clone());

    let err = engine.load_all().await.unwrap_err();

    assert!(matches!(err, SyncError::LocalStore(_)));
    assert!(remote.calls().is_empty());
}
