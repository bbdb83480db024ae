// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Deferred catch-up: timer arming, collapsing and firing.

use std::time::Duration;

use tick_core::SyncEngine;

use crate::common::{Call, MemoryStore, ScriptedRemote, item};

#[tokio::test(start_paused = true)]
async fn catch_up_collapses_failures_into_one_bulk_replace() {
    // Arrange
    let store = MemoryStore::default();
    let remote = ScriptedRemote::with(&[], 1);
    let engine = SyncEngine::new(store, remote.clone());
    engine.load_all().await.unwrap();
    remote.set_offline(true);

    // Act
    let mut added = Vec::new();
    for text in ["one", "two", "three"] {
        added.push(engine.add(item(text)).await.unwrap());
    }
    remote.set_offline(false);
    engine.wait_idle().await;

    // Assert
    assert_eq!(remote.bulk_replaces(), 1);
    let adds = remote
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::Add(..)))
        .count();
    assert_eq!(adds, 1, "only the first add reaches the remote");
    assert!(!engine.is_dirty().await);
    for item in &added {
        assert!(remote.items().contains(item));
    }
}

#[tokio::test(start_paused = true)]
async fn catch_up_waits_for_timeout_plus_margin() {
    // Arrange
    let remote = ScriptedRemote::with(&[], 1);
    let engine = SyncEngine::builder(MemoryStore::default(), remote.clone())
        .catch_up_margin(Duration::from_millis(500))
        .build();
    assert_eq!(engine.catch_up_delay(), Duration::from_millis(2_500));

    // Act
    engine.schedule_catch_up().await;
    tokio::time::sleep(Duration::from_millis(2_490)).await;

    // Assert
    assert_eq!(remote.bulk_replaces(), 0);
    engine.wait_idle().await;
    assert_eq!(remote.bulk_replaces(), 1);
}

#[tokio::test(start_paused = true)]
async fn catch_up_margin_has_a_floor() {
    let engine = SyncEngine::builder(MemoryStore::default(), ScriptedRemote::default())
        .catch_up_margin(Duration::from_millis(1))
        .build();

    assert_eq!(engine.catch_up_delay(), Duration::from_millis(2_100));
}

#[tokio::test(start_paused = true)]
async fn schedule_catch_up_while_pending_is_a_no_op() {
    let remote = ScriptedRemote::with(&[], 1);
    let engine = SyncEngine::new(MemoryStore::default(), remote.clone());

    for _ in 0..3 {
        engine.schedule_catch_up().await;
    }
    engine.wait_idle().await;

    assert_eq!(remote.bulk_replaces(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_catch_up_stays_dirty_without_retrying() {
    // Arrange
    let remote = ScriptedRemote::with(&[], 1);
    let engine = SyncEngine::new(MemoryStore::default(), remote.clone());
    engine.load_all().await.unwrap();
    remote.set_offline(true);

    // Act
    engine.add(item("pending")).await.unwrap();
    engine.wait_idle().await;

    // Assert
    assert!(engine.is_dirty().await);
    assert_eq!(remote.bulk_replaces(), 1);

    // the next change arms a fresh catch-up
    remote.set_offline(false);
    engine.add(item("later")).await.unwrap();
    engine.wait_idle().await;
    assert!(!engine.is_dirty().await);
    assert_eq!(remote.items().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn catch_up_does_not_outlive_the_engine() {
    let remote = ScriptedRemote::with(&[], 1);
    let engine = SyncEngine::new(MemoryStore::default(), remote.clone());

    engine.schedule_catch_up().await;
    drop(engine);
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(remote.bulk_replaces(), 0);
}
