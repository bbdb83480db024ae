// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::Item;

/// Receives notifications from a [`SyncEngine`](crate::SyncEngine).
///
/// Callbacks run on the engine's task and must not block.
pub trait SyncObserver: Send + Sync {
    /// The item set was replaced by a successful reconciliation.
    fn on_items_updated(&self, _items: &[Item]) {}

    /// A remote call is about to start.
    fn on_request_started(&self) {}

    /// A remote call finished, successfully or not.
    fn on_request_stopped(&self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}
