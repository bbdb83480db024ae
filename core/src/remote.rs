// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use async_trait::async_trait;
use tick_remote::{Revisioned, TodoClient, TodoElement};

use crate::{Item, RemoteFailure};

/// RPC surface of the list backend, as seen by the engine.
///
/// Mutations carry the revision the caller last saw. Every successful call
/// returns the server revision after it completed.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// The per-request timeout.
    fn timeout(&self) -> Duration;

    /// Fetches the whole list. Invalid records are dropped.
    async fn get_all(&self) -> Result<Revisioned<Vec<Item>>, RemoteFailure>;

    /// Fetches one item.
    async fn get(&self, id: &str) -> Result<Revisioned<Item>, RemoteFailure>;

    /// Adds an item.
    async fn add(&self, item: &Item, revision: i64) -> Result<Revisioned<Item>, RemoteFailure>;

    /// Replaces the item stored under `id`.
    async fn edit(
        &self,
        id: &str,
        item: &Item,
        revision: i64,
    ) -> Result<Revisioned<Item>, RemoteFailure>;

    /// Deletes the item stored under `id`.
    async fn delete(&self, id: &str, revision: i64) -> Result<Revisioned<Item>, RemoteFailure>;

    /// Replaces the whole list, returning what the server kept.
    async fn bulk_replace(
        &self,
        items: &[Item],
        revision: i64,
    ) -> Result<Revisioned<Vec<Item>>, RemoteFailure>;
}

#[async_trait]
impl RemoteClient for TodoClient {
    fn timeout(&self) -> Duration {
        TodoClient::timeout(self)
    }

    async fn get_all(&self) -> Result<Revisioned<Vec<Item>>, RemoteFailure> {
        Ok(self.list().await?.map(decode_list))
    }

    async fn get(&self, id: &str) -> Result<Revisioned<Item>, RemoteFailure> {
        decode_element(TodoClient::get(self, id).await?)
    }

    async fn add(&self, item: &Item, revision: i64) -> Result<Revisioned<Item>, RemoteFailure> {
        let element = item.to_element(self.device_id());
        decode_element(self.create(&element, revision).await?)
    }

    async fn edit(
        &self,
        id: &str,
        item: &Item,
        revision: i64,
    ) -> Result<Revisioned<Item>, RemoteFailure> {
        let element = item.to_element(self.device_id());
        decode_element(self.update(id, &element, revision).await?)
    }

    async fn delete(&self, id: &str, revision: i64) -> Result<Revisioned<Item>, RemoteFailure> {
        decode_element(TodoClient::delete(self, id, revision).await?)
    }

    async fn bulk_replace(
        &self,
        items: &[Item],
        revision: i64,
    ) -> Result<Revisioned<Vec<Item>>, RemoteFailure> {
        let device_id = self.device_id();
        let elements: Vec<TodoElement> = items.iter().map(|i| i.to_element(device_id)).collect();
        Ok(self.replace_list(&elements, revision).await?.map(decode_list))
    }
}

fn decode_list(elements: Vec<TodoElement>) -> Vec<Item> {
    elements
        .into_iter()
        .filter_map(|e| {
            let id = e.id.clone();
            Item::try_from(e)
                .inspect_err(|err| tracing::warn!(%id, %err, "dropping invalid server item"))
                .ok()
        })
        .collect()
}

fn decode_element(r: Revisioned<TodoElement>) -> Result<Revisioned<Item>, RemoteFailure> {
    Ok(Revisioned::new(Item::try_from(r.value)?, r.revision))
}

/// A remote that is never reachable, for running without a backend.
///
/// Every call fails with [`RemoteFailure::Unavailable`], so the engine keeps
/// all changes local and stays dirty.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClient;

impl OfflineClient {
    fn fail<T>() -> Result<T, RemoteFailure> {
        Err(RemoteFailure::Unavailable("no remote configured".to_string()))
    }
}

#[async_trait]
impl RemoteClient for OfflineClient {
    fn timeout(&self) -> Duration {
        Duration::ZERO
    }

    async fn get_all(&self) -> Result<Revisioned<Vec<Item>>, RemoteFailure> {
        Self::fail()
    }

    async fn get(&self, _id: &str) -> Result<Revisioned<Item>, RemoteFailure> {
        Self::fail()
    }

    async fn add(&self, _item: &Item, _revision: i64) -> Result<Revisioned<Item>, RemoteFailure> {
        Self::fail()
    }

    async fn edit(
        &self,
        _id: &str,
        _item: &Item,
        _revision: i64,
    ) -> Result<Revisioned<Item>, RemoteFailure> {
        Self::fail()
    }

    async fn delete(&self, _id: &str, _revision: i64) -> Result<Revisioned<Item>, RemoteFailure> {
        Self::fail()
    }

    async fn bulk_replace(
        &self,
        _items: &[Item],
        _revision: i64,
    ) -> Result<Revisioned<Vec<Item>>, RemoteFailure> {
        Self::fail()
    }
}
