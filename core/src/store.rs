// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

use crate::{Item, StoreError};

/// Durable persistence of items, addressed by id.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Stores a new item. Fails with [`StoreError::AlreadyExists`] if the id is taken.
    async fn insert(&self, item: &Item) -> Result<(), StoreError>;

    /// Removes the item stored under `id` and returns it.
    async fn delete(&self, id: &str) -> Result<Item, StoreError>;

    /// Replaces the item stored under `id` with `item`, which may carry another id.
    /// Fails with [`StoreError::AlreadyExists`] if that other id is already stored.
    async fn update(&self, id: &str, item: &Item) -> Result<(), StoreError>;

    /// Loads every stored item.
    async fn load_all(&self) -> Result<Vec<Item>, StoreError>;

    /// Writes `item` whether or not its id is already stored.
    async fn upsert(&self, item: &Item) -> Result<(), StoreError> {
        match self.update(item.id(), item).await {
            Err(StoreError::NotFound(_)) => self.insert(item).await,
            result => result,
        }
    }
}
