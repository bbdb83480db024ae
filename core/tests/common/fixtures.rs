// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Item factories for integration tests.

use jiff::Timestamp;
use tick_core::{Importance, Item, ItemDraft};

/// Creation time shared by fixture items.
const CREATED_AT: i64 = 1_700_000_000;

/// A timestamp `offset` seconds after the fixture creation time.
#[must_use]
pub fn at(offset: i64) -> Timestamp {
    Timestamp::from_second(CREATED_AT + offset).expect("valid timestamp")
}

/// A fresh, never-edited item with a random id.
#[must_use]
pub fn item(text: &str) -> Item {
    ItemDraft {
        text: text.to_string(),
        importance: Importance::Normal,
        ..Default::default()
    }
    .into_item(at(0))
    .expect("valid draft")
}

/// A never-edited item with a fixed id.
#[must_use]
pub fn item_with_id(id: &str, text: &str) -> Item {
    item_changed_at(id, text, None)
}

/// An item with a fixed id, edited `changed` seconds after creation.
#[must_use]
pub fn item_changed_at(id: &str, text: &str, changed: Option<i64>) -> Item {
    Item::from_parts(
        id.to_string(),
        text.to_string(),
        Importance::Normal,
        false,
        at(0),
        None,
        changed.map(at),
    )
    .expect("valid item")
}
