// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tick_remote::{TodoElement, WireImportance};
use uuid::Uuid;

use crate::ItemError;

/// How important an item is.
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Importance {
    /// Can wait.
    #[serde(rename = "low")]
    Low,

    /// The default.
    #[default]
    #[serde(rename = "basic")]
    Normal,

    /// Needs attention first.
    #[serde(rename = "important")]
    High,
}

impl Importance {
    #[allow(clippy::trivially_copy_pass_by_ref)] // required by skip_serializing_if
    const fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl AsRef<str> for Importance {
    fn as_ref(&self) -> &str {
        match self {
            Importance::Low => "low",
            Importance::Normal => "normal",
            Importance::High => "high",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Importance {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Ok(Importance::Low),
            "normal" | "basic" => Ok(Importance::Normal),
            "high" | "important" => Ok(Importance::High),
            _ => Err(format!("unknown importance: {value}")),
        }
    }
}

impl From<WireImportance> for Importance {
    fn from(value: WireImportance) -> Self {
        match value {
            WireImportance::Low => Importance::Low,
            WireImportance::Basic => Importance::Normal,
            WireImportance::Important => Importance::High,
        }
    }
}

impl From<Importance> for WireImportance {
    fn from(value: Importance) -> Self {
        match value {
            Importance::Low => WireImportance::Low,
            Importance::Normal => WireImportance::Basic,
            Importance::High => WireImportance::Important,
        }
    }
}

/// One to-do item.
///
/// Items are immutable values: every change produces a new `Item` with the
/// same id. All timestamps are whole seconds, and a constructed item always
/// satisfies `deadline >= created_at` and `changed_at >= created_at`.
///
/// The serde form is the on-disk record: `importance` is omitted when normal,
/// `deadline` and `changed_at` when unset, and decoding validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord", into = "ItemRecord")]
pub struct Item {
    id: String,
    text: String,
    importance: Importance,
    done: bool,
    created_at: Timestamp,
    deadline: Option<Timestamp>,
    changed_at: Option<Timestamp>,
}

impl Item {
    /// Builds an item from its parts, validating them.
    pub fn from_parts(
        id: String,
        text: String,
        importance: Importance,
        done: bool,
        created_at: Timestamp,
        deadline: Option<Timestamp>,
        changed_at: Option<Timestamp>,
    ) -> Result<Self, ItemError> {
        let item = Self {
            id,
            text,
            importance,
            done,
            created_at: truncate(created_at),
            deadline: deadline.map(truncate),
            changed_at: changed_at.map(truncate),
        };
        item.validate()?;
        Ok(item)
    }

    fn validate(&self) -> Result<(), ItemError> {
        if self.text.trim().is_empty() {
            return Err(ItemError::EmptyText);
        }
        if self.deadline.is_some_and(|d| d < self.created_at) {
            return Err(ItemError::DeadlineBeforeCreation);
        }
        if self.changed_at.is_some_and(|c| c < self.created_at) {
            return Err(ItemError::ChangedBeforeCreation);
        }
        Ok(())
    }

    /// The unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The user content.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The importance.
    #[must_use]
    pub const fn importance(&self) -> Importance {
        self.importance
    }

    /// Whether the item is completed.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// When the item was created.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// The optional deadline.
    #[must_use]
    pub const fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// When the item was last edited, `None` if never.
    #[must_use]
    pub const fn changed_at(&self) -> Option<Timestamp> {
        self.changed_at
    }

    /// A copy with the done flag set to `done`, touched at `at`.
    #[must_use]
    pub fn mark_done(&self, done: bool, at: Timestamp) -> Self {
        Self {
            done,
            ..self.touched(at)
        }
    }

    /// A copy whose change time is `at`, never earlier than the creation time.
    #[must_use]
    pub fn touched(&self, at: Timestamp) -> Self {
        Self {
            changed_at: Some(truncate(at).max(self.created_at)),
            ..self.clone()
        }
    }

    /// Encodes the item for the backend.
    #[must_use]
    pub fn to_element(&self, device_id: &str) -> TodoElement {
        TodoElement {
            id: self.id.clone(),
            text: self.text.clone(),
            importance: self.importance.into(),
            deadline: self.deadline.map(|t| t.as_second()),
            done: self.done,
            created_at: self.created_at.as_second(),
            changed_at: self.changed_at.map(|t| t.as_second()),
            last_updated_by: device_id.to_string(),
        }
    }
}

impl TryFrom<TodoElement> for Item {
    type Error = ItemError;

    fn try_from(e: TodoElement) -> Result<Self, Self::Error> {
        Item::from_parts(
            e.id,
            e.text,
            e.importance.into(),
            e.done,
            from_second(e.created_at)?,
            e.deadline.map(from_second).transpose()?,
            e.changed_at.map(from_second).transpose()?,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemRecord {
    id: String,
    text: String,
    #[serde(default, skip_serializing_if = "Importance::is_normal")]
    importance: Importance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deadline: Option<i64>,
    done: bool,
    created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    changed_at: Option<i64>,
}

impl TryFrom<ItemRecord> for Item {
    type Error = ItemError;

    fn try_from(r: ItemRecord) -> Result<Self, Self::Error> {
        Item::from_parts(
            r.id,
            r.text,
            r.importance,
            r.done,
            from_second(r.created_at)?,
            r.deadline.map(from_second).transpose()?,
            r.changed_at.map(from_second).transpose()?,
        )
    }
}

impl From<Item> for ItemRecord {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            text: item.text,
            importance: item.importance,
            deadline: item.deadline.map(|t| t.as_second()),
            done: item.done,
            created_at: item.created_at.as_second(),
            changed_at: item.changed_at.map(|t| t.as_second()),
        }
    }
}

/// A new item that has not been given an id yet.
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    /// The user content.
    pub text: String,

    /// The importance.
    pub importance: Importance,

    /// The optional deadline.
    pub deadline: Option<Timestamp>,

    /// Whether the item starts out completed.
    pub done: bool,
}

impl ItemDraft {
    /// Turns the draft into an item with a fresh id, created at `now`.
    pub fn into_item(self, now: Timestamp) -> Result<Item, ItemError> {
        Item::from_parts(
            Uuid::new_v4().to_string(),
            self.text,
            self.importance,
            self.done,
            now,
            self.deadline,
            None,
        )
    }
}

/// Partial update for an item.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    /// New text.
    pub text: Option<String>,

    /// New importance.
    pub importance: Option<Importance>,

    /// New deadline, `Some(None)` clears it.
    pub deadline: Option<Option<Timestamp>>,

    /// New done flag.
    pub done: Option<bool>,
}

impl ItemPatch {
    /// Is this patch empty, meaning no fields are set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.importance.is_none()
            && self.deadline.is_none()
            && self.done.is_none()
    }

    /// Applies the patch to `item`, producing a copy touched at `now`.
    pub fn apply(&self, item: &Item, now: Timestamp) -> Result<Item, ItemError> {
        let mut next = item.touched(now);
        if let Some(text) = &self.text {
            next.text.clone_from(text);
        }
        if let Some(importance) = self.importance {
            next.importance = importance;
        }
        if let Some(deadline) = self.deadline {
            next.deadline = deadline.map(truncate);
        }
        if let Some(done) = self.done {
            next.done = done;
        }
        next.validate()?;
        Ok(next)
    }
}

fn truncate(t: Timestamp) -> Timestamp {
    // whole seconds always fit
    Timestamp::from_second(t.as_second()).unwrap_or(t)
}

fn from_second(s: i64) -> Result<Timestamp, ItemError> {
    Timestamp::from_second(s).map_err(|_| ItemError::InvalidTimestamp(s))
}
