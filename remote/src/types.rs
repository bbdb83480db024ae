// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Importance as spelled on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireImportance {
    /// Low importance.
    Low,
    /// The implicit default, omitted when encoding.
    #[default]
    Basic,
    /// High importance.
    Important,
}

impl WireImportance {
    /// Whether this is the implicit default.
    #[must_use]
    #[allow(clippy::trivially_copy_pass_by_ref)] // required by skip_serializing_if
    pub const fn is_basic(&self) -> bool {
        matches!(self, Self::Basic)
    }
}

/// One to-do item as exchanged with the backend.
///
/// Timestamps are Unix epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoElement {
    /// Client-generated identifier.
    pub id: String,
    /// User content.
    pub text: String,
    /// Importance, `basic` when absent.
    #[serde(default, skip_serializing_if = "WireImportance::is_basic")]
    pub importance: WireImportance,
    /// Optional deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
    /// Completion flag.
    pub done: bool,
    /// Creation time.
    pub created_at: i64,
    /// Last modification time, absent for never-edited items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<i64>,
    /// Device that last touched the item.
    #[serde(default)]
    pub last_updated_by: String,
}

/// A payload paired with the server revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revisioned<T> {
    /// The payload.
    pub value: T,
    /// Server revision after the call.
    pub revision: i64,
}

impl<T> Revisioned<T> {
    /// Wraps `value` at `revision`.
    pub const fn new(value: T, revision: i64) -> Self {
        Self { value, revision }
    }

    /// Maps the payload, keeping the revision.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Revisioned<U> {
        Revisioned {
            value: f(self.value),
            revision: self.revision,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListRequest<'a> {
    pub list: &'a [TodoElement],
}

#[derive(Debug, Serialize)]
pub(crate) struct ElementRequest<'a> {
    pub element: &'a TodoElement,
}

/// List envelope; elements stay raw so one bad record does not sink the batch.
/// The `status` field the backend sends alongside is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    pub list: Vec<serde_json::Value>,
    pub revision: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ElementResponse {
    pub element: TodoElement,
    pub revision: Option<i64>,
}
