// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use tick_remote::RemoteError;

/// A record that does not describe a valid [`Item`](crate::Item).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    /// The text is empty or whitespace only.
    #[error("item text must not be empty")]
    EmptyText,

    /// The deadline lies before the creation time.
    #[error("deadline lies before creation time")]
    DeadlineBeforeCreation,

    /// The change time lies before the creation time.
    #[error("change time lies before creation time")]
    ChangedBeforeCreation,

    /// An epoch-seconds value outside the supported range.
    #[error("timestamp out of range: {0}")]
    InvalidTimestamp(i64),
}

/// Errors from a [`LocalStore`](crate::LocalStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// No record with this id.
    #[error("item not found: {0}")]
    NotFound(String),

    /// A record with this id already exists.
    #[error("item already exists: {0}")]
    AlreadyExists(String),

    /// The record or its key is unusable.
    #[error("invalid item: {0}")]
    Invalid(String),
}

impl From<ItemError> for StoreError {
    fn from(e: ItemError) -> Self {
        Self::Invalid(e.to_string())
    }
}

/// How a remote call failed, as far as synchronization is concerned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteFailure {
    /// The server could not be used right now.
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// The revision sent with a mutation was stale.
    #[error("revision conflict: {0}")]
    RevisionConflict(String),

    /// The server answered with something that is not a valid item.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<RemoteError> for RemoteFailure {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::RevisionMismatch(_) => Self::RevisionConflict(e.to_string()),
            RemoteError::InvalidResponse(_) => Self::MalformedResponse(e.to_string()),
            _ => Self::Unavailable(e.to_string()),
        }
    }
}

impl From<ItemError> for RemoteFailure {
    fn from(e: ItemError) -> Self {
        Self::MalformedResponse(e.to_string())
    }
}

/// Errors surfaced to callers of [`SyncEngine`](crate::SyncEngine).
///
/// Remote failures never show up here; they only make the engine dirty.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The local leg of an operation failed.
    #[error("local store: {0}")]
    LocalStore(#[from] StoreError),

    /// The engine does not know the item.
    #[error("no item with id {0}")]
    NotFound(String),

    /// The engine could not be set up.
    #[error("configuration: {0}")]
    Config(String),
}
