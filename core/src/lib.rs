// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Offline-first to-do list core: items, a file cache, and a sync engine
//! that reconciles them with the list backend by last-write-wins.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
#![allow(clippy::missing_errors_doc)]

mod config;
mod engine;
mod error;
mod file_cache;
mod item;
mod merge;
mod observer;
mod remote;
mod store;

pub use crate::config::{APP_NAME, Config, MIN_CATCH_UP_MARGIN};
pub use crate::engine::{SyncEngine, SyncEngineBuilder};
pub use crate::error::{ItemError, RemoteFailure, StoreError, SyncError};
pub use crate::file_cache::FileCache;
pub use crate::item::{Importance, Item, ItemDraft, ItemPatch};
pub use crate::merge::server_wins;
pub use crate::observer::{NoopObserver, SyncObserver};
pub use crate::remote::{OfflineClient, RemoteClient};
pub use crate::store::LocalStore;
pub use tick_remote::{AuthMethod, RemoteConfig, Revisioned};
