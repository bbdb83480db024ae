// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Client for the to-do list backend: a bearer-authenticated JSON endpoint that
//! guards every mutation with an `X-Last-Known-Revision` header.

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

mod client;
mod config;
mod error;
mod http;
mod types;

pub use crate::client::TodoClient;
pub use crate::config::{AuthMethod, RemoteConfig};
pub use crate::error::RemoteError;
pub use crate::types::{Revisioned, TodoElement, WireImportance};
