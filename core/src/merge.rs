// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Last-write-wins merging of server items into the local map.

use std::collections::{HashMap, HashSet};

use crate::Item;

/// Whether `server` should replace `local`.
///
/// The later `changed_at` wins; a missing one is older than any timestamp,
/// and ties or double absence keep the local copy.
#[must_use]
pub fn server_wins(local: &Item, server: &Item) -> bool {
    match (local.changed_at(), server.changed_at()) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(l), Some(s)) => s > l,
    }
}

/// What [`merge_into`] changed.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Server items that were unknown locally.
    pub inserted: Vec<Item>,
    /// Server items that replaced an older local copy.
    pub replaced: Vec<Item>,
    /// Whether the merged map still differs from the server list.
    pub diverged: bool,
}

/// Merges `server` into `items`.
///
/// Local-only items stay. Ids in `pinned` keep their local state, present
/// or absent, whatever the server says.
pub fn merge_into(
    items: &mut HashMap<String, Item>,
    server: Vec<Item>,
    pinned: &HashSet<String>,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    let mut server_ids = HashSet::with_capacity(server.len());

    for incoming in server {
        server_ids.insert(incoming.id().to_string());
        if pinned.contains(incoming.id()) {
            outcome.diverged |= items.get(incoming.id()) != Some(&incoming);
            continue;
        }

        match items.get(incoming.id()) {
            None => {
                items.insert(incoming.id().to_string(), incoming.clone());
                outcome.inserted.push(incoming);
            }
            Some(local) if server_wins(local, &incoming) => {
                items.insert(incoming.id().to_string(), incoming.clone());
                outcome.replaced.push(incoming);
            }
            Some(local) => outcome.diverged |= *local != incoming,
        }
    }

    outcome.diverged |= items.keys().any(|id| !server_ids.contains(id));
    outcome
}
