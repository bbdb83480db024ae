// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! A remote that behaves like the list backend, in memory.
//!
//! It keeps a server list and revision, logs every call, and can be switched
//! offline, made to check revisions, or delayed per call.

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tick_core::{Item, RemoteClient, RemoteFailure, Revisioned};

/// One call received by the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetAll,
    Get(String),
    Add(String, i64),
    Edit(String, i64),
    Delete(String, i64),
    BulkReplace(Vec<String>, i64),
}

#[derive(Debug, Default)]
struct Server {
    items: BTreeMap<String, Item>,
    revision: i64,
    offline: bool,
    check_revision: bool,
    conflicts: u32,
    delays: VecDeque<Duration>,
    rename_on_add: Option<String>,
    rejected_on_bulk: Vec<String>,
    bulk_in_flight: u32,
    max_bulk_in_flight: u32,
    writes_in_flight: BTreeMap<String, u32>,
    overlapping_writes: Vec<String>,
    calls: Vec<Call>,
}

/// Scripted [`RemoteClient`]. Clones share the same server.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRemote {
    server: Arc<Mutex<Server>>,
}

impl ScriptedRemote {
    /// A server holding `items` at `revision`.
    #[must_use]
    pub fn with(items: &[Item], revision: i64) -> Self {
        let remote = Self::default();
        {
            let mut server = remote.lock();
            server.revision = revision;
            for item in items {
                server.items.insert(item.id().to_string(), item.clone());
            }
        }
        remote
    }

    fn lock(&self) -> MutexGuard<'_, Server> {
        self.server.lock().unwrap()
    }

    /// Every call fails as unreachable while set.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Mutations carrying a stale revision fail with a conflict while set.
    pub fn check_revision(&self, check: bool) {
        self.lock().check_revision = check;
    }

    /// The next `n` mutations fail with a conflict.
    pub fn conflict_next(&self, n: u32) {
        self.lock().conflicts = n;
    }

    /// Delays the next calls, one entry per call.
    pub fn delay_next(&self, delays: &[Duration]) {
        self.lock().delays.extend(delays.iter().copied());
    }

    /// Replaces the text of added items, as a normalizing server would.
    pub fn rename_on_add(&self, text: &str) {
        self.lock().rename_on_add = Some(text.to_string());
    }

    /// Drops `id` from every bulk replace, as if another device deleted it.
    pub fn reject_on_bulk(&self, id: &str) {
        self.lock().rejected_on_bulk.push(id.to_string());
    }

    /// The most bulk replaces that were ever in flight at once.
    #[must_use]
    pub fn max_bulk_in_flight(&self) -> u32 {
        self.lock().max_bulk_in_flight
    }

    /// Ids that received a write while another write to them was in flight.
    #[must_use]
    pub fn overlapping_writes(&self) -> Vec<String> {
        self.lock().overlapping_writes.clone()
    }

    /// Puts `item` on the server behind the engine's back.
    pub fn put(&self, item: &Item, revision: i64) {
        let mut server = self.lock();
        server.items.insert(item.id().to_string(), item.clone());
        server.revision = revision;
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn bulk_replaces(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::BulkReplace(..)))
            .count()
    }

    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.lock().items.values().cloned().collect()
    }

    #[must_use]
    pub fn revision(&self) -> i64 {
        self.lock().revision
    }

    /// Logs `call`, waits out its delay, and checks reachability.
    async fn enter(&self, call: Call) -> Result<(), RemoteFailure> {
        let delay = {
            let mut server = self.lock();
            server.calls.push(call);
            server.delays.pop_front()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.lock().offline {
            return Err(RemoteFailure::Unavailable("request timed out".to_string()));
        }
        Ok(())
    }

    /// Runs a single-item write on `id`, noting any overlap with another one.
    async fn writing<T>(&self, id: &str, write: impl Future<Output = T>) -> T {
        {
            let mut guard = self.lock();
            let server = &mut *guard;
            let in_flight = server.writes_in_flight.entry(id.to_string()).or_default();
            *in_flight += 1;
            if *in_flight > 1 {
                server.overlapping_writes.push(id.to_string());
            }
        }
        let result = write.await;
        if let Some(in_flight) = self.lock().writes_in_flight.get_mut(id) {
            *in_flight -= 1;
        }
        result
    }

    fn guard(server: &mut Server, revision: i64) -> Result<(), RemoteFailure> {
        if server.conflicts > 0 {
            server.conflicts -= 1;
            return Err(RemoteFailure::RevisionConflict("unsynchronized data".to_string()));
        }
        if server.check_revision && revision != server.revision {
            return Err(RemoteFailure::RevisionConflict(format!(
                "expected {}, got {revision}",
                server.revision
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteClient for ScriptedRemote {
    fn timeout(&self) -> Duration {
        Duration::from_secs(2)
    }

    async fn get_all(&self) -> Result<Revisioned<Vec<Item>>, RemoteFailure> {
        self.enter(Call::GetAll).await?;
        let server = self.lock();
        Ok(Revisioned::new(
            server.items.values().cloned().collect(),
            server.revision,
        ))
    }

    async fn get(&self, id: &str) -> Result<Revisioned<Item>, RemoteFailure> {
        self.enter(Call::Get(id.to_string())).await?;
        let server = self.lock();
        match server.items.get(id) {
            Some(item) => Ok(Revisioned::new(item.clone(), server.revision)),
            None => Err(RemoteFailure::Unavailable(format!("not found: {id}"))),
        }
    }

    async fn add(&self, item: &Item, revision: i64) -> Result<Revisioned<Item>, RemoteFailure> {
        self.writing(item.id(), async {
            self.enter(Call::Add(item.id().to_string(), revision))
                .await?;
            let mut server = self.lock();
            Self::guard(&mut server, revision)?;

            let stored = match &server.rename_on_add {
                Some(text) => tick_core::ItemPatch {
                    text: Some(text.clone()),
                    ..Default::default()
                }
                .apply(item, item.created_at())
                .expect("valid rename"),
                None => item.clone(),
            };
            server.items.insert(stored.id().to_string(), stored.clone());
            server.revision += 1;
            Ok::<_, RemoteFailure>(Revisioned::new(stored, server.revision))
        })
        .await
    }

    async fn edit(
        &self,
        id: &str,
        item: &Item,
        revision: i64,
    ) -> Result<Revisioned<Item>, RemoteFailure> {
        self.writing(id, async {
            self.enter(Call::Edit(id.to_string(), revision)).await?;
            let mut server = self.lock();
            Self::guard(&mut server, revision)?;

            if server.items.remove(id).is_none() {
                return Err(RemoteFailure::Unavailable(format!("not found: {id}")));
            }
            server.items.insert(item.id().to_string(), item.clone());
            server.revision += 1;
            Ok::<_, RemoteFailure>(Revisioned::new(item.clone(), server.revision))
        })
        .await
    }

    async fn delete(&self, id: &str, revision: i64) -> Result<Revisioned<Item>, RemoteFailure> {
        self.writing(id, async {
            self.enter(Call::Delete(id.to_string(), revision)).await?;
            let mut server = self.lock();
            Self::guard(&mut server, revision)?;

            let Some(item) = server.items.remove(id) else {
                return Err(RemoteFailure::Unavailable(format!("not found: {id}")));
            };
            server.revision += 1;
            Ok::<_, RemoteFailure>(Revisioned::new(item, server.revision))
        })
        .await
    }

    async fn bulk_replace(
        &self,
        items: &[Item],
        revision: i64,
    ) -> Result<Revisioned<Vec<Item>>, RemoteFailure> {
        let ids = items.iter().map(|i| i.id().to_string()).collect();
        {
            let mut server = self.lock();
            server.bulk_in_flight += 1;
            server.max_bulk_in_flight = server.max_bulk_in_flight.max(server.bulk_in_flight);
        }
        let entered = self.enter(Call::BulkReplace(ids, revision)).await;
        let mut server = self.lock();
        server.bulk_in_flight -= 1;
        entered?;
        Self::guard(&mut server, revision)?;

        let rejected = server.rejected_on_bulk.clone();
        server.items = items
            .iter()
            .filter(|i| !rejected.iter().any(|id| id == i.id()))
            .map(|i| (i.id().to_string(), i.clone()))
            .collect();
        server.revision += 1;
        Ok(Revisioned::new(
            server.items.values().cloned().collect(),
            server.revision,
        ))
    }
}
