// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use jiff::Timestamp;
use tick_remote::{RemoteConfig, Revisioned, TodoClient};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;

use crate::config::MIN_CATCH_UP_MARGIN;
use crate::merge::merge_into;
use crate::{
    Config, FileCache, Item, LocalStore, NoopObserver, OfflineClient, RemoteClient, RemoteFailure,
    StoreError, SyncError, SyncObserver,
};

/// Consecutive revision conflicts after which catch-up stops re-arming itself.
const MAX_REBASES: u32 = 3;

/// Keeps a local item map in step with the list backend.
///
/// Every mutation is applied to the [`LocalStore`] first, then staged into
/// the in-memory map, then sent to the [`RemoteClient`]. Remote failures
/// never reach the caller: they mark the engine dirty and schedule a
/// catch-up, a single bulk replace of the whole map sent once the remote
/// timeout plus a margin has passed. Only a successful bulk replace makes
/// the engine clean again.
///
/// The handle is cheap to clone; clones share state.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

struct Inner {
    store: Box<dyn LocalStore>,
    remote: Box<dyn RemoteClient>,
    observer: Box<dyn SyncObserver>,
    catch_up_delay: Duration,
    state: Mutex<State>,
    reconciling: Mutex<()>,
}

#[derive(Default)]
struct State {
    items: HashMap<String, Item>,
    dirty: bool,
    revision: i64,
    /// A catch-up timer is sleeping.
    armed: bool,
    tasks: Vec<JoinHandle<()>>,
    rebases: u32,
    /// Bumped on every local change to the map.
    epoch: u64,
    /// Ids changed while a list read was in flight, with the epoch of the change.
    touched: HashMap<String, u64>,
    /// Start epochs of list reads in flight.
    reads: Vec<u64>,
    /// Per-id locks held by single-item remote writes until they settle.
    writes: HashMap<String, Arc<Mutex<()>>>,
}

impl State {
    fn put(&mut self, item: Item) {
        self.touch(item.id());
        self.items.insert(item.id().to_string(), item);
    }

    fn remove(&mut self, id: &str) -> Option<Item> {
        self.touch(id);
        self.items.remove(id)
    }

    fn touch(&mut self, id: &str) {
        self.epoch += 1;
        if !self.reads.is_empty() {
            self.touched.insert(id.to_string(), self.epoch);
        }
    }

    fn begin_read(&mut self) -> u64 {
        self.reads.push(self.epoch);
        self.epoch
    }

    /// Ends the read started at `start`, returning the ids changed since.
    fn end_read(&mut self, start: u64) -> HashSet<String> {
        let pinned = self
            .touched
            .iter()
            .filter(|(_, epoch)| **epoch > start)
            .map(|(id, _)| id.clone())
            .collect();

        if let Some(pos) = self.reads.iter().position(|s| *s == start) {
            self.reads.swap_remove(pos);
        }
        match self.reads.iter().min() {
            Some(&oldest) => self.touched.retain(|_, epoch| *epoch > oldest),
            None => self.touched.clear(),
        }
        pinned
    }

    /// Locks for remote writes touching `ids`, in a fixed order.
    fn write_locks(&mut self, ids: &[&str]) -> Vec<Arc<Mutex<()>>> {
        // only the map holds an idle lock
        self.writes.retain(|_, lock| Arc::strong_count(lock) > 1);

        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .map(|id| Arc::clone(self.writes.entry(id.to_string()).or_default()))
            .collect()
    }

    fn advance_revision(&mut self, revision: i64) {
        self.revision = self.revision.max(revision);
    }

    fn is_staged(&self, item: &Item) -> bool {
        self.items.get(item.id()) == Some(item)
    }

    fn snapshot(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.items.values().cloned().collect();
        items.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        items
    }
}

impl SyncEngine {
    /// Starts building an engine over `store` and `remote`.
    pub fn builder(
        store: impl LocalStore + 'static,
        remote: impl RemoteClient + 'static,
    ) -> SyncEngineBuilder {
        SyncEngineBuilder {
            store: Box::new(store),
            remote: Box::new(remote),
            observer: Box::new(NoopObserver),
            margin: MIN_CATCH_UP_MARGIN,
        }
    }

    /// Creates an engine with default settings.
    pub fn new(store: impl LocalStore + 'static, remote: impl RemoteClient + 'static) -> Self {
        Self::builder(store, remote).build()
    }

    /// Creates an engine backed by a [`FileCache`], talking to the backend
    /// described by `remote`, or offline when there is none.
    pub fn open(mut config: Config, remote: Option<RemoteConfig>) -> Result<Self, SyncError> {
        config.normalize()?;
        let root = config
            .cache_dir
            .clone()
            .ok_or_else(|| SyncError::Config("cache directory not set".to_string()))?;
        let store = FileCache::new(root, &config.list)?;
        tracing::debug!(dir = %store.dir().display(), "using file cache");

        let builder = match remote {
            Some(remote) => {
                let client = TodoClient::new(remote)
                    .map_err(|e| SyncError::Config(format!("Failed to create client: {e}")))?;
                Self::builder(store, client)
            }
            None => {
                tracing::info!("no remote configured, working offline");
                Self::builder(store, OfflineClient)
            }
        };
        Ok(builder.catch_up_margin(config.catch_up_margin()).build())
    }

    /// How long a catch-up waits after being scheduled.
    #[must_use]
    pub fn catch_up_delay(&self) -> Duration {
        self.inner.catch_up_delay
    }

    /// Loads the local store, then merges the server list into it.
    ///
    /// Only a local store failure is an error. If the server cannot be
    /// reached the local snapshot is returned and the engine is dirty.
    #[tracing::instrument(skip(self))]
    pub async fn load_all(&self) -> Result<Vec<Item>, SyncError> {
        let start = {
            let mut st = self.inner.state.lock().await;
            let local = self.inner.store.load_all().await?;
            tracing::debug!(count = local.len(), "local items loaded");
            st.items = local
                .into_iter()
                .map(|i| (i.id().to_string(), i))
                .collect();
            st.begin_read()
        };

        let result = self.call(self.inner.remote.get_all()).await;

        let mut st = self.inner.state.lock().await;
        let pinned = st.end_read(start);
        match result {
            Ok(listing) => {
                st.advance_revision(listing.revision);
                let outcome = merge_into(&mut st.items, listing.value, &pinned);
                for item in outcome.inserted.iter().chain(&outcome.replaced) {
                    self.persist(item).await;
                }
                tracing::debug!(
                    inserted = outcome.inserted.len(),
                    replaced = outcome.replaced.len(),
                    diverged = outcome.diverged,
                    revision = st.revision,
                    "server list merged"
                );
                if outcome.diverged {
                    st.dirty = true;
                    self.arm(&mut st);
                }
            }
            Err(err) => {
                tracing::warn!(%err, "could not fetch server list, working offline");
                st.dirty = true;
            }
        }
        Ok(st.snapshot())
    }

    /// Adds `item`. Returns the server copy, or the local one if the server
    /// was not involved.
    #[tracing::instrument(skip(self, item), fields(id = item.id()))]
    pub async fn add(&self, item: Item) -> Result<Item, SyncError> {
        let locks = {
            let mut st = self.inner.state.lock().await;
            self.inner.store.insert(&item).await?;
            st.put(item.clone());
            if st.dirty {
                self.arm(&mut st);
                return Ok(item);
            }
            st.write_locks(&[item.id()])
        };

        let Some((_writing, revision)) = self.begin_write(locks).await else {
            return Ok(item);
        };
        let result = self.call(self.inner.remote.add(&item, revision)).await;
        Ok(self.settle(item, result).await)
    }

    /// Deletes the item with `id` and returns it.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Item, SyncError> {
        let (deleted, locks) = {
            let mut st = self.inner.state.lock().await;
            let stored = match self.inner.store.delete(id).await {
                Ok(item) => Some(item),
                Err(StoreError::NotFound(_)) => None,
                Err(e) => return Err(e.into()),
            };
            let deleted = match (st.remove(id), stored) {
                (Some(item), _) | (None, Some(item)) => item,
                (None, None) => return Err(SyncError::NotFound(id.to_string())),
            };
            if st.dirty {
                self.arm(&mut st);
                return Ok(deleted);
            }
            let locks = st.write_locks(&[id]);
            (deleted, locks)
        };

        let Some((_writing, revision)) = self.begin_write(locks).await else {
            return Ok(deleted);
        };
        let result = self.call(self.inner.remote.delete(id, revision)).await;

        let mut st = self.inner.state.lock().await;
        match result {
            Ok(r) => st.advance_revision(r.revision),
            Err(err) => {
                tracing::warn!(%err, "remote delete failed, will catch up");
                st.dirty = true;
                self.arm(&mut st);
            }
        }
        Ok(deleted)
    }

    /// Replaces the item stored under `id` with `item`.
    #[tracing::instrument(skip(self, item))]
    pub async fn edit(&self, id: &str, item: Item) -> Result<Item, SyncError> {
        let locks = {
            let mut st = self.inner.state.lock().await;
            if item.id() != id && st.items.contains_key(item.id()) {
                return Err(StoreError::AlreadyExists(item.id().to_string()).into());
            }
            self.inner.store.update(id, &item).await?;
            if item.id() != id {
                tracing::warn!(id, new_id = item.id(), "edit changes the item id");
                st.remove(id);
            }
            st.put(item.clone());
            if st.dirty {
                self.arm(&mut st);
                return Ok(item);
            }
            st.write_locks(&[id, item.id()])
        };

        let Some((_writing, revision)) = self.begin_write(locks).await else {
            return Ok(item);
        };
        let result = self.call(self.inner.remote.edit(id, &item, revision)).await;
        Ok(self.settle(item, result).await)
    }

    /// Flips the done flag of the item with `id`.
    pub async fn toggle_done(&self, id: &str) -> Result<Item, SyncError> {
        let current = self
            .get(id)
            .await
            .ok_or_else(|| SyncError::NotFound(id.to_string()))?;
        let next = current.mark_done(!current.is_done(), Timestamp::now());
        self.edit(id, next).await
    }

    /// Arms the catch-up timer unless it is already armed.
    pub async fn schedule_catch_up(&self) {
        let mut st = self.inner.state.lock().await;
        self.arm(&mut st);
    }

    /// Reconciles right away. Returns whether the engine is clean afterwards.
    pub async fn sync_now(&self) -> bool {
        self.reconcile_all().await
    }

    /// Waits until no catch-up is pending or running.
    pub async fn wait_idle(&self) {
        loop {
            let tasks = std::mem::take(&mut self.inner.state.lock().await.tasks);
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                if let Err(err) = task.await {
                    tracing::error!(%err, "catch-up task failed");
                }
            }
        }
    }

    /// All items, oldest first.
    pub async fn items(&self) -> Vec<Item> {
        self.inner.state.lock().await.snapshot()
    }

    /// The item with `id`, if known.
    pub async fn get(&self, id: &str) -> Option<Item> {
        self.inner.state.lock().await.items.get(id).cloned()
    }

    /// Whether local changes may be missing on the server.
    pub async fn is_dirty(&self) -> bool {
        self.inner.state.lock().await.dirty
    }

    /// The last server revision seen.
    pub async fn revision(&self) -> i64 {
        self.inner.state.lock().await.revision
    }

    /// Pushes the whole map to the server and adopts what comes back.
    #[tracing::instrument(skip(self))]
    async fn reconcile_all(&self) -> bool {
        let _running = self.inner.reconciling.lock().await;
        let (items, revision, start) = {
            let mut st = self.inner.state.lock().await;
            (st.snapshot(), st.revision, st.begin_read())
        };
        tracing::debug!(count = items.len(), revision, "reconciling");

        let result = self
            .call(self.inner.remote.bulk_replace(&items, revision))
            .await;

        let mut st = self.inner.state.lock().await;
        let pinned = st.end_read(start);
        match result {
            Ok(Revisioned { value, revision }) => {
                let mut next: HashMap<String, Item> = value
                    .into_iter()
                    .map(|i| (i.id().to_string(), i))
                    .collect();

                let mut diverged = false;
                for id in &pinned {
                    let local = st.items.get(id);
                    if next.get(id) == local {
                        continue;
                    }
                    diverged = true;
                    match local {
                        Some(local) => next.insert(id.clone(), local.clone()),
                        None => next.remove(id),
                    };
                }

                st.items = next;
                st.revision = revision;
                st.rebases = 0;
                self.rewrite_store(&st.items).await;
                st.dirty = diverged;
                if diverged {
                    self.arm(&mut st);
                }

                let snapshot = st.snapshot();
                drop(st);
                tracing::info!(count = snapshot.len(), revision, diverged, "reconciled");
                self.inner.observer.on_items_updated(&snapshot);
                !diverged
            }
            Err(RemoteFailure::RevisionConflict(reason)) => {
                st.dirty = true;
                drop(st);
                tracing::warn!(%reason, "revision conflict, rebasing on server list");
                self.rebase().await;
                false
            }
            Err(err) => {
                st.dirty = true;
                tracing::warn!(%err, "reconciliation failed");
                false
            }
        }
    }

    /// Merges the current server list in after a conflict and retries later.
    async fn rebase(&self) {
        let start = self.inner.state.lock().await.begin_read();
        let result = self.call(self.inner.remote.get_all()).await;

        let mut st = self.inner.state.lock().await;
        let pinned = st.end_read(start);
        match result {
            Ok(listing) => {
                let outcome = merge_into(&mut st.items, listing.value, &pinned);
                for item in outcome.inserted.iter().chain(&outcome.replaced) {
                    self.persist(item).await;
                }
                st.revision = listing.revision;

                if st.rebases < MAX_REBASES {
                    st.rebases += 1;
                    self.arm(&mut st);
                } else {
                    tracing::warn!(attempts = st.rebases, "catch-up keeps conflicting, pausing");
                    st.rebases = 0;
                }
            }
            Err(err) => tracing::warn!(%err, "could not fetch server list to rebase"),
        }
    }

    /// Waits for earlier remote writes to the same ids to settle. Returns the
    /// held locks and the revision to send, or `None` if the engine went dirty
    /// meanwhile and the write is left to the catch-up.
    async fn begin_write(
        &self,
        locks: Vec<Arc<Mutex<()>>>,
    ) -> Option<(Vec<OwnedMutexGuard<()>>, i64)> {
        let mut guards = Vec::with_capacity(locks.len());
        for lock in locks {
            guards.push(lock.lock_owned().await);
        }

        let mut st = self.inner.state.lock().await;
        if st.dirty {
            self.arm(&mut st);
            return None;
        }
        Some((guards, st.revision))
    }

    /// Applies the outcome of a single-item write staged as `staged`.
    async fn settle(&self, staged: Item, result: Result<Revisioned<Item>, RemoteFailure>) -> Item {
        let mut st = self.inner.state.lock().await;
        match result {
            Ok(Revisioned {
                value: server,
                revision,
            }) => {
                st.advance_revision(revision);
                if server != staged && st.is_staged(&staged) {
                    if server.id() != staged.id() {
                        tracing::warn!(id = staged.id(), new_id = server.id(), "server changed the item id");
                        st.remove(staged.id());
                    }
                    st.put(server.clone());
                    if let Err(err) = self.inner.store.update(staged.id(), &server).await {
                        tracing::warn!(id = server.id(), %err, "could not store server copy");
                    }
                }
                server
            }
            Err(err) => {
                tracing::warn!(id = staged.id(), %err, "remote write failed, will catch up");
                st.dirty = true;
                self.arm(&mut st);
                staged
            }
        }
    }

    /// Makes the local store hold exactly `items`.
    async fn rewrite_store(&self, items: &HashMap<String, Item>) {
        let stored: HashMap<String, Item> = match self.inner.store.load_all().await {
            Ok(stored) => stored
                .into_iter()
                .map(|i| (i.id().to_string(), i))
                .collect(),
            Err(err) => {
                tracing::warn!(%err, "could not read local store, rewriting all items");
                HashMap::new()
            }
        };

        for id in stored.keys().filter(|id| !items.contains_key(*id)) {
            if let Err(err) = self.inner.store.delete(id).await {
                tracing::warn!(id, %err, "could not remove stale item");
            }
        }
        for item in items.values() {
            if stored.get(item.id()) != Some(item) {
                self.persist(item).await;
            }
        }
    }

    async fn persist(&self, item: &Item) {
        if let Err(err) = self.inner.store.upsert(item).await {
            tracing::warn!(id = item.id(), %err, "could not store item");
        }
    }

    /// Brackets a remote call with observer notifications.
    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, RemoteFailure>>,
    ) -> Result<T, RemoteFailure> {
        self.inner.observer.on_request_started();
        let result = request.await;
        self.inner.observer.on_request_stopped();
        result
    }

    fn arm(&self, st: &mut State) {
        st.tasks.retain(|task| !task.is_finished());
        if st.armed {
            return;
        }

        st.armed = true;
        let delay = self.inner.catch_up_delay;
        tracing::debug!(?delay, "catch-up scheduled");
        st.tasks
            .push(tokio::spawn(catch_up(Arc::downgrade(&self.inner), delay)));
    }
}

async fn catch_up(inner: Weak<Inner>, delay: Duration) {
    tokio::time::sleep(delay).await;
    let Some(inner) = inner.upgrade() else {
        return;
    };

    let engine = SyncEngine { inner };
    engine.inner.state.lock().await.armed = false;
    engine.reconcile_all().await;
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("catch_up_delay", &self.inner.catch_up_delay)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SyncEngine`].
pub struct SyncEngineBuilder {
    store: Box<dyn LocalStore>,
    remote: Box<dyn RemoteClient>,
    observer: Box<dyn SyncObserver>,
    margin: Duration,
}

impl SyncEngineBuilder {
    /// Sets the observer notified of requests and reconciliations.
    #[must_use]
    pub fn observer(mut self, observer: impl SyncObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Sets the wait added to the remote timeout before a catch-up, at least 100 ms.
    #[must_use]
    pub fn catch_up_margin(mut self, margin: Duration) -> Self {
        self.margin = margin.max(MIN_CATCH_UP_MARGIN);
        self
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> SyncEngine {
        let catch_up_delay = self.remote.timeout() + self.margin;
        SyncEngine {
            inner: Arc::new(Inner {
                store: self.store,
                remote: self.remote,
                observer: self.observer,
                catch_up_delay,
                state: Mutex::new(State::default()),
                reconciling: Mutex::new(()),
            }),
        }
    }
}

impl fmt::Debug for SyncEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngineBuilder")
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}
