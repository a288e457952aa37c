//! Connectivity tracking and the simulated sync pass.
//!
//! Snapshots written while offline are queued under `gabu-pending-sync`.
//! There is no remote target: [`OfflineService::sync_data`] walks the queue
//! with a fixed delay per key, then clears it and stamps `lastSync`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::clock::Clock;
use crate::store::{keys, Store};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineStatus {
    pub is_online: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub pending_changes: usize,
    pub is_syncing: bool,
}

/// A cached snapshot with the time it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedEntry<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of one [`OfflineService::sync_data`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncOutcome {
    Synced { keys: usize },
    NothingPending,
    Offline,
    AlreadySyncing,
}

pub struct OfflineService {
    store: Store,
    clock: Arc<dyn Clock>,
    sync_delay: Duration,
    state: Mutex<ConnectivityState>,
}

#[derive(Debug, Clone, Copy)]
struct ConnectivityState {
    is_online: bool,
    is_syncing: bool,
}

impl OfflineService {
    pub fn new(store: Store, clock: Arc<dyn Clock>, sync_delay: Duration) -> Self {
        Self {
            store,
            clock,
            sync_delay,
            state: Mutex::new(ConnectivityState {
                is_online: true,
                is_syncing: false,
            }),
        }
    }

    /// Set the starting connectivity without triggering a sync.
    pub fn with_online(self, online: bool) -> Self {
        self.state().is_online = online;
        self
    }

    fn state(&self) -> MutexGuard<'_, ConnectivityState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_online(&self) -> bool {
        self.state().is_online
    }

    pub fn status(&self) -> Result<OfflineStatus> {
        let state = *self.state();
        Ok(OfflineStatus {
            is_online: state.is_online,
            last_sync: self.store.get(keys::LAST_SYNC)?,
            pending_changes: self.pending_keys()?.len(),
            is_syncing: state.is_syncing,
        })
    }

    /// Record a connectivity change. Coming back online triggers a sync pass.
    pub async fn set_online(&self, online: bool) -> Result<Option<SyncOutcome>> {
        let was_online = {
            let mut state = self.state();
            std::mem::replace(&mut state.is_online, online)
        };
        if was_online == online {
            return Ok(None);
        }

        if online {
            tracing::info!("connection restored");
            Ok(Some(self.sync_data().await?))
        } else {
            tracing::warn!("connection lost, changes will be queued");
            Ok(None)
        }
    }

    pub fn pending_keys(&self) -> Result<Vec<String>> {
        self.store.get_or_default(keys::PENDING_SYNC)
    }

    /// Write a timestamped snapshot of `data` under the offline namespace.
    /// While offline, `key` is also queued for the next sync.
    pub fn cache_data<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let entry = CachedEntry {
            data,
            timestamp: self.clock.now(),
        };
        self.store.set(&keys::offline_key(key), &entry)?;

        if !self.is_online() {
            let mut pending = self.pending_keys()?;
            if !pending.iter().any(|k| k == key) {
                pending.push(key.to_string());
                self.store.set(keys::PENDING_SYNC, &pending)?;
                tracing::debug!(key, pending = pending.len(), "queued for sync");
            }
        }
        Ok(())
    }

    pub fn get_cached_data<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CachedEntry<T>>> {
        self.store.get(&keys::offline_key(key))
    }

    /// Remove every cached snapshot. Returns how many were removed.
    pub fn clear_cache(&self) -> Result<usize> {
        let cached = self.store.keys_with_prefix(keys::OFFLINE_PREFIX)?;
        for key in &cached {
            self.store.remove(key)?;
        }
        Ok(cached.len())
    }

    /// Replay queued keys. Each key waits the configured delay and is logged;
    /// nothing leaves the device.
    pub async fn sync_data(&self) -> Result<SyncOutcome> {
        {
            let mut state = self.state();
            if !state.is_online {
                return Ok(SyncOutcome::Offline);
            }
            if state.is_syncing {
                return Ok(SyncOutcome::AlreadySyncing);
            }
            state.is_syncing = true;
        }

        let _syncing = SyncingFlag(self);
        self.replay_pending().await
    }

    async fn replay_pending(&self) -> Result<SyncOutcome> {
        let pending = self.pending_keys()?;
        if pending.is_empty() {
            return Ok(SyncOutcome::NothingPending);
        }

        tracing::info!(keys = pending.len(), "sync started");
        for key in &pending {
            tokio::time::sleep(self.sync_delay).await;
            tracing::info!(key = %key, "synced");
        }

        self.store.set(keys::PENDING_SYNC, &Vec::<String>::new())?;
        self.store.set(keys::LAST_SYNC, &self.clock.now())?;
        tracing::info!(keys = pending.len(), "sync complete");
        Ok(SyncOutcome::Synced { keys: pending.len() })
    }
}

/// Clears `is_syncing` when the pass ends, including when the sync future
/// is dropped part way. Unreplayed keys stay queued.
struct SyncingFlag<'a>(&'a OfflineService);

impl Drop for SyncingFlag<'_> {
    fn drop(&mut self) {
        self.0.state().is_syncing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn service() -> OfflineService {
        let clock = Arc::new(ManualClock::new("2026-02-01T08:00:00Z".parse().unwrap()));
        OfflineService::new(Store::in_memory().unwrap(), clock, Duration::from_millis(500))
    }

    #[test]
    fn online_writes_are_not_queued() {
        let svc = service();
        svc.cache_data("notes", &vec!["a"]).unwrap();
        assert!(svc.pending_keys().unwrap().is_empty());

        let cached: CachedEntry<Vec<String>> = svc.get_cached_data("notes").unwrap().unwrap();
        assert_eq!(cached.data, vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn offline_writes_queue_once_and_sync_on_reconnect() {
        let svc = service();
        svc.set_online(false).await.unwrap();

        svc.cache_data("notes", &1).unwrap();
        svc.cache_data("notes", &2).unwrap();
        svc.cache_data("quiz", &3).unwrap();
        assert_eq!(svc.pending_keys().unwrap(), vec!["notes", "quiz"]);
        assert_eq!(svc.sync_data().await.unwrap(), SyncOutcome::Offline);

        let outcome = svc.set_online(true).await.unwrap();
        assert_eq!(outcome, Some(SyncOutcome::Synced { keys: 2 }));

        let status = svc.status().unwrap();
        assert!(status.is_online);
        assert_eq!(status.pending_changes, 0);
        assert!(status.last_sync.is_some());
        assert!(!status.is_syncing);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_sync_can_be_retried() {
        let svc = service();
        svc.set_online(false).await.unwrap();
        svc.cache_data("notes", &1).unwrap();

        let cut_short =
            tokio::time::timeout(Duration::from_millis(100), svc.set_online(true)).await;
        assert!(cut_short.is_err());

        let status = svc.status().unwrap();
        assert!(!status.is_syncing);
        assert_eq!(status.pending_changes, 1);
        assert!(status.last_sync.is_none());

        assert_eq!(svc.sync_data().await.unwrap(), SyncOutcome::Synced { keys: 1 });
        assert!(svc.pending_keys().unwrap().is_empty());
    }

    #[test]
    fn starting_offline_queues_writes() {
        let svc = service().with_online(false);
        assert!(!svc.is_online());
        svc.cache_data("notes", &1).unwrap();
        assert_eq!(svc.pending_keys().unwrap(), vec!["notes"]);
    }

    #[tokio::test]
    async fn sync_with_empty_queue_is_noop() {
        let svc = service();
        assert_eq!(svc.sync_data().await.unwrap(), SyncOutcome::NothingPending);
        assert!(svc.status().unwrap().last_sync.is_none());
    }

    #[test]
    fn clear_cache_removes_snapshots_only() {
        let svc = service();
        svc.cache_data("a", &1).unwrap();
        svc.cache_data("b", &2).unwrap();
        svc.store.set(keys::PROGRESS, &0).unwrap();

        assert_eq!(svc.clear_cache().unwrap(), 2);
        assert!(svc.store.get_raw(keys::PROGRESS).unwrap().is_some());
    }
}
