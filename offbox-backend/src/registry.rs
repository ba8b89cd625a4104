use std::collections::BTreeSet;

use async_trait::async_trait;
use offbox_core::{CacheEntry, CacheKey, StoreName};
use tracing::{debug, info, warn};

use crate::{ArcStore, CacheStore, DeleteStatus, StoreError, StoreResult};

/// Outcome of a [`StoreRegistry::purge_stale`] or [`StoreRegistry::clear`] sweep.
///
/// A failed delete is recorded and the sweep moves on to the next store.
#[derive(Debug, Default)]
pub struct PurgeReport {
    /// Stores that were deleted.
    pub deleted: Vec<StoreName>,
    /// Stores that belong to the current generation and were left alone.
    pub kept: Vec<StoreName>,
    /// Stores whose deletion failed.
    pub failed: Vec<(StoreName, StoreError)>,
}

impl PurgeReport {
    /// `true` when nothing had to be deleted and nothing failed.
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty() && self.failed.is_empty()
    }
}

/// Owner of the set of named stores.
///
/// The registry is the only component allowed to create or delete a store.
/// Handles returned by [`open`](Self::open) stay usable after the name is
/// deleted, so deleting store X never disturbs in-flight work on store Y
/// (or on X itself).
#[async_trait]
pub trait StoreRegistry: Send + Sync {
    /// Opens the named store, creating it if absent. Idempotent.
    async fn open(&self, name: &StoreName) -> StoreResult<ArcStore>;

    /// Opens the named store only if it already exists.
    async fn get(&self, name: &StoreName) -> StoreResult<Option<ArcStore>>;

    /// Names of every store currently registered.
    async fn list_names(&self) -> StoreResult<BTreeSet<StoreName>>;

    /// Unregisters the named store. Open handles to it keep working.
    async fn delete_store(&self, name: &StoreName) -> StoreResult<DeleteStatus>;

    /// Deletes every store whose name is not in `current`.
    async fn purge_stale(&self, current: &BTreeSet<StoreName>) -> StoreResult<PurgeReport> {
        let mut report = PurgeReport::default();
        for name in self.list_names().await? {
            if current.contains(&name) {
                report.kept.push(name);
                continue;
            }
            match self.delete_store(&name).await {
                Ok(_) => {
                    info!(store = %name, "Deleted stale cache store");
                    report.deleted.push(name);
                }
                Err(error) => {
                    warn!(store = %name, %error, "Failed to delete stale cache store");
                    report.failed.push((name, error));
                }
            }
        }
        Ok(report)
    }

    /// Deletes every store regardless of generation.
    async fn clear(&self) -> StoreResult<PurgeReport> {
        self.purge_stale(&BTreeSet::new()).await
    }

    /// Looks `key` up in each named store in order and returns the first hit
    /// along with the store it came from.
    ///
    /// Missing stores are skipped without being created. A failing read is
    /// logged and treated as a miss for that store.
    async fn lookup(
        &self,
        names: &[StoreName],
        key: &CacheKey,
    ) -> Option<(StoreName, CacheEntry)> {
        for name in names {
            let store = match self.get(name).await {
                Ok(Some(store)) => store,
                Ok(None) => continue,
                Err(error) => {
                    warn!(store = %name, %error, "Failed to open cache store for lookup");
                    continue;
                }
            };
            match store.read(key).await {
                Ok(Some(entry)) => {
                    debug!(store = %name, %key, "Cache hit");
                    return Some((name.clone(), entry));
                }
                Ok(None) => {}
                Err(error) => warn!(store = %name, %key, %error, "Cache read failed"),
            }
        }
        debug!(%key, "Cache miss");
        None
    }
}
