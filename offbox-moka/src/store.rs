//! Moka store implementation.

use async_trait::async_trait;
use moka::future::Cache;
use offbox_backend::{CacheStore, DeleteStatus, StoreResult};
use offbox_core::{CacheEntry, CacheKey, StoreName};

/// A single named in-memory store powered by Moka.
///
/// Moka inserts whole values, so a concurrent reader of a key sees either
/// the previous entry or the new one. Entries are never evicted by size or
/// age; a store only shrinks through `remove` or by being deleted from its
/// registry.
///
/// # Caveats
///
/// - Data is **not persisted**: stores are lost on process restart
/// - Data is **not shared** across processes
#[derive(Clone)]
pub struct MokaStore {
    name: StoreName,
    cache: Cache<CacheKey, CacheEntry>,
}

impl std::fmt::Debug for MokaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .finish()
    }
}

impl MokaStore {
    /// Creates an empty store.
    pub fn new(name: StoreName, initial_capacity: usize) -> Self {
        let cache = Cache::builder()
            .name(name.as_str())
            .initial_capacity(initial_capacity)
            .build();
        Self { name, cache }
    }

    /// Returns the underlying Moka cache.
    pub fn cache(&self) -> &Cache<CacheKey, CacheEntry> {
        &self.cache
    }
}

#[async_trait]
impl CacheStore for MokaStore {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<CacheEntry>> {
        Ok(self.cache.get(key).await)
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry) -> StoreResult<()> {
        self.cache.insert(key.clone(), entry).await;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        match self.cache.remove(key).await {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn keys(&self) -> StoreResult<Vec<CacheKey>> {
        Ok(self
            .cache
            .iter()
            .map(|(key, _)| (*key).clone())
            .collect())
    }

    fn name(&self) -> &StoreName {
        &self.name
    }
}
