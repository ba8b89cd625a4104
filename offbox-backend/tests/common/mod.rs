//! Simple in-memory test store and registry implementation using DashMap.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use offbox_backend::{ArcStore, CacheStore, DeleteStatus, StoreError, StoreRegistry, StoreResult};
use offbox_core::{CacheEntry, CacheKey, StoreName};

/// Simple in-memory store for testing using DashMap.
pub struct TestStore {
    name: StoreName,
    entries: DashMap<CacheKey, CacheEntry>,
}

impl TestStore {
    pub fn new(name: StoreName) -> Self {
        Self {
            name,
            entries: DashMap::new(),
        }
    }
}

#[async_trait]
impl CacheStore for TestStore {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<CacheEntry>> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry) -> StoreResult<()> {
        self.entries.insert(key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        Ok(match self.entries.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn keys(&self) -> StoreResult<Vec<CacheKey>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }

    fn name(&self) -> &StoreName {
        &self.name
    }
}

/// Store whose every operation fails.
pub struct FailingStore {
    name: StoreName,
}

fn failure() -> StoreError {
    StoreError::Internal(Box::new(std::io::Error::other("disk on fire")))
}

#[async_trait]
impl CacheStore for FailingStore {
    async fn read(&self, _key: &CacheKey) -> StoreResult<Option<CacheEntry>> {
        Err(failure())
    }

    async fn write(&self, _key: &CacheKey, _entry: CacheEntry) -> StoreResult<()> {
        Err(failure())
    }

    async fn remove(&self, _key: &CacheKey) -> StoreResult<DeleteStatus> {
        Err(failure())
    }

    async fn keys(&self) -> StoreResult<Vec<CacheKey>> {
        Err(failure())
    }

    fn name(&self) -> &StoreName {
        &self.name
    }
}

/// Registry over [`TestStore`]s. Names listed in `undeletable` fail to delete,
/// names listed in `broken` open as [`FailingStore`]s.
#[derive(Clone, Default)]
pub struct TestRegistry {
    stores: Arc<DashMap<StoreName, ArcStore>>,
    undeletable: Arc<DashMap<StoreName, ()>>,
    broken: Arc<DashMap<StoreName, ()>>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn undeletable(self, name: &str) -> Self {
        self.undeletable.insert(StoreName::from(name), ());
        self
    }

    pub fn broken(self, name: &str) -> Self {
        self.broken.insert(StoreName::from(name), ());
        self
    }
}

#[async_trait]
impl StoreRegistry for TestRegistry {
    async fn open(&self, name: &StoreName) -> StoreResult<ArcStore> {
        let store = self
            .stores
            .entry(name.clone())
            .or_insert_with(|| {
                if self.broken.contains_key(name) {
                    Arc::new(FailingStore { name: name.clone() })
                } else {
                    Arc::new(TestStore::new(name.clone()))
                }
            })
            .clone();
        Ok(store)
    }

    async fn get(&self, name: &StoreName) -> StoreResult<Option<ArcStore>> {
        Ok(self.stores.get(name).map(|s| s.clone()))
    }

    async fn list_names(&self) -> StoreResult<BTreeSet<StoreName>> {
        Ok(self.stores.iter().map(|e| e.key().clone()).collect())
    }

    async fn delete_store(&self, name: &StoreName) -> StoreResult<DeleteStatus> {
        if self.undeletable.contains_key(name) {
            return Err(failure());
        }
        Ok(match self.stores.remove(name) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }
}
