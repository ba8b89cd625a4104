use std::sync::Arc;

use async_trait::async_trait;
use offbox_core::{CacheEntry, CacheKey, StoreName};

use crate::{DeleteStatus, StoreError};

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared handle to a store, as handed out by a [`StoreRegistry`](crate::StoreRegistry).
pub type ArcStore = Arc<dyn CacheStore>;

/// A single named key → entry mapping.
///
/// `write` must replace the whole entry atomically: concurrent readers of
/// the same key observe either the previous entry or the new one.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the entry stored under `key`, if any.
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<CacheEntry>>;

    /// Stores `entry` under `key`, replacing any previous entry.
    ///
    /// No validation happens here; callers go through [`put`](Self::put).
    async fn write(&self, key: &CacheKey, entry: CacheEntry) -> StoreResult<()>;

    /// Removes the entry under `key`.
    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus>;

    /// Every key currently held, in no particular order.
    async fn keys(&self) -> StoreResult<Vec<CacheKey>>;

    /// The name this store is registered under.
    fn name(&self) -> &StoreName;

    /// Validated write: rejects non-`GET` keys and non-`200` entries before
    /// touching the underlying store.
    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> StoreResult<()> {
        if key.method().as_str() != "GET" {
            return Err(StoreError::UnsupportedMethod(key.method().to_string()));
        }
        if !entry.response().is_storable() {
            return Err(StoreError::UnsupportedStatus(
                entry.response().status().as_u16(),
            ));
        }
        self.write(key, entry).await
    }
}

#[async_trait]
impl<T> CacheStore for Arc<T>
where
    T: CacheStore + ?Sized,
{
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<CacheEntry>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry) -> StoreResult<()> {
        (**self).write(key, entry).await
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn keys(&self) -> StoreResult<Vec<CacheKey>> {
        (**self).keys().await
    }

    fn name(&self) -> &StoreName {
        (**self).name()
    }
}
