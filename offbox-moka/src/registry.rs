//! Registry of named Moka stores.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use offbox_backend::{ArcStore, DeleteStatus, StoreRegistry, StoreResult};
use offbox_core::StoreName;
use tracing::debug;

use crate::builder::MokaRegistryBuilder;
use crate::store::MokaStore;

#[derive(Debug)]
struct MokaRegistryInner {
    stores: DashMap<StoreName, Arc<MokaStore>>,
    initial_capacity: usize,
}

/// In-memory [`StoreRegistry`] holding one [`MokaStore`] per name.
///
/// Cloning is cheap and every clone sees the same set of stores.
///
/// Deleting a name only unlinks it: handles already returned by
/// [`open`](StoreRegistry::open) keep working, so purging store X never
/// disturbs in-flight reads or writes on store Y.
///
/// # Examples
///
/// ```
/// use offbox_moka::MokaRegistry;
///
/// let registry = MokaRegistry::builder().initial_capacity(32).build();
/// # let _ = registry;
/// ```
#[derive(Clone, Debug)]
pub struct MokaRegistry {
    inner: Arc<MokaRegistryInner>,
}

impl MokaRegistry {
    /// Creates a new builder for `MokaRegistry`.
    pub fn builder() -> MokaRegistryBuilder {
        MokaRegistryBuilder::new()
    }

    pub(crate) fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            inner: Arc::new(MokaRegistryInner {
                stores: DashMap::new(),
                initial_capacity,
            }),
        }
    }

    /// Opens a store and returns the concrete type, mostly useful in tests.
    pub fn open_moka(&self, name: &StoreName) -> Arc<MokaStore> {
        self.inner
            .stores
            .entry(name.clone())
            .or_insert_with(|| {
                debug!(store = %name, "Creating cache store");
                Arc::new(MokaStore::new(name.clone(), self.inner.initial_capacity))
            })
            .clone()
    }
}

impl Default for MokaRegistry {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[async_trait]
impl StoreRegistry for MokaRegistry {
    async fn open(&self, name: &StoreName) -> StoreResult<ArcStore> {
        let store: ArcStore = self.open_moka(name);
        Ok(store)
    }

    async fn get(&self, name: &StoreName) -> StoreResult<Option<ArcStore>> {
        Ok(self
            .inner
            .stores
            .get(name)
            .map(|store| Arc::clone(store.value()) as ArcStore))
    }

    async fn list_names(&self) -> StoreResult<BTreeSet<StoreName>> {
        Ok(self
            .inner
            .stores
            .iter()
            .map(|entry| entry.key().clone())
            .collect())
    }

    async fn delete_store(&self, name: &StoreName) -> StoreResult<DeleteStatus> {
        match self.inner.stores.remove(name) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }
}
