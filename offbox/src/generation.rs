//! Generation-tagged store names.

use std::collections::BTreeSet;

use offbox_core::StoreName;

/// The pair of store names a version owns.
///
/// Any store whose name is not one of these two is stale once the version
/// activates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generations {
    static_store: StoreName,
    dynamic_store: StoreName,
}

impl Generations {
    /// Builds `{prefix}-static-{version}` and `{prefix}-dynamic-{version}`.
    pub fn new(prefix: &str, version: &str) -> Self {
        Self::split(prefix, version, version)
    }

    /// Builds names with independent static and dynamic version tags.
    pub fn split(prefix: &str, static_version: &str, dynamic_version: &str) -> Self {
        Self::from_names(
            StoreName::generation(prefix, "static", static_version),
            StoreName::generation(prefix, "dynamic", dynamic_version),
        )
    }

    /// Uses explicit store names.
    pub fn from_names(static_store: StoreName, dynamic_store: StoreName) -> Self {
        Self {
            static_store,
            dynamic_store,
        }
    }

    /// Name of the store pre-warmed at install.
    pub fn static_store(&self) -> &StoreName {
        &self.static_store
    }

    /// Name of the store runtime responses are written to.
    pub fn dynamic_store(&self) -> &StoreName {
        &self.dynamic_store
    }

    /// Both names, as handed to [`purge_stale`](offbox_backend::StoreRegistry::purge_stale).
    pub fn current(&self) -> BTreeSet<StoreName> {
        [self.static_store.clone(), self.dynamic_store.clone()].into()
    }

    /// Order stores are consulted on lookup: dynamic first, then static.
    pub fn lookup_order(&self) -> [StoreName; 2] {
        [self.dynamic_store.clone(), self.static_store.clone()]
    }

    /// Whether `name` belongs to this generation.
    pub fn is_current(&self, name: &StoreName) -> bool {
        name == &self.static_store || name == &self.dynamic_store
    }
}
