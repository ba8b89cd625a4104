use std::sync::Arc;

use offbox_backend::{CacheStore, StoreRegistry};
use offbox_core::{
    CacheEntry, CacheKey, HttpResponse, Origin, RequestClass, RequestDescriptor, StoreName,
};
use tracing::{debug, instrument, warn};

use super::{Served, Strategy, fallback};
use crate::generation::Generations;
use crate::metrics::{record_origin_failure, record_served};
use crate::offload::OffloadManager;

/// Executes the caching strategies for one version.
///
/// The engine reads from and writes into the stores named by its
/// [`Generations`] but never creates anything other than the dynamic store
/// and never deletes a store.
#[derive(Clone)]
pub struct StrategyEngine {
    registry: Arc<dyn StoreRegistry>,
    origin: Arc<dyn Origin>,
    generations: Generations,
    offload: OffloadManager,
}

impl std::fmt::Debug for StrategyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyEngine")
            .field("generations", &self.generations)
            .field("offload", &self.offload)
            .finish_non_exhaustive()
    }
}

impl StrategyEngine {
    /// Creates an engine over the given registry, origin and store names.
    pub fn new(
        registry: Arc<dyn StoreRegistry>,
        origin: Arc<dyn Origin>,
        generations: Generations,
        offload: OffloadManager,
    ) -> Self {
        Self {
            registry,
            origin,
            generations,
            offload,
        }
    }

    /// Store names this engine serves from.
    pub fn generations(&self) -> &Generations {
        &self.generations
    }

    /// Runs the strategy for `class`. Returns `None` only for
    /// [`RequestClass::Passthrough`].
    #[instrument(
        name = "offbox.fetch",
        skip_all,
        fields(method = %request.method(), url = %request.url(), class = %class)
    )]
    pub async fn handle(&self, request: &RequestDescriptor, class: RequestClass) -> Option<Served> {
        let served = match Strategy::for_class(class)? {
            Strategy::NetworkFirst => self.network_first(request, class).await,
            Strategy::CacheFirst => self.cache_first(request, class).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request, class).await,
        };
        record_served(&served, class);
        Some(served)
    }

    /// Origin first; on network failure a cached copy, else a `503`.
    pub async fn network_first(&self, request: &RequestDescriptor, class: RequestClass) -> Served {
        let strategy = Strategy::NetworkFirst;
        match self.origin.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request, &response);
                Served::network(response, strategy)
            }
            Err(error) => {
                warn!(%error, "Network unavailable, falling back to cache");
                record_origin_failure(class);
                match self.lookup(&request.cache_key()).await {
                    Some((store, entry)) => Served::cache(store, entry.into_response(), strategy),
                    None => Served::fallback(fallback::offline(class), strategy),
                }
            }
        }
    }

    /// Cache first; on a miss the origin, and a `404` if that fails too.
    pub async fn cache_first(&self, request: &RequestDescriptor, class: RequestClass) -> Served {
        let strategy = Strategy::CacheFirst;
        if let Some((store, entry)) = self.lookup(&request.cache_key()).await {
            return Served::cache(store, entry.into_response(), strategy);
        }
        match self.origin.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request, &response);
                Served::network(response, strategy)
            }
            Err(error) => {
                warn!(%error, "Failed to fetch resource");
                record_origin_failure(class);
                Served::fallback(fallback::unavailable(), strategy)
            }
        }
    }

    /// Cached copy immediately if there is one, refreshed in the background.
    ///
    /// Without a cached copy the caller waits for the fetch; if that fails
    /// as well the response is a synthesized `503`.
    pub async fn stale_while_revalidate(
        &self,
        request: &RequestDescriptor,
        class: RequestClass,
    ) -> Served {
        let strategy = Strategy::StaleWhileRevalidate;
        let key = request.cache_key();

        if let Some((store, entry)) = self.lookup(&key).await {
            self.revalidate_in_background(request, key, class);
            return Served::cache(store, entry.into_response(), strategy);
        }

        match self.origin.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request, &response);
                Served::network(response, strategy)
            }
            Err(error) => {
                warn!(%error, "Network unavailable and nothing cached");
                record_origin_failure(class);
                Served::fallback(fallback::offline(class), strategy)
            }
        }
    }

    async fn lookup(&self, key: &CacheKey) -> Option<(StoreName, CacheEntry)> {
        self.registry
            .lookup(&self.generations.lookup_order(), key)
            .await
    }

    fn store_in_background(&self, request: &RequestDescriptor, response: &HttpResponse) {
        if !request.is_storable() || !response.is_storable() {
            return;
        }
        let registry = self.registry.clone();
        let store = self.generations.dynamic_store().clone();
        let key = request.cache_key();
        let entry = CacheEntry::new(response.clone());
        self.offload.spawn_write(async move {
            write_entry(registry.as_ref(), &store, &key, entry).await;
        });
    }

    fn revalidate_in_background(&self, request: &RequestDescriptor, key: CacheKey, class: RequestClass) {
        let registry = self.registry.clone();
        let origin = self.origin.clone();
        let store = self.generations.dynamic_store().clone();
        let request = request.clone();
        self.offload.spawn_revalidation(key.clone(), async move {
                match origin.fetch(&request).await {
                    Ok(response) if request.is_storable() && response.is_storable() => {
                        write_entry(registry.as_ref(), &store, &key, CacheEntry::new(response))
                            .await;
                    }
                    Ok(response) => {
                        debug!(%key, status = %response.status(), "Revalidation not stored");
                    }
                    Err(error) => {
                        warn!(%key, %error, "Revalidation failed, keeping cached copy");
                        record_origin_failure(class);
                    }
                }
            });
    }
}

async fn write_entry(
    registry: &dyn StoreRegistry,
    store: &StoreName,
    key: &CacheKey,
    entry: CacheEntry,
) {
    let result = match registry.open(store).await {
        Ok(handle) => handle.put(key, entry).await,
        Err(error) => Err(error),
    };
    match result {
        Ok(()) => debug!(%store, %key, "Stored response"),
        Err(error) => warn!(%store, %key, %error, "Failed to store response"),
    }
}
