//! Static store pre-warming.

use futures::future::{join_all, try_join_all};
use http::header::{CACHE_CONTROL, HeaderValue};
use http::{HeaderMap, StatusCode};
use offbox_backend::{ArcStore, CacheStore, StoreRegistry};
use offbox_core::{
    CacheEntry, CacheKey, HttpResponse, Origin, RequestDescriptor, ResourceKind, StoreName,
};
use tracing::{debug, info, warn};
use url::Url;

use super::AssetManifest;
use crate::error::{AssetError, LifecycleError};

/// Result of pre-warming one optional asset.
#[derive(Debug)]
pub struct AssetOutcome {
    /// Manifest entry as written.
    pub asset: String,
    /// Resolved URL on success.
    pub result: Result<Url, AssetError>,
}

impl AssetOutcome {
    /// Whether the asset landed in the static store.
    pub fn is_cached(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-item outcome of an install.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Required assets, all cached.
    pub required: Vec<Url>,
    /// Optional assets, each cached or not on its own.
    pub optional: Vec<AssetOutcome>,
}

impl InstallReport {
    /// Optional assets that could not be cached.
    pub fn failed_optional(&self) -> impl Iterator<Item = &AssetOutcome> {
        self.optional.iter().filter(|outcome| !outcome.is_cached())
    }
}

/// Fills the static store from the manifest.
///
/// Required and optional batches run concurrently. When the required batch
/// fails every entry it replaced is restored, and a static store this call
/// created is deleted again.
pub(crate) async fn prewarm(
    registry: &dyn StoreRegistry,
    origin: &dyn Origin,
    name: &StoreName,
    base: &Url,
    manifest: &AssetManifest,
) -> Result<InstallReport, LifecycleError> {
    let existed = registry.get(name).await?.is_some();
    let store = registry.open(name).await?;
    info!(
        store = %name,
        required = manifest.required.len(),
        optional = manifest.optional.len(),
        "Pre-warming static store"
    );

    let (required, optional) = tokio::join!(
        install_required(origin, &store, base, &manifest.required),
        install_optional(origin, &store, base, &manifest.optional),
    );

    match required {
        Ok(required) => Ok(InstallReport { required, optional }),
        Err(error) => {
            if !existed {
                if let Err(error) = registry.delete_store(name).await {
                    warn!(store = %name, %error, "Failed to drop static store of failed install");
                }
            }
            Err(error)
        }
    }
}

async fn install_required(
    origin: &dyn Origin,
    store: &ArcStore,
    base: &Url,
    assets: &[String],
) -> Result<Vec<Url>, LifecycleError> {
    let fetches = assets.iter().map(|asset| async move {
        let url = resolve(base, asset).map_err(|error| LifecycleError::required(asset, error))?;
        let response = fetch_asset(origin, &url, true)
            .await
            .map_err(|error| LifecycleError::required(url.as_str(), error))?;
        Ok::<_, LifecycleError>((url, response))
    });
    let fetched = try_join_all(fetches).await?;

    let mut written = Vec::with_capacity(fetched.len());
    for (url, response) in fetched {
        let key = CacheKey::get(&url);
        let previous = match store.read(&key).await {
            Ok(previous) => previous,
            Err(error) => {
                rollback(store, written).await;
                return Err(LifecycleError::required(url.as_str(), error));
            }
        };
        if let Err(error) = store.put(&key, CacheEntry::new(response)).await {
            rollback(store, written).await;
            return Err(LifecycleError::required(url.as_str(), error));
        }
        written.push(Written { url, key, previous });
    }
    Ok(written.into_iter().map(|written| written.url).collect())
}

/// A required asset already in the store, with the entry it replaced.
struct Written {
    url: Url,
    key: CacheKey,
    previous: Option<CacheEntry>,
}

async fn install_optional(
    origin: &dyn Origin,
    store: &ArcStore,
    base: &Url,
    assets: &[String],
) -> Vec<AssetOutcome> {
    let attempts = assets.iter().map(|asset| async move {
        let result = cache_optional(origin, store, base, asset).await;
        if let Err(error) = &result {
            warn!(%asset, %error, "Could not cache optional asset");
        }
        AssetOutcome {
            asset: asset.clone(),
            result,
        }
    });
    join_all(attempts).await
}

async fn cache_optional(
    origin: &dyn Origin,
    store: &ArcStore,
    base: &Url,
    asset: &str,
) -> Result<Url, AssetError> {
    let url = resolve(base, asset)?;
    let response = fetch_asset(origin, &url, false).await?;
    store.put(&CacheKey::get(&url), CacheEntry::new(response)).await?;
    Ok(url)
}

/// Fetches one asset; `reload` bypasses intermediate HTTP caches.
async fn fetch_asset(origin: &dyn Origin, url: &Url, reload: bool) -> Result<HttpResponse, AssetError> {
    let mut request = RequestDescriptor::get(url.clone(), ResourceKind::Other);
    if reload {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        request = request.with_headers(headers);
    }
    let response = origin.fetch(&request).await?;
    if response.status() != StatusCode::OK {
        return Err(AssetError::Status(response.status()));
    }
    Ok(response)
}

/// Puts back what a failed required batch replaced, newest first, so a
/// static store shared with the active version serves what it did before.
async fn rollback(store: &ArcStore, written: Vec<Written>) {
    let count = written.len();
    for Written { url, key, previous } in written.into_iter().rev() {
        let result = match previous {
            Some(entry) => store.write(&key, entry).await,
            None => store.remove(&key).await.map(|_| ()),
        };
        if let Err(error) = result {
            warn!(%url, %error, "Failed to roll back required asset");
        }
    }
    debug!(count, "Rolled back required assets");
}

fn resolve(base: &Url, asset: &str) -> Result<Url, AssetError> {
    base.join(asset).map_err(|source| AssetError::InvalidUrl {
        url: asset.to_owned(),
        source,
    })
}
