//! Scripted origin and scope helpers shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, StatusCode};
use offbox::{
    Generations, HttpResponse, Origin, OriginError, RequestDescriptor, ResourceKind, Scope,
    VersionConfig,
};
use offbox::{CacheEntry, CacheKey, StoreName};
use offbox_backend::{ArcStore, CacheStore, DeleteStatus, StoreError, StoreRegistry, StoreResult};
use offbox_core::OriginResult;
use offbox_moka::MokaRegistry;
use url::Url;

pub const BASE: &str = "https://app.example/";

pub fn url(path: &str) -> Url {
    Url::parse(BASE).unwrap().join(path).unwrap()
}

pub fn request(path: &str, kind: ResourceKind) -> RequestDescriptor {
    RequestDescriptor::get(url(path), kind)
}

pub fn html(body: &str) -> HttpResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
    headers.insert("x-served-by", HeaderValue::from_static("origin"));
    HttpResponse::new(StatusCode::OK, headers, body.to_owned())
}

/// Origin answering from a table of canned responses.
///
/// Unknown URLs get a `404`. While offline every fetch fails with
/// [`OriginError::Unreachable`]. Calls are counted per URL.
#[derive(Default)]
pub struct MockOrigin {
    routes: DashMap<String, HttpResponse>,
    hits: DashMap<String, usize>,
    calls: AtomicUsize,
    offline: AtomicBool,
}

impl MockOrigin {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, path: &str, response: HttpResponse) {
        self.routes.insert(url(path).to_string(), response);
    }

    pub fn ok(&self, path: &str, body: &str) {
        self.route(path, html(body));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, path: &str) -> usize {
        self.hits.get(url(path).as_str()).map(|n| *n).unwrap_or(0)
    }
}

#[async_trait]
impl Origin for MockOrigin {
    async fn fetch(&self, request: &RequestDescriptor) -> OriginResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.hits.entry(request.url().to_string()).or_insert(0) += 1;
        if self.offline.load(Ordering::SeqCst) {
            return Err(OriginError::Unreachable(Box::new(std::io::Error::other(
                "network is down",
            ))));
        }
        Ok(self
            .routes
            .get(request.url().as_str())
            .map(|response| response.clone())
            .unwrap_or_else(|| HttpResponse::text(StatusCode::NOT_FOUND, "not found")))
    }
}

pub fn scope(origin: &Arc<MockOrigin>) -> (Scope, MokaRegistry) {
    let registry = MokaRegistry::default();
    let scope = Scope::builder(Url::parse(BASE).unwrap())
        .registry(registry.clone())
        .origin(origin.clone())
        .build();
    (scope, registry)
}

pub fn version(tag: &str) -> VersionConfig {
    VersionConfig::new(tag, Generations::new("app", tag))
}

/// A scope with version `v1` installed and active.
pub async fn active_scope(origin: &Arc<MockOrigin>) -> (Scope, MokaRegistry) {
    let (scope, registry) = scope(origin);
    scope.install(version("v1")).await.unwrap();
    (scope, registry)
}

/// Moka registry that can be told to fail one upcoming write.
///
/// The countdown is shared by every store the registry hands out; `0`
/// means no failure is scheduled.
#[derive(Clone)]
pub struct FlakyRegistry {
    inner: MokaRegistry,
    writes_left: Arc<AtomicUsize>,
}

impl FlakyRegistry {
    pub fn new() -> Self {
        Self {
            inner: MokaRegistry::default(),
            writes_left: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes the `nth` write from now (1-based) fail. Later writes succeed.
    pub fn fail_nth_write(&self, nth: usize) {
        self.writes_left.store(nth, Ordering::SeqCst);
    }

    fn wrap(&self, store: ArcStore) -> ArcStore {
        Arc::new(FlakyStore {
            inner: store,
            writes_left: self.writes_left.clone(),
        })
    }
}

struct FlakyStore {
    inner: ArcStore,
    writes_left: Arc<AtomicUsize>,
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<CacheEntry>> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry) -> StoreResult<()> {
        let countdown = self
            .writes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if countdown == Ok(1) {
            return Err(StoreError::Internal("disk full".into()));
        }
        self.inner.write(key, entry).await
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        self.inner.remove(key).await
    }

    async fn keys(&self) -> StoreResult<Vec<CacheKey>> {
        self.inner.keys().await
    }

    fn name(&self) -> &StoreName {
        self.inner.name()
    }
}

#[async_trait]
impl StoreRegistry for FlakyRegistry {
    async fn open(&self, name: &StoreName) -> StoreResult<ArcStore> {
        Ok(self.wrap(self.inner.open(name).await?))
    }

    async fn get(&self, name: &StoreName) -> StoreResult<Option<ArcStore>> {
        Ok(self.inner.get(name).await?.map(|store| self.wrap(store)))
    }

    async fn list_names(&self) -> StoreResult<BTreeSet<StoreName>> {
        self.inner.list_names().await
    }

    async fn delete_store(&self, name: &StoreName) -> StoreResult<DeleteStatus> {
        self.inner.delete_store(name).await
    }
}
