//! Intercepted request descriptor.

use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::CacheKey;

/// What kind of resource the requesting page declared it is loading.
///
/// Mirrors the destination a browser attaches to a request
/// (`<link rel=stylesheet>` is `Style`, a navigation is `Document`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Stylesheet.
    Style,
    /// Script.
    Script,
    /// Image.
    Image,
    /// Web font.
    Font,
    /// Top-level page navigation.
    Document,
    /// Anything else, including `fetch()` calls with no declared kind.
    #[default]
    #[serde(other)]
    Other,
}

/// An intercepted request: method, absolute URL, declared resource kind
/// and the headers to forward to the origin.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    kind: ResourceKind,
    headers: HeaderMap,
}

impl RequestDescriptor {
    /// Creates a request with no headers.
    pub fn new(method: Method, url: Url, kind: ResourceKind) -> Self {
        Self {
            method,
            url,
            kind,
            headers: HeaderMap::new(),
        }
    }

    /// Creates a `GET` request.
    pub fn get(url: Url, kind: ResourceKind) -> Self {
        Self::new(Method::GET, url, kind)
    }

    /// Replaces the forwarded headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Absolute request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Declared resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Headers forwarded to the origin.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The key this request is looked up and stored under.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.method.clone(), &self.url)
    }

    /// Whether a response to this request may be written to a store.
    pub fn is_storable(&self) -> bool {
        self.method == Method::GET
    }
}
