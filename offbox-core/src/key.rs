//! Cache key type.
//!
//! A [`CacheKey`] is the canonical identity of a cached item: the request
//! method plus its absolute URL. The fragment is not part of the identity,
//! so `https://app/page#top` and `https://app/page` share an entry.
//!
//! ```
//! use http::Method;
//! use offbox_core::CacheKey;
//! use url::Url;
//!
//! let url = Url::parse("https://app.example/css/styles.css#x").unwrap();
//! let key = CacheKey::new(Method::GET, &url);
//! assert_eq!(key.to_string(), "GET https://app.example/css/styles.css");
//! ```
//!
//! ## Performance
//!
//! [`CacheKey`] wraps its data in an `Arc`, so cloning a key (which happens
//! on every background write) only bumps a reference count.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use http::Method;
use url::Url;

#[derive(Debug, Eq, PartialEq, Hash)]
struct CacheKeyInner {
    method: Method,
    url: Url,
}

/// Identity of a cached response: method + absolute URL without fragment.
#[derive(Clone, Debug)]
pub struct CacheKey {
    inner: Arc<CacheKeyInner>,
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.inner.method, self.inner.url)
    }
}

impl CacheKey {
    /// Creates a key from a method and URL, dropping the URL fragment.
    pub fn new(method: Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        CacheKey {
            inner: Arc::new(CacheKeyInner { method, url }),
        }
    }

    /// Shorthand for a `GET` key, the only kind stores accept writes for.
    pub fn get(url: &Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Returns the request method part of the key.
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Returns the URL part of the key.
    pub fn url(&self) -> &Url {
        &self.inner.url
    }
}
