//! Caching strategies.
//!
//! Each [`RequestClass`] maps to one algorithm:
//!
//! | Class | Strategy |
//! |-------|----------|
//! | `Api`, `Default` | [`Strategy::NetworkFirst`] |
//! | `StaticAsset` | [`Strategy::CacheFirst`] |
//! | `Document` | [`Strategy::StaleWhileRevalidate`] |
//!
//! The [`StrategyEngine`] is the error boundary of the crate: every request
//! it handles ends in a [`Served`] response, synthesized if need be.

mod engine;
pub mod fallback;

use std::fmt;

use offbox_core::{HttpResponse, RequestClass, StoreName};

pub use engine::StrategyEngine;

/// Caching algorithm applied to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Try the origin, fall back to the cache.
    NetworkFirst,
    /// Try the cache, fall back to the origin.
    CacheFirst,
    /// Serve the cache immediately and refresh it in the background.
    StaleWhileRevalidate,
}

impl Strategy {
    /// The strategy for a class, `None` for [`RequestClass::Passthrough`].
    pub fn for_class(class: RequestClass) -> Option<Self> {
        match class {
            RequestClass::Passthrough => None,
            RequestClass::Api | RequestClass::Default => Some(Self::NetworkFirst),
            RequestClass::StaticAsset => Some(Self::CacheFirst),
            RequestClass::Document => Some(Self::StaleWhileRevalidate),
        }
    }

    /// Name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkFirst => "network_first",
            Self::CacheFirst => "cache_first",
            Self::StaleWhileRevalidate => "stale_while_revalidate",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSource {
    /// Fetched from the origin during this request.
    Network,
    /// Read from the named store.
    Cache(StoreName),
    /// Synthesized because neither the origin nor a store could answer.
    Fallback,
}

/// A response produced by the engine, tagged with its provenance.
#[derive(Debug, Clone)]
pub struct Served {
    /// The response, byte for byte as fetched, stored or synthesized.
    pub response: HttpResponse,
    /// Where it came from.
    pub source: ResponseSource,
    /// Strategy that produced it.
    pub strategy: Strategy,
}

impl Served {
    pub(crate) fn network(response: HttpResponse, strategy: Strategy) -> Self {
        Self {
            response,
            source: ResponseSource::Network,
            strategy,
        }
    }

    pub(crate) fn cache(store: StoreName, response: HttpResponse, strategy: Strategy) -> Self {
        Self {
            response,
            source: ResponseSource::Cache(store),
            strategy,
        }
    }

    pub(crate) fn fallback(response: HttpResponse, strategy: Strategy) -> Self {
        Self {
            response,
            source: ResponseSource::Fallback,
            strategy,
        }
    }

    /// Whether the response was read from a store.
    pub fn is_cached(&self) -> bool {
        matches!(self.source, ResponseSource::Cache(_))
    }
}
