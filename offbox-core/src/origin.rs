//! The origin server boundary.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{HttpResponse, RequestDescriptor};

/// Why the origin could not produce a response.
///
/// Every variant is a transient network failure from the engine's point of
/// view: it falls back to the cache or a synthesized response. Non-2xx
/// statuses are *not* errors; they arrive as ordinary [`HttpResponse`]s.
#[derive(Debug, Error)]
pub enum OriginError {
    /// No route, DNS failure, connection refused, reset mid-body.
    #[error("origin unreachable: {0}")]
    Unreachable(Box<dyn std::error::Error + Send + Sync>),
    /// The network stack gave up waiting.
    #[error("origin timed out")]
    Timeout,
    /// The request could not be turned into an origin call.
    #[error("invalid origin request: {0}")]
    Invalid(String),
}

/// Result of an origin fetch.
pub type OriginResult = Result<HttpResponse, OriginError>;

/// Trait for fetching from the origin server.
///
/// Framework-agnostic: `offbox-reqwest` implements it over a `reqwest`
/// client, tests implement it over canned responses.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use http::StatusCode;
/// use offbox_core::{HttpResponse, Origin, OriginResult, RequestDescriptor};
///
/// struct Hello;
///
/// #[async_trait]
/// impl Origin for Hello {
///     async fn fetch(&self, _request: &RequestDescriptor) -> OriginResult {
///         Ok(HttpResponse::text(StatusCode::OK, "hello"))
///     }
/// }
/// ```
#[async_trait]
pub trait Origin: Send + Sync {
    /// Performs one request/response exchange with the origin.
    async fn fetch(&self, request: &RequestDescriptor) -> OriginResult;
}

#[async_trait]
impl<T> Origin for Arc<T>
where
    T: Origin + ?Sized,
{
    async fn fetch(&self, request: &RequestDescriptor) -> OriginResult {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl Origin for Box<dyn Origin> {
    async fn fetch(&self, request: &RequestDescriptor) -> OriginResult {
        (**self).fetch(request).await
    }
}
