//! Origin implementation over reqwest-middleware's client.

use std::time::Duration;

use async_trait::async_trait;
use offbox_core::{HttpResponse, Origin, OriginError, OriginResult, RequestDescriptor};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use tracing::debug;

/// [`Origin`] that performs requests with a `reqwest` client.
///
/// The response body is buffered in full before it is returned, so a
/// connection reset mid-body surfaces as [`OriginError::Unreachable`] rather
/// than a truncated response.
#[derive(Clone, Debug)]
pub struct ReqwestOrigin {
    client: ClientWithMiddleware,
    timeout: Option<Duration>,
}

impl ReqwestOrigin {
    /// Wraps a client with its middleware stack.
    pub fn new(client: ClientWithMiddleware) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Wraps a bare `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self::new(ClientBuilder::new(client).build())
    }

    /// Gives up on a request after `timeout`. Unset by default, leaving the
    /// decision to the network stack.
    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }
}

impl Default for ReqwestOrigin {
    fn default() -> Self {
        Self::from_client(Client::new())
    }
}

#[async_trait]
impl Origin for ReqwestOrigin {
    async fn fetch(&self, request: &RequestDescriptor) -> OriginResult {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(from_middleware)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(from_reqwest)?;
        debug!(url = %request.url(), %status, bytes = body.len(), "Origin responded");

        Ok(HttpResponse::new(status, headers, body))
    }
}

fn from_middleware(error: reqwest_middleware::Error) -> OriginError {
    match error {
        reqwest_middleware::Error::Reqwest(error) => from_reqwest(error),
        reqwest_middleware::Error::Middleware(error) => OriginError::Unreachable(error.into()),
    }
}

fn from_reqwest(error: reqwest::Error) -> OriginError {
    if error.is_timeout() {
        OriginError::Timeout
    } else if error.is_builder() {
        OriginError::Invalid(error.to_string())
    } else {
        OriginError::Unreachable(Box::new(error))
    }
}
