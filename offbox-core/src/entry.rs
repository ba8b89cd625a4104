//! Stored response snapshots.
//!
//! A [`CacheEntry`] is what a store holds under a [`CacheKey`](crate::CacheKey):
//! an immutable copy of a `200 OK` response plus the time it was stored.
//! Stores insert entries as whole values, so a reader sees either the old
//! entry or the new one and never a mix.

use chrono::{DateTime, Utc};
use std::mem::size_of;

use crate::HttpResponse;

/// Immutable snapshot of a response stored in a cache store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    response: HttpResponse,
    stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Snapshots a response, stamping it with the current time.
    pub fn new(response: HttpResponse) -> Self {
        Self::with_stored_at(response, Utc::now())
    }

    /// Snapshots a response with an explicit timestamp.
    pub fn with_stored_at(response: HttpResponse, stored_at: DateTime<Utc>) -> Self {
        CacheEntry {
            response,
            stored_at,
        }
    }

    /// The stored response.
    #[inline]
    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    /// When the entry was written.
    #[inline]
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Consumes the entry and returns a response to serve.
    pub fn into_response(self) -> HttpResponse {
        self.response
    }

    /// Returns the estimated memory usage of this entry in bytes.
    pub fn memory_size(&self) -> usize {
        let headers: usize = self
            .response
            .headers()
            .iter()
            .map(|(name, value)| name.as_str().len() + value.len())
            .sum();
        size_of::<Self>() + headers + self.response.body().len()
    }
}
