//! Error types for store operations.

use offbox_core::StoreName;
use thiserror::Error;

/// Error type for store and registry operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Internal store error, state or computation error.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),

    /// The named store does not exist.
    #[error("store {0} does not exist")]
    NotFound(StoreName),

    /// Only `GET` responses may be stored.
    #[error("cannot store a response to a {0} request")]
    UnsupportedMethod(String),

    /// Only `200 OK` responses may be stored.
    #[error("cannot store a response with status {0}")]
    UnsupportedStatus(u16),
}
