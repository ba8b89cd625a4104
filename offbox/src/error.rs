use http::StatusCode;
use offbox_backend::StoreError;
use offbox_core::OriginError;
use thiserror::Error;

use crate::lifecycle::LifecycleState;

/// Why a single asset could not be pre-warmed.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The manifest entry does not resolve against the scope URL.
    #[error("invalid asset url {url:?}: {source}")]
    InvalidUrl {
        /// Manifest entry as written.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// The origin could not be reached.
    #[error(transparent)]
    Origin(#[from] OriginError),
    /// The origin answered with something other than `200 OK`.
    #[error("origin answered {0}")]
    Status(StatusCode),
    /// The response could not be written to the static store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error type for lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A required asset failed; the version becomes redundant.
    #[error("required asset {asset} failed: {source}")]
    RequiredAsset {
        /// The asset, as written in the manifest or resolved.
        asset: String,
        /// What went wrong.
        #[source]
        source: AssetError,
    },
    /// A store operation the lifecycle depends on failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The operation does not apply in the current state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// What was attempted.
        operation: &'static str,
        /// State at the time.
        state: LifecycleState,
    },
}

impl LifecycleError {
    pub(crate) fn required(asset: impl Into<String>, source: impl Into<AssetError>) -> Self {
        Self::RequiredAsset {
            asset: asset.into(),
            source: source.into(),
        }
    }
}
