#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Request classification.
///
/// [`classify`](classifier::classify) maps a request to the
/// [`RequestClass`] its strategy is chosen by.
pub mod classifier;

/// Out-of-band control messages (`SKIP_WAITING`, `CLEAR_CACHE`).
pub mod control;

/// Error types for lifecycle operations.
pub mod error;

/// Generation-tagged store names.
pub mod generation;

/// Install and activation of cache versions, hosted by a [`Scope`].
pub mod lifecycle;

/// Metrics collection for cache observability.
///
/// When the `metrics` feature is enabled, this module provides counters
/// for served responses by source and for origin failures, plus the
/// offload manager's task metrics.
pub mod metrics;

/// Background task offloading for cache writes and revalidation.
pub mod offload;

/// Network-First, Cache-First and Stale-While-Revalidate.
pub mod strategy;

/// Background sync trigger.
pub mod sync;

pub use classifier::{ClassifierRules, classify};
pub use control::{ControlHandle, ControlMessage};
pub use error::{AssetError, LifecycleError};
pub use generation::Generations;
pub use lifecycle::{
    AssetManifest, AssetOutcome, FetchOutcome, InstallReport, LifecyclePolicy, LifecycleState,
    NotSet, PassthroughReason, Scope, ScopeBuilder, Version, VersionConfig,
};
pub use offload::{OffloadConfig, OffloadManager, OnTimeout};
pub use strategy::{ResponseSource, Served, Strategy, StrategyEngine};
pub use sync::{DEFAULT_SYNC_TAG, SyncHook};

pub use offbox_core::{
    CacheEntry, CacheKey, HttpResponse, Origin, OriginError, RequestClass, RequestDescriptor,
    ResourceKind, StoreName,
};
