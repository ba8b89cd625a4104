#![warn(missing_docs)]
//! # offbox-core
//!
//! Core types and traits for the offbox offline HTTP cache.
//!
//! This crate holds the vocabulary every other offbox crate speaks:
//!
//! - **Identify** cached items ([`CacheKey`])
//! - **Describe** intercepted requests ([`RequestDescriptor`], [`ResourceKind`])
//! - **Snapshot** responses ([`HttpResponse`], [`CacheEntry`])
//! - **Name** stores and their generations ([`StoreName`])
//! - **Fetch** from the origin server ([`Origin`])
//!
//! Store implementations live in `offbox-backend` / `offbox-moka`, the
//! strategy engine and lifecycle in `offbox`.

pub mod class;
pub mod entry;
pub mod key;
pub mod label;
pub mod origin;
pub mod request;
pub mod response;

pub use class::RequestClass;
pub use entry::CacheEntry;
pub use key::CacheKey;
pub use label::StoreName;
pub use origin::{Origin, OriginError, OriginResult};
pub use request::{RequestDescriptor, ResourceKind};
pub use response::HttpResponse;
#[doc(hidden)]
pub use smol_str::SmolStr;
