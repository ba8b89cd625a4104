//! Traits and structs for offbox store interaction.
//!
//! If you want to implement your own storage engine, you are in the right
//! place: implement [`CacheStore`] for a single named store and
//! [`StoreRegistry`] for the set of stores, and the registry's provided
//! methods give you stale-generation purging and multi-store lookup.
mod error;
mod registry;
mod store;

pub use error::StoreError;
pub use registry::{PurgeReport, StoreRegistry};
pub use store::{ArcStore, CacheStore, StoreResult};

/// Status of deleting result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
