//! Background work that must not delay a response.
//!
//! Network-First and Cache-First hand their store writes here; the
//! background fetch of Stale-While-Revalidate runs here too. Every task is
//! tracked until it finishes, so callers (and tests) can wait for the
//! stores to settle.
//!
//! # Example
//!
//! ```ignore
//! use offbox::offload::{OffloadConfig, OffloadManager};
//!
//! let manager = OffloadManager::new(OffloadConfig::default());
//!
//! manager.spawn_write(async move {
//!     store.put(&key, entry).await.ok();
//! });
//! manager.wait_all().await;
//! ```

mod config;
mod manager;

pub use config::{OffloadConfig, OnTimeout};
pub use manager::OffloadManager;
