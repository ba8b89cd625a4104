//! Background sync trigger.

use smol_str::SmolStr;
use tracing::{debug, info};

/// Tag the sync hook answers to unless configured otherwise.
pub const DEFAULT_SYNC_TAG: &str = "sync-weather-data";

/// Reacts to sync triggers carrying its tag.
///
/// The hook only marks the point where data would be re-synchronized once
/// connectivity returns; there is no queue and no retry.
#[derive(Debug, Clone)]
pub struct SyncHook {
    tag: SmolStr,
}

impl SyncHook {
    /// Creates a hook for `tag`.
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self { tag: tag.into() }
    }

    /// The tag this hook runs for.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Runs the hook when `tag` matches. Returns whether it ran.
    pub async fn trigger(&self, tag: &str) -> bool {
        if tag != self.tag.as_str() {
            debug!(tag, "Ignoring sync for unknown tag");
            return false;
        }
        info!(tag, "Synchronizing data");
        info!(tag, "Synchronization completed");
        true
    }
}

impl Default for SyncHook {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_TAG)
    }
}
