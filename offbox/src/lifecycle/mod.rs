//! Two-phase startup of a cache version.
//!
//! A version moves through
//! `Installing → Waiting → Activating → Active` exactly once, and ends up
//! `Redundant` when its install fails or a newer version replaces it.
//!
//! - **Installing** pre-warms the static store from the asset manifest.
//!   Required assets are all-or-nothing, optional ones are best-effort.
//! - **Waiting** lasts until no client is controlled by an older version,
//!   a `SKIP_WAITING` message arrives, or the version's policy skips it.
//! - **Activating** purges every store outside the version's generation and
//!   claims the open clients.
//! - **Active** serves requests through the version's strategy engine.
//!
//! The [`Scope`] hosts the versions and is the entry point for fetches,
//! control messages and sync triggers.

mod install;
mod scope;
mod version;

use std::fmt;

pub use install::{AssetOutcome, InstallReport};
pub use scope::{FetchOutcome, NotSet, PassthroughReason, Scope, ScopeBuilder};
pub use version::{AssetManifest, LifecyclePolicy, Version, VersionConfig};

/// Lifecycle state of one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Pre-warming the static store.
    Installing,
    /// Installed, waiting for older clients to go away.
    Waiting,
    /// Purging stale stores and claiming clients.
    Activating,
    /// Serving requests.
    Active,
    /// Install failed or replaced by a newer version. Terminal.
    Redundant,
}

impl LifecycleState {
    /// State name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Installing => "installing",
            Self::Waiting => "waiting",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Redundant => "redundant",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
