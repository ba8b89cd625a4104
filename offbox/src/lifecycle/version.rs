use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tokio::sync::watch;
use tracing::info;

use super::LifecycleState;
use crate::classifier::ClassifierRules;
use crate::generation::Generations;
use crate::strategy::StrategyEngine;

/// Assets pre-warmed into the static store at install.
///
/// Entries are absolute URLs or paths relative to the scope URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    /// Every one of these must be fetched with `200 OK` or the install fails.
    pub required: Vec<String>,
    /// Cached when available; failures are only reported.
    pub optional: Vec<String>,
}

/// Per-version lifecycle switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecyclePolicy {
    /// Activate straight after install instead of waiting for older clients.
    pub skip_waiting_on_install: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            skip_waiting_on_install: true,
        }
    }
}

/// Everything needed to install a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConfig {
    /// Version identifier, used in logs.
    pub id: SmolStr,
    /// Store names owned by the version.
    pub generations: Generations,
    /// Install-time assets.
    pub assets: AssetManifest,
    /// Classification rules.
    pub rules: ClassifierRules,
    /// Lifecycle switches.
    pub policy: LifecyclePolicy,
}

impl VersionConfig {
    /// A version with no assets, default rules and default policy.
    pub fn new(id: impl Into<SmolStr>, generations: Generations) -> Self {
        Self {
            id: id.into(),
            generations,
            assets: AssetManifest::default(),
            rules: ClassifierRules::default(),
            policy: LifecyclePolicy::default(),
        }
    }

    /// Replaces the asset manifest.
    pub fn assets(self, assets: AssetManifest) -> Self {
        Self { assets, ..self }
    }

    /// Adds required assets.
    pub fn required<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets.required.extend(assets.into_iter().map(Into::into));
        self
    }

    /// Adds optional assets.
    pub fn optional<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets.optional.extend(assets.into_iter().map(Into::into));
        self
    }

    /// Replaces the classifier rules.
    pub fn rules(self, rules: ClassifierRules) -> Self {
        Self { rules, ..self }
    }

    /// Replaces the lifecycle policy.
    pub fn policy(self, policy: LifecyclePolicy) -> Self {
        Self { policy, ..self }
    }
}

/// A version hosted by a [`Scope`](super::Scope).
#[derive(Debug)]
pub struct Version {
    id: SmolStr,
    rules: ClassifierRules,
    policy: LifecyclePolicy,
    engine: StrategyEngine,
    state: watch::Sender<LifecycleState>,
}

impl Version {
    pub(crate) fn new(config: VersionConfig, engine: StrategyEngine) -> Self {
        let (state, _) = watch::channel(LifecycleState::Installing);
        Self {
            id: config.id,
            rules: config.rules,
            policy: config.policy,
            engine,
            state,
        }
    }

    /// Version identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Classification rules of this version.
    pub fn rules(&self) -> &ClassifierRules {
        &self.rules
    }

    /// Lifecycle switches of this version.
    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// The engine serving requests once the version is active.
    pub fn engine(&self) -> &StrategyEngine {
        &self.engine
    }

    /// Store names owned by this version.
    pub fn generations(&self) -> &Generations {
        self.engine.generations()
    }

    pub(crate) fn set_state(&self, next: LifecycleState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            info!(version = %self.id, from = %previous, to = %next, "Lifecycle transition");
        }
    }
}
