use offbox::{
    AssetManifest, ClassifierRules, DEFAULT_SYNC_TAG, LifecyclePolicy, NotSet, OffloadConfig,
    Scope, ScopeBuilder, VersionConfig,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::offload::ConfigOffload;
use crate::stores::ConfigStores;

/// A scope and the version to install into it, as read from YAML.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConfigScope {
    /// Root URL; relative assets resolve against it.
    pub scope: Url,
    /// Version identifier, also the default store version tag.
    pub version: String,
    pub stores: ConfigStores,
    #[serde(default)]
    pub assets: AssetManifest,
    #[serde(default)]
    pub classifier: ClassifierRules,
    #[serde(default)]
    pub lifecycle: LifecyclePolicy,
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,
    #[serde(default)]
    pub offload: ConfigOffload,
}

fn default_sync_tag() -> String {
    DEFAULT_SYNC_TAG.to_owned()
}

impl ConfigScope {
    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_saphyr::from_str(yaml).map_err(|error| ConfigError::Parse(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks everything serde cannot: scheme, empty names, unresolvable
    /// assets, empty markers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.scope.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScope(self.scope.to_string()));
        }
        if self.version.is_empty() {
            return Err(ConfigError::Empty("version"));
        }
        if self.sync_tag.is_empty() {
            return Err(ConfigError::Empty("sync_tag"));
        }
        self.stores.clone().into_generations(&self.version)?;

        for asset in self.assets.required.iter().chain(&self.assets.optional) {
            self.scope
                .join(asset)
                .map_err(|source| ConfigError::InvalidAsset {
                    asset: asset.clone(),
                    source,
                })?;
        }

        let mut markers = self
            .classifier
            .api_markers
            .iter()
            .chain(&self.classifier.document_suffixes);
        if markers.any(String::is_empty) {
            return Err(ConfigError::EmptyMarker);
        }
        Ok(())
    }

    /// The version to hand to [`Scope::install`].
    pub fn into_version(self) -> Result<VersionConfig, ConfigError> {
        let generations = self.stores.into_generations(&self.version)?;
        Ok(VersionConfig::new(self.version, generations)
            .assets(self.assets)
            .rules(self.classifier)
            .policy(self.lifecycle))
    }

    /// Background task settings.
    pub fn offload_config(&self) -> OffloadConfig {
        self.offload.clone().into_offload_config()
    }

    /// A scope builder with URL, sync tag and offload settings applied;
    /// registry and origin are still to be set.
    pub fn scope_builder(&self) -> ScopeBuilder<NotSet, NotSet> {
        Scope::builder(self.scope.clone())
            .sync_tag(self.sync_tag.as_str())
            .offload(self.offload_config())
    }
}
