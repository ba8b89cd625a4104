use offbox::Generations;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Store naming: `{prefix}-static-{static}` and `{prefix}-dynamic-{dynamic}`.
///
/// Omitted version tags fall back to the scope's `version`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConfigStores {
    pub prefix: String,
    #[serde(default, rename = "static")]
    pub static_version: Option<String>,
    #[serde(default, rename = "dynamic")]
    pub dynamic_version: Option<String>,
}

impl ConfigStores {
    pub fn into_generations(self, version: &str) -> Result<Generations, ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::Empty("stores.prefix"));
        }
        let static_version = self.static_version.as_deref().unwrap_or(version);
        let dynamic_version = self.dynamic_version.as_deref().unwrap_or(version);
        if static_version.is_empty() || dynamic_version.is_empty() {
            return Err(ConfigError::Empty("stores version tag"));
        }

        Ok(Generations::split(
            &self.prefix,
            static_version,
            dynamic_version,
        ))
    }
}
