use std::time::Duration;

use offbox::{OffloadConfig, OnTimeout};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConfigOffload {
    /// Limit for background writes and revalidations (e.g., "5s", "500ms", "1m").
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub on_timeout: OnTimeout,
    #[serde(default = "default_deduplicate")]
    pub deduplicate: bool,
}

fn default_deduplicate() -> bool {
    true
}

impl Default for ConfigOffload {
    fn default() -> Self {
        Self {
            timeout: None,
            on_timeout: OnTimeout::default(),
            deduplicate: default_deduplicate(),
        }
    }
}

impl ConfigOffload {
    pub fn into_offload_config(self) -> OffloadConfig {
        OffloadConfig {
            timeout: self.timeout,
            on_timeout: self.on_timeout,
            deduplicate_revalidations: self.deduplicate,
        }
    }
}
