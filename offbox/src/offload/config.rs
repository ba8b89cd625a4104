use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens to a background task that runs past [`OffloadConfig::timeout`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnTimeout {
    /// Drop the task. A write that never lands leaves the previous entry in place.
    #[default]
    Cancel,
    /// Let the task finish and log how far over the limit it went.
    Warn,
}

/// Settings for background store writes and revalidations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffloadConfig {
    /// Run-time limit per task. `None` lets a task run until the origin gives up.
    pub timeout: Option<Duration>,
    pub on_timeout: OnTimeout,
    /// Skip a revalidation while one for the same key is still running.
    pub deduplicate_revalidations: bool,
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            on_timeout: OnTimeout::Cancel,
            deduplicate_revalidations: true,
        }
    }
}
