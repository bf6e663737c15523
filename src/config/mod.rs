//! User settings and config persistence

mod lock;
mod storage;

pub use lock::SyncLock;
pub use storage::{FileConfigStore, config_path, load_config, save_config};

use crate::error::Result;
use crate::stack::StackboiConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default interval between live PR status refreshes.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;

/// git rerere settings applied when cascading rebases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerereSettings {
    /// Record conflict resolutions
    pub enabled: bool,
    /// Stage recorded resolutions automatically
    pub autoupdate: bool,
}

impl Default for RerereSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            autoupdate: true,
        }
    }
}

/// User-tunable settings stored alongside the stacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// git rerere behaviour during cascades
    #[serde(default)]
    pub rerere: RerereSettings,
    /// Base branch used when a new stack is started without one
    #[serde(default = "default_base_branch")]
    pub default_base_branch: String,
    /// Interval between live PR status refreshes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_base_branch() -> String {
    "main".to_string()
}

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rerere: RerereSettings::default(),
            default_base_branch: default_base_branch(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Settings {
    /// Poll interval as a `Duration`, floored at one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1_000))
    }
}

/// Where stacks are loaded from and saved to
pub trait ConfigStore: Send + Sync {
    /// Load the config; a missing file yields the default config
    fn load_config(&self) -> Result<StackboiConfig>;

    /// Persist the config
    fn save_config(&self, config: &StackboiConfig) -> Result<()>;
}
