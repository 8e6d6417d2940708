//! Engine and host configuration

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Suspend after every dialogue line until the player continues
    pub pause_on_dialogue: bool,
    /// Maximum actions executed by one run before the session aborts
    pub max_steps_per_run: usize,
    /// Fixed seed for idle chat selection; random when unset
    pub rng_seed: Option<u64>,
    /// Local variable holding the unlocked idle chat labels
    pub unlocked_events_var: String,
    /// Local variable holding the last `next` checkpoint label
    pub checkpoint_var: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pause_on_dialogue: false,
            max_steps_per_run: 10_000,
            rng_seed: None,
            unlocked_events_var: "unlocked_events".to_string(),
            checkpoint_var: "checkpoint".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(src: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(src)
    }
}

/// Commands a host refuses to run on behalf of a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandPolicy {
    pub blocked_prefixes: Vec<String>,
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self {
            blocked_prefixes: vec!["/op".to_string(), "/stop".to_string(), "/ban".to_string()],
        }
    }
}

impl CommandPolicy {
    pub fn allows(&self, command: &str) -> bool {
        let command = command.trim_start();
        !self
            .blocked_prefixes
            .iter()
            .any(|prefix| command.starts_with(prefix.as_str()))
    }
}
