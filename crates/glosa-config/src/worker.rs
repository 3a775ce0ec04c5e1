use serde::{Deserialize, Serialize};

fn default_event_capacity() -> usize {
    256
}

fn default_rewrite_factor() -> usize {
    8
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WorkerConfig {
    /// Capacity of the app event channels
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Simplification gives up after `rewrite_factor * node_count` rewrites
    #[serde(default = "default_rewrite_factor")]
    pub rewrite_factor: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
            rewrite_factor: default_rewrite_factor(),
        }
    }
}
