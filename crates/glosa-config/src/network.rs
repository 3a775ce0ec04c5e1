use std::env;

use serde::{Deserialize, Serialize};

fn default_timeout_seconds() -> u64 {
    env::var("GLOSA_TIMEOUT_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30) // 30 seconds default
}

fn default_user_agent() -> String {
    format!("glosa/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_in_flight() -> usize {
    8
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Upper bound on concurrent dictionary requests
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new()
    }
}
