use std::env;

use serde::{Deserialize, Serialize};

use self::dictionary::DictionaryConfig;
use self::network::NetworkConfig;
use self::worker::WorkerConfig;

pub mod dictionary;
pub mod network;
pub mod worker;

fn default_log_filter() -> String {
    env::var("GLOSA_LOG").unwrap_or_else(|_| "info".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dictionary: DictionaryConfig,
    pub network: NetworkConfig,
    pub worker: WorkerConfig,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Config {
    pub fn new() -> Self {
        Config {
            dictionary: DictionaryConfig::new(),
            network: NetworkConfig::new(),
            worker: WorkerConfig::default(),

            log_filter: default_log_filter(),
        }
    }

    /// Overrides the language pair, keeping the lower-case convention
    pub fn with_languages(mut self, source: Option<&str>, target: Option<&str>) -> Self {
        if let Some(source) = source {
            self.dictionary.source_lang = source.to_lowercase();
        }
        if let Some(target) = target {
            self.dictionary.target_lang = target.to_lowercase();
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
