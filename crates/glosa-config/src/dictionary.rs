use std::env;

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_provider() -> String {
    "pons".to_string()
}

fn default_website() -> String {
    env::var("GLOSA_DICT_URL").unwrap_or_else(|_| "https://mobile.pons.eu".to_string())
}

fn default_source_lang() -> String {
    "de".to_string()
}

fn default_target_lang() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_website")]
    pub website: String,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
    /// Run the simplification pass after every parsed payload
    #[serde(default = "default_enabled")]
    pub simplify: bool,
    /// Retouch a main word to the closest headword when no exact one is found
    #[serde(default = "default_enabled")]
    pub fit_main_word: bool,
}

impl DictionaryConfig {
    pub fn new() -> Self {
        Self {
            provider: default_provider(),
            website: default_website(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            simplify: default_enabled(),
            fit_main_word: default_enabled(),
        }
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self::new()
    }
}
