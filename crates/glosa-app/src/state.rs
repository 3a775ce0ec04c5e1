use std::sync::Arc;

use glosa_config::Config;
use glosa_core::TreeStore;
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub store: Arc<TreeStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = TreeStore::new(&config.dictionary.source_lang, &config.dictionary.target_lang);

        Self {
            config: Arc::new(RwLock::new(config)),
            store: Arc::new(store),
        }
    }
}
