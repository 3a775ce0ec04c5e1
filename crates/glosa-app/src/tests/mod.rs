mod worker_tests;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use glosa_config::Config;
use glosa_dict_pons::PonsDictionary;
use glosa_fetch::{FetchError, Fetcher};
use glosa_types::{AppEvent, DictionaryQuery};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::time::timeout;

use crate::state::AppState;
use crate::worker::{Dispatcher, WorkerSettings};

pub const HAUS_PAGE: &str = concat!(
    "<div class=\"romhead\"><h2>Haus <span class=\"wordclass\">NOUN</span></h2></div>",
    "<table><tr id=\"1\"><td class=\"source\">Haus</td><td class=\"target\">house</td></tr></table>",
    "<div class=\"romhead\"><h2>Häuschen</h2></div>",
    "<table><tr id=\"2\"><td class=\"source\">Häuschen</td><td class=\"target\">little house</td></tr></table>",
);

pub const BAUM_PAGE: &str = concat!(
    "<div class=\"romhead\"><h2>Baum</h2></div>",
    "<table><tr id=\"1\"><td class=\"source\">Baum</td><td class=\"target\">tree</td></tr></table>",
);

pub const SETTINGS: WorkerSettings = WorkerSettings {
    simplify: true,
    rewrite_factor: 8,
    max_in_flight: 2,
};

/// Serves canned pages keyed by the looked-up word; unknown words get a 404.
#[derive(Default)]
pub struct CannedFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

impl CannedFetcher {
    pub fn with_page(mut self, word: &str, page: &str) -> Self {
        self.pages.insert(word.to_string(), page.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, query: &DictionaryQuery) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        query
            .param("q")
            .and_then(|word| self.pages.get(word))
            .cloned()
            .ok_or(FetchError::Http(404))
    }
}

/// Never answers, so the worker stays busy.
pub struct StalledFetcher;

#[async_trait::async_trait]
impl Fetcher for StalledFetcher {
    async fn fetch(&self, _query: &DictionaryQuery) -> Result<String, FetchError> {
        std::future::pending().await
    }
}

pub fn app_state() -> Arc<AppState> {
    Arc::new(AppState::new(Config::new().with_languages(Some("de"), Some("en"))))
}

pub fn dispatcher_for(state: &AppState, fetcher: Arc<dyn Fetcher>, events: AsyncSender<AppEvent>) -> Arc<Dispatcher> {
    Dispatcher::new(
        state.store.clone(),
        Arc::new(PonsDictionary::new("https://mobile.pons.eu")),
        fetcher,
        SETTINGS,
        events,
    )
}

pub async fn completion(rx: &AsyncReceiver<AppEvent>) {
    match timeout(Duration::from_secs(2), rx.recv()).await {
        Ok(Ok(AppEvent::TranslationCompleted)) => {}
        Ok(Ok(other)) => panic!("Wrong event: {:?}", other),
        Ok(Err(e)) => panic!("Channel error: {}", e),
        Err(_) => panic!("Timeout - worker never finished"),
    }
}
