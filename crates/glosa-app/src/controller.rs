use std::sync::Arc;

use glosa_config::dictionary::DictionaryConfig;
use glosa_core::dictionary::WebDictionary;
use glosa_dict_pons::PonsDictionary;
use glosa_fetch::Fetcher;
use glosa_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::{event_loop, forward_tree_events};
use crate::state::AppState;
use crate::worker::{Dispatcher, WorkerSettings};

/// Centralized channel management
pub struct ChannelSet {
    pub cli_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub app_to_cli: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            cli_to_app: kanal::bounded_async(capacity),
            app_to_cli: kanal::bounded_async(capacity),
        }
    }
}

pub fn dictionary_for(config: &DictionaryConfig) -> anyhow::Result<Arc<dyn WebDictionary>> {
    match config.provider.as_str() {
        "pons" => Ok(Arc::new(
            PonsDictionary::new(config.website.clone()).with_fit_main_word(config.fit_main_word),
        )),
        other => anyhow::bail!("Unknown dictionary provider: {other}"),
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    pub channels: ChannelSet,
    state: Arc<AppState>,
    dispatcher: Arc<Dispatcher>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub async fn new(state: Arc<AppState>, fetcher: Arc<dyn Fetcher>) -> anyhow::Result<Self> {
        let (channels, dictionary, settings) = {
            let config = state.config.read().await;
            let settings = WorkerSettings {
                simplify: config.dictionary.simplify,
                rewrite_factor: config.worker.rewrite_factor,
                max_in_flight: config.network.max_in_flight,
            };
            (
                ChannelSet::new(config.worker.event_capacity),
                dictionary_for(&config.dictionary)?,
                settings,
            )
        };

        let meta = dictionary.metadata();
        tracing::info!("Using {} at {}", meta.name, meta.website);

        let dispatcher = Dispatcher::new(
            state.store.clone(),
            dictionary,
            fetcher,
            settings,
            channels.cli_to_app.0.clone(),
        );

        Ok(Self {
            channels,
            state,
            dispatcher,
            cancel_token: CancellationToken::new(),
        })
    }

    pub fn sender(&self) -> AsyncSender<AppEvent> {
        self.channels.cli_to_app.0.clone()
    }

    pub fn receiver(&self) -> AsyncReceiver<AppEvent> {
        self.channels.app_to_cli.1.clone()
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn(event_loop(
            self.state.clone(),
            self.dispatcher.clone(),
            self.channels.cli_to_app.1.clone(),
            self.channels.app_to_cli.0.clone(),
            self.cancel_token.child_token(),
        ));

        // Store notifications
        tasks.spawn(forward_tree_events(
            self.state.store.subscribe().to_async(),
            self.channels.cli_to_app.0.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
