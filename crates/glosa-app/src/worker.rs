//! Background translation worker.
//!
//! Requests wait in a queue until a fetch slot is free. Finished downloads wait
//! in a second queue until the worker hands them to the dictionary parser. The
//! worker runs only while there is work: it stops once both queues and the
//! in-flight table are empty, and the next request starts it again.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glosa_core::dictionary::{ParseOutcome, WebDictionary};
use glosa_core::{NodeKind, TreeStore};
use glosa_fetch::Fetcher;
use glosa_types::{AppEvent, NodeAddress};
use kanal::AsyncSender;
use tokio::sync::Notify;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub simplify: bool,
    pub rewrite_factor: usize,
    pub max_in_flight: usize,
}

#[derive(Default)]
struct Queues {
    requests: VecDeque<NodeAddress>,
    completed: VecDeque<(NodeAddress, String)>,
    in_flight: HashMap<Uuid, NodeAddress>,
    running: bool,
}

impl Queues {
    fn is_idle(&self) -> bool {
        self.requests.is_empty() && self.completed.is_empty() && self.in_flight.is_empty()
    }
}

pub struct Dispatcher {
    store: Arc<TreeStore>,
    dictionary: Arc<dyn WebDictionary>,
    fetcher: Arc<dyn Fetcher>,
    settings: WorkerSettings,
    queues: Mutex<Queues>,
    wake: Notify,
    events: AsyncSender<AppEvent>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<TreeStore>,
        dictionary: Arc<dyn WebDictionary>,
        fetcher: Arc<dyn Fetcher>,
        settings: WorkerSettings,
        events: AsyncSender<AppEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            dictionary,
            fetcher,
            settings,
            queues: Mutex::new(Queues::default()),
            wake: Notify::new(),
            events,
        })
    }

    fn queues(&self) -> MutexGuard<'_, Queues> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a lookup for the main word at `addr`, starting the worker if idle.
    pub fn translate(self: &Arc<Self>, addr: NodeAddress) {
        let start = {
            let mut queues = self.queues();
            if !queues.requests.contains(&addr) {
                queues.requests.push_back(addr);
            }
            !std::mem::replace(&mut queues.running, true)
        };

        if start {
            tracing::debug!("Starting translation worker");
            tokio::spawn(self.clone().run());
        }
        self.wake.notify_one();
    }

    /// Drops every translation and looks all main words up again.
    pub fn translate_all(self: &Arc<Self>) {
        self.store.clear_translations();
        for addr in self.store.main_words() {
            self.translate(addr);
        }
    }

    pub fn is_running(&self) -> bool {
        self.queues().running
    }

    async fn run(self: Arc<Self>) {
        loop {
            let completed: Vec<_> = self.queues().completed.drain(..).collect();
            for (addr, payload) in completed {
                self.build(&addr, &payload);
            }

            self.start_fetches();

            {
                let mut queues = self.queues();
                if queues.is_idle() {
                    queues.running = false;
                    break;
                }
            }
            self.wake.notified().await;
        }

        tracing::info!("All translations finished");
        if let Err(e) = self.events.send(AppEvent::TranslationCompleted).await {
            tracing::warn!("Completion not delivered: {}", e);
        }
    }

    fn start_fetches(self: &Arc<Self>) {
        let (source, target) = self.store.languages();
        loop {
            let (id, addr) = {
                let mut queues = self.queues();
                if queues.in_flight.len() >= self.settings.max_in_flight.max(1) {
                    return;
                }
                let Some(addr) = queues.requests.pop_front() else {
                    return;
                };
                let id = Uuid::new_v4();
                queues.in_flight.insert(id, addr.clone());
                (id, addr)
            };

            let word = match self.store.attributes(&addr) {
                Some(attributes) if attributes.kind == NodeKind::MainWord => attributes.word,
                _ => {
                    tracing::warn!("No main word at {}, request dropped", addr);
                    self.queues().in_flight.remove(&id);
                    continue;
                }
            };

            let query = self.dictionary.query(&word, &source, &target);
            let this = self.clone();
            tokio::spawn(async move {
                let result = this.fetcher.fetch(&query).await;
                {
                    let mut queues = this.queues();
                    queues.in_flight.remove(&id);
                    match result {
                        Ok(payload) => queues.completed.push_back((addr, payload)),
                        Err(e) => tracing::warn!("Lookup of {:?} ({}) failed: {}", word, id, e),
                    }
                }
                this.wake.notify_one();
            });
        }
    }

    fn build(&self, addr: &NodeAddress, payload: &str) {
        let is_main_word = self
            .store
            .attributes(addr)
            .is_some_and(|attributes| attributes.kind == NodeKind::MainWord);
        if !is_main_word {
            tracing::warn!("{} is no longer a main word, payload dropped", addr);
            return;
        }

        match self.dictionary.parse(&self.store, payload, addr) {
            ParseOutcome::Built { sections } => {
                tracing::debug!("{} sections parsed for {}", sections, addr);
                if self.settings.simplify {
                    if let Err(e) = self.store.simplify(addr, self.settings.rewrite_factor) {
                        tracing::error!("Simplifying {} failed: {}", addr, e);
                    }
                }
            }
            ParseOutcome::NoMatch => tracing::info!("No translations for {}", addr),
        }
    }
}
