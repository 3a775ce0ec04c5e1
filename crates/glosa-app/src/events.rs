use std::sync::Arc;

use glosa_types::{AppEvent, TreeEvent};
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;
use crate::worker::Dispatcher;

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    dispatcher: Arc<Dispatcher>,
    cli_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_cli_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = cli_to_app_rx.recv() => event?,
        };

        tracing::trace!("[EVENT_LOOP] {:?}", event);
        if !handle_event(&state, &dispatcher, &app_to_cli_tx, event).await? {
            break;
        }
    }
    tracing::info!("[EVENT_LOOP] Stopped");
    Ok(())
}

/// Returns false once the loop should stop.
pub(crate) async fn handle_event(
    state: &AppState,
    dispatcher: &Arc<Dispatcher>,
    app_to_cli_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<bool> {
    match event {
        AppEvent::AddWords(words) => {
            tracing::info!("Adding {} words", words.len());
            for addr in state.store.add_main_words(&words) {
                dispatcher.translate(addr);
            }
        }
        AppEvent::Translate(addr) => {
            // any node stands for the main word it belongs to
            let Some(main) = addr.main_word_of() else {
                tracing::warn!("Nothing to translate at {}", addr);
                return Ok(true);
            };
            // a repeated lookup replaces the old results
            if let Some(count) = state.store.child_count(&main).filter(|count| *count > 0) {
                state.store.remove_nodes(&main, 0, count)?;
            }
            dispatcher.translate(main);
        }
        AppEvent::TranslateAll => dispatcher.translate_all(),
        AppEvent::SetLanguages { source, target } => {
            state.store.set_languages(&source, &target);
            let mut config = state.config.write().await;
            config.dictionary.source_lang = source.to_lowercase();
            config.dictionary.target_lang = target.to_lowercase();
            tracing::info!("Languages set to {} -> {}", source, target);
        }
        AppEvent::TreeChanged(TreeEvent::TranslationRequested(addr)) => {
            tracing::debug!("Main word {} edited, translating again", addr);
            dispatcher.translate(addr);
        }
        AppEvent::TreeChanged(change) => {
            tracing::trace!("Tree changed: {:?}", change);
        }
        AppEvent::TranslationCompleted => {
            // the worker may already be busy with work queued meanwhile
            if !dispatcher.is_running() {
                app_to_cli_tx.send(AppEvent::TranslationCompleted).await?;
            }
        }
        AppEvent::Shutdown => return Ok(false),
    }
    Ok(true)
}

/// Turns store notifications into app events.
pub async fn forward_tree_events(
    tree_rx: AsyncReceiver<TreeEvent>,
    app_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let change = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            change = tree_rx.recv() => change?,
        };
        app_tx.send(AppEvent::TreeChanged(change)).await?;
    }
}
