use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use glosa_fetch::HttpFetcher;
use glosa_types::AppEvent;
use tokio::signal;
use tracing_subscriber::EnvFilter;

pub mod controller;
pub mod events;
pub mod io;
pub mod profile;
pub mod state;
pub mod worker;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::state::AppState;

/// Looks words up in an online dictionary and prints their translation trees.
#[derive(Parser, Debug)]
#[command(name = "glosa", version, about)]
struct Cli {
    /// Words to translate; read from stdin when omitted
    words: Vec<String>,

    /// Source language code
    #[arg(long)]
    from: Option<String>,

    /// Target language code
    #[arg(long)]
    to: Option<String>,

    /// JSON profile with the configuration
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long)]
    json: bool,
}

fn init_tracing(default_filter: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (config, source) = profile::load_config(cli.config.as_deref())?;
    let config = config.with_languages(cli.from.as_deref(), cli.to.as_deref());
    init_tracing(&config.log_filter, cli.json);
    source.report();

    let words = if cli.words.is_empty() && !atty::is(atty::Stream::Stdin) {
        io::read_words(std::io::stdin().lock())?
    } else {
        cli.words
    };
    if words.is_empty() {
        tracing::warn!("Nothing to translate");
        return Ok(());
    }

    let fetcher = Arc::new(HttpFetcher::new(&config.network)?);
    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state.clone(), fetcher).await?;
    let mut tasks = controller.spawn_tasks();

    controller.sender().send(AppEvent::AddWords(words)).await?;

    let done = controller.receiver();
    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        event = done.recv() => {
            if let Ok(AppEvent::TranslationCompleted) = event {
                io::write_outlines(&state.store, std::io::stdout().lock())?;
            }
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::warn!("task exited"),
                Ok(Err(e)) => tracing::error!("task failed: {e}"),
                Err(e) => tracing::error!("task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::debug!("task ended with: {e}");
        }
    }
    Ok(())
}
