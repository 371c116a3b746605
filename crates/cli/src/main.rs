mod cli;
mod commands;
mod error;
mod providers;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use lnauto_config::Config;
use lnauto_library::{Context, Notification, Notifier};
use lnauto_store::{Database, Repository};
use std::process::ExitCode;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    init_tracing(&config);

    if let Some(parent) = config.database.path.parent() {
        tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Database)?;
    }
    let db = Database::connect(&config.database.path).await.or_raise(|| ErrorKind::Database)?;
    let repo = Repository::from(&db);
    let providers =
        providers::load_providers(&config.providers.snapshots, config.providers.requests_per_minute).await?;

    let (notifier, receiver) = Notifier::channel();
    let consumer = tokio::spawn(record_notifications(repo.clone(), receiver));
    let ctx = context(&config, notifier);
    let result = commands::dispatch(cli.command, &config, &repo, &providers, &ctx).await;

    // The consumer finishes once the last sender is gone.
    drop(ctx);
    if let Err(e) = consumer.await {
        warn!(error = %e, "notification consumer stopped unexpectedly");
    }
    db.close().await;
    result
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn context(config: &Config, notifier: Notifier) -> Context {
    let mut ctx = Context::new(notifier);
    ctx.language = config.language();
    ctx.sweep_chapters = config.library.sweep_chapters;
    ctx.concurrency = config.refresh.concurrency;
    ctx.timeout = config.refresh_timeout();
    ctx
}

/// Persist and log every notification the library sends.
async fn record_notifications(repo: Repository, mut receiver: UnboundedReceiver<Notification>) {
    while let Some(notification) = receiver.recv().await {
        info!(kind = %notification.kind, "{}", notification.message);
        if let Err(e) = repo.record_notification(notification.kind, &notification.message).await {
            warn!(error = ?e, "failed to persist notification");
        }
    }
}
