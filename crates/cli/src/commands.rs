use crate::cli::{Commands, Target};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use futures::StreamExt;
use lnauto_config::Config;
use lnauto_library::Context;
use lnauto_library::edit;
use lnauto_library::reconcile::{RefreshEvent, RefreshSummary, Request, reconcile, refresh_all};
use lnauto_metadata::ProviderRegistry;
use lnauto_store::{BookId, GroupId, Repository, SeriesId};
use std::pin::pin;
use std::str::FromStr;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

pub async fn dispatch(
    command: Commands,
    config: &Config,
    repo: &Repository,
    providers: &ProviderRegistry,
    ctx: &Context,
) -> Result<()> {
    match command {
        Commands::Add { source, external_id, group } => {
            let mut request = Request::new(source, external_id);
            if let Some(group) = group {
                request = request.with_group(parse_id::<GroupId>(&group)?);
            }
            let outcome = reconcile(repo, providers, ctx, &request).await.or_raise(|| ErrorKind::Command)?;
            println!("{}", outcome.message());
            println!("series {} in group {} ({})", outcome.series_id, outcome.group_id, outcome.status);
        },
        Commands::Refresh { source, external_id } => {
            let request = Request::new(source, external_id);
            let outcome = reconcile(repo, providers, ctx, &request).await.or_raise(|| ErrorKind::Command)?;
            println!("{}", outcome.message());
        },
        Commands::RefreshAll => {
            let summary = refresh_library(repo, providers, ctx).await?;
            if summary.failed > 0 {
                exn::bail!(ErrorKind::Command);
            }
        },
        Commands::Watch => watch(config, repo, providers, ctx).await?,
        Commands::Status { series: Some(id) } => show_series(repo, parse_id(&id)?).await?,
        Commands::Status { series: None } => list_series(repo).await?,
        Commands::Notifications { limit } => {
            for n in repo.list_notifications(limit).await.or_raise(|| ErrorKind::Command)? {
                println!("{}  {:<7}  {}", n.created_at, n.kind.as_str(), n.message);
            }
        },
        Commands::Downloaded { target, id, undo } => {
            let status = match target {
                Target::Book => edit::set_book_downloaded(repo, ctx, parse_id(&id)?, !undo).await,
                Target::Series => edit::set_series_downloaded(repo, ctx, parse_id(&id)?, !undo).await,
            }
            .or_raise(|| ErrorKind::Command)?;
            println!("download status: {status}");
        },
        Commands::Monitor { target, id, off } => {
            let result = match target {
                Target::Book => edit::set_book_monitored(repo, parse_id(&id)?, !off).await,
                Target::Series => edit::set_series_monitored(repo, parse_id(&id)?, !off).await,
            };
            result.or_raise(|| ErrorKind::Command)?;
        },
    }
    Ok(())
}

fn parse_id<T: FromStr>(value: &str) -> Result<T> {
    value.parse().ok().ok_or_raise(|| ErrorKind::Argument(format!("not a valid id: {value}")))
}

async fn refresh_library(repo: &Repository, providers: &ProviderRegistry, ctx: &Context) -> Result<RefreshSummary> {
    let mut events = pin!(refresh_all(repo, providers, ctx));
    let mut summary = RefreshSummary::default();
    while let Some(event) = events.next().await {
        match event.or_raise(|| ErrorKind::Command)? {
            RefreshEvent::Started => info!("refreshing library"),
            RefreshEvent::DiscoveryComplete(count) => info!(count, "discovered series"),
            RefreshEvent::Skipped { title, .. } => println!("skipped  {title}"),
            RefreshEvent::Refreshed(outcome) => println!("ok       {}", outcome.message()),
            RefreshEvent::Failed { key, error } => println!("failed   {key}: {error}"),
            RefreshEvent::Complete(done) => summary = done,
        }
    }
    Ok(summary)
}

async fn watch(config: &Config, repo: &Repository, providers: &ProviderRegistry, ctx: &Context) -> Result<()> {
    let mut ticker = tokio::time::interval(config.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(every = ?config.refresh_interval(), "watching library");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // A failed listing is retried on the next tick.
                if let Err(e) = refresh_library(repo, providers, ctx).await {
                    warn!(error = ?e, "library refresh failed");
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                return Ok(());
            },
        }
    }
}

async fn list_series(repo: &Repository) -> Result<()> {
    for series in repo.list_series().await.or_raise(|| ErrorKind::Command)? {
        println!("{}  {:<16}  {}", series.id, series.download_status.as_str(), series.title());
    }
    Ok(())
}

async fn show_series(repo: &Repository, id: SeriesId) -> Result<()> {
    let series = repo
        .series(id)
        .await
        .or_raise(|| ErrorKind::Command)?
        .ok_or_raise(|| ErrorKind::Argument(format!("no series with id {id}")))?;
    let books = repo.books(id).await.or_raise(|| ErrorKind::Command)?;
    let releases = repo.releases(id).await.or_raise(|| ErrorKind::Command)?;

    let key = series.key().map(|(source, external_id)| format!("{source}:{external_id}"));
    println!("{} [{}]", series.title(), key.as_deref().unwrap_or("local"));
    println!("  status: {} ({})", series.download_status, series.attrs.publishing_status.as_str());
    println!("  monitored: {}", series.monitored);
    if let Some(group_id) = series.group_id
        && let Some(group) = repo.group(group_id).await.or_raise(|| ErrorKind::Command)?
    {
        let role = if group.is_main(series.id) { "main series" } else { "member" };
        println!("  group: {} ({}, {role}, {})", group.title, group.id, group.download_status);
    }
    for book in books.iter().filter(|b| !b.deleted) {
        let count = releases.iter().filter(|r| !r.deleted && r.parent.book_id() == Some(book.id)).count();
        let mark = if book.downloaded { "x" } else { " " };
        let released = book.attrs.release_date.map(|d| d.to_string()).unwrap_or_else(|| "unannounced".to_string());
        println!("  [{mark}] {}  {}  ({released}, {count} release(s))", book.id, book.attrs.title);
    }
    Ok(())
}
