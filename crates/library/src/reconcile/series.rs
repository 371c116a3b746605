use crate::Context;
use crate::lock::SeriesKey;
use crate::notify::Notification;
use crate::reconcile::error::{ErrorKind, Result};
use crate::reconcile::group::{ResolvedGroup, resolve_group};
use crate::reconcile::merge::{ChangeKind, SeriesParent, pair, upsert};
use crate::reconcile::sweep::{sweep_missing_books, sweep_missing_chapters};
use crate::status::{derive_status, propagate};
use exn::{OptionExt, ResultExt};
use lnauto_metadata::error::ErrorKind as ProviderErrorKind;
use lnauto_metadata::models::{FetchedBook, FetchedChapter, FetchedSeries, ReleaseAttrs};
use lnauto_metadata::{MetadataProvider, ProviderRegistry};
use lnauto_store::{DownloadStatus, GroupId, Release, ReleaseParent, Repository, Series, SeriesId, Transaction};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Which series to reconcile, and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Name of the registered provider to fetch from.
    pub source: String,
    pub external_id: String,
    /// Put the series in this existing group instead of resolving one.
    pub group: Option<GroupId>,
}
impl Request {
    pub fn new(source: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self { source: source.into(), external_id: external_id.into(), group: None }
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(&self.source, &self.external_id)
    }
}

/// Per-level counts of what a reconciliation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Soft-deleted because the fetch no longer reported them.
    pub deleted: usize,
}
impl Tally {
    fn record(&mut self, change: ChangeKind) {
        match change {
            ChangeKind::Created => self.created += 1,
            ChangeKind::Updated => self.updated += 1,
            ChangeKind::Unchanged => self.unchanged += 1,
        }
    }
}

/// The result of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub series_id: SeriesId,
    pub group_id: GroupId,
    pub title: String,
    /// What happened to the series row itself.
    pub change: ChangeKind,
    pub status: DownloadStatus,
    pub books: Tally,
    pub chapters: Tally,
    pub releases: Tally,
}
impl Outcome {
    /// A one-line summary for whoever asked for the reconciliation.
    pub fn message(&self) -> String {
        match self.change {
            ChangeKind::Created => format!("Added '{}' to library.", self.title),
            _ => format!(
                "Refreshed '{}': {} new book(s), {} new chapter(s), {} new release(s), {} book(s) removed.",
                self.title, self.books.created, self.chapters.created, self.releases.created, self.books.deleted
            ),
        }
    }
}

/// Fetch one series from its provider and merge it into the library.
///
/// The provider is called before any transaction is opened. Everything after
/// that (group resolution, the merge of the series, its books, chapters and
/// releases, the deletion sweep and the status update) is one transaction:
/// on error nothing is written. Notifications are sent only after the
/// commit.
///
/// Reconciliations of the same `(source, external_id)` are serialized through
/// [`Context::locks`].
#[instrument(skip_all, fields(source = %request.source, external_id = %request.external_id))]
pub async fn reconcile(
    repo: &Repository,
    providers: &ProviderRegistry,
    ctx: &Context,
    request: &Request,
) -> Result<Outcome> {
    if request.source.trim().is_empty() {
        exn::bail!(ErrorKind::Validation("source must not be empty"));
    }
    if request.external_id.trim().is_empty() {
        exn::bail!(ErrorKind::Validation("external id must not be empty"));
    }
    let provider = providers
        .get(&request.source)
        .ok_or_raise(|| ErrorKind::UnknownSource(request.source.clone()))?;

    let _guard = ctx.locks.lock(&request.key()).await;
    let fetched = fetch(&**provider, &request.external_id).await?;
    let (outcome, notifications) = merge(repo, ctx, request, fetched).await?;
    ctx.notifier.send_all(notifications);

    info!(
        series = %outcome.series_id,
        change = %outcome.change,
        status = %outcome.status,
        books.created = outcome.books.created,
        books.deleted = outcome.books.deleted,
        releases.created = outcome.releases.created,
        "reconciled series"
    );
    Ok(outcome)
}

async fn fetch(provider: &(dyn MetadataProvider + Send + Sync), external_id: &str) -> Result<FetchedSeries> {
    match provider.fetch(external_id).await {
        Ok(Some(fetched)) => Ok(fetched),
        Ok(None) => exn::bail!(ErrorKind::SeriesNotFound(external_id.to_string())),
        Err(e) if matches!(&*e, ProviderErrorKind::NotFound(_)) => {
            Err(e).or_raise(|| ErrorKind::SeriesNotFound(external_id.to_string()))
        },
        Err(e) => {
            let retryable = e.is_retryable();
            Err(e).or_raise(|| ErrorKind::Provider { retryable })
        },
    }
}

/// Notifications are only queued for incremental updates; a first import
/// gets a single "added" notification instead.
struct Queue {
    incremental: bool,
    series_title: String,
    notifications: Vec<Notification>,
}
impl Queue {
    fn created(&mut self, what: impl std::fmt::Display) {
        if self.incremental {
            self.notifications.push(Notification::info(format!("New {what} added to '{}'.", self.series_title)));
        }
    }
}

async fn merge(
    repo: &Repository,
    ctx: &Context,
    request: &Request,
    fetched: FetchedSeries,
) -> Result<(Outcome, Vec<Notification>)> {
    let FetchedSeries { series: mut attrs, books, chapters } = fetched;
    // The request is authoritative for the merge key, whatever the provider echoes back.
    attrs.external_id = Some(request.external_id.clone());

    let mut tx = repo.begin().await.or_raise(|| ErrorKind::Store)?;
    let existing = tx.series_by_key(&request.source, &request.external_id).await.or_raise(|| ErrorKind::Store)?;
    let incremental = existing.is_some();
    let previous_group = existing.as_ref().and_then(|s| s.group_id);

    let ResolvedGroup { mut group, created: new_group, mirrored } =
        resolve_group(&mut tx, existing.as_ref(), request.group, &attrs).await?;
    if new_group {
        tx.save_group(&group).await.or_raise(|| ErrorKind::Store)?;
    }
    let parent = SeriesParent { source: request.source.clone(), group_id: group.id };
    let (mut series, series_change) = upsert(existing, parent, attrs);
    if series_change.needs_write() {
        tx.save_series(&series).await.or_raise(|| ErrorKind::Store)?;
    }
    if new_group {
        // First series into a group becomes its main series; never reassigned later.
        group.main_series_id = Some(series.id);
    }
    if new_group || mirrored {
        tx.save_group(&group).await.or_raise(|| ErrorKind::Store)?;
    }
    if let Some(previous) = previous_group.filter(|id| *id != group.id) {
        detach_main_series(&mut tx, previous, series.id).await?;
    }

    let mut queue = Queue { incremental, series_title: series.title().to_string(), notifications: Vec::new() };
    let mut outcome = Outcome {
        series_id: series.id,
        group_id: group.id,
        title: series.title().to_string(),
        change: series_change,
        status: series.download_status,
        books: Tally::default(),
        chapters: Tally::default(),
        releases: Tally::default(),
    };

    let books = dedupe(books, |fetched| fetched.book.external_id.as_deref(), "book");
    let stored_books = tx.books(series.id).await.or_raise(|| ErrorKind::Store)?;
    let stored_chapters = tx.chapters(series.id).await.or_raise(|| ErrorKind::Store)?;
    let mut stored_releases: HashMap<ReleaseParent, Vec<Release>> = HashMap::new();
    for release in tx.releases(series.id).await.or_raise(|| ErrorKind::Store)? {
        stored_releases.entry(release.parent).or_default().push(release);
    }

    let mut fetched_books = HashSet::new();
    let paired = pair(stored_books, &books.iter().map(|fetched| &fetched.book).collect::<Vec<_>>());
    for (FetchedBook { book: attrs, releases }, existing) in books.into_iter().zip(paired) {
        if let Some(id) = &attrs.external_id {
            fetched_books.insert(id.clone());
        }
        let (book, change) = upsert(existing, series.id, attrs);
        if change.needs_write() {
            tx.save_book(&book).await.or_raise(|| ErrorKind::Store)?;
        }
        outcome.books.record(change);
        if change.is_created() {
            queue.created(format_args!("book '{}'", book.attrs.title));
        }
        let parent = ReleaseParent::Book(book.id);
        let stored = stored_releases.remove(&parent).unwrap_or_default();
        merge_releases(&mut tx, parent, &book.attrs.title, stored, releases, &mut outcome, &mut queue).await?;
    }

    let mut fetched_chapters = HashSet::new();
    let paired = pair(stored_chapters, &chapters.iter().map(|fetched| &fetched.chapter).collect::<Vec<_>>());
    for (FetchedChapter { chapter: attrs, releases }, existing) in chapters.into_iter().zip(paired) {
        fetched_chapters.insert((attrs.number, attrs.volume));
        let (chapter, change) = upsert(existing, series.id, attrs);
        if change.needs_write() {
            tx.save_chapter(&chapter).await.or_raise(|| ErrorKind::Store)?;
        }
        outcome.chapters.record(change);
        let label = format!("chapter {}", chapter.attrs.label());
        if change.is_created() {
            queue.created(&label);
        }
        let parent = ReleaseParent::Chapter(chapter.id);
        let stored = stored_releases.remove(&parent).unwrap_or_default();
        merge_releases(&mut tx, parent, &label, stored, releases, &mut outcome, &mut queue).await?;
    }

    let swept = sweep_missing_books(&mut tx, series.id, &fetched_books).await?;
    outcome.books.deleted = swept.len();
    if ctx.sweep_chapters {
        let swept = sweep_missing_chapters(&mut tx, series.id, &fetched_chapters).await?;
        outcome.chapters.deleted = swept.len();
    }
    debug!(books = outcome.books.deleted, chapters = outcome.chapters.deleted, "swept missing children");

    outcome.status = update_status(&mut tx, &mut series, ctx).await?;
    tx.commit().await.or_raise(|| ErrorKind::Store)?;

    let mut notifications = queue.notifications;
    if !incremental {
        notifications.push(Notification::success(outcome.message()));
    }
    Ok((outcome, notifications))
}

async fn merge_releases(
    tx: &mut Transaction,
    parent: ReleaseParent,
    parent_title: &str,
    stored: Vec<Release>,
    releases: Vec<ReleaseAttrs>,
    outcome: &mut Outcome,
    queue: &mut Queue,
) -> Result<()> {
    let releases = dedupe(releases, |attrs| attrs.external_id.as_deref(), "release");
    let paired = pair(stored, &releases.iter().collect::<Vec<_>>());
    for (attrs, existing) in releases.into_iter().zip(paired) {
        let (release, change) = upsert(existing, parent, attrs);
        if change.needs_write() {
            tx.save_release(&release).await.or_raise(|| ErrorKind::Store)?;
        }
        outcome.releases.record(change);
        if change.is_created() {
            queue.created(format_args!("release of {parent_title}"));
        }
    }
    Ok(())
}

/// Keeps the first of any fetched entries sharing an external id.
fn dedupe<T>(items: Vec<T>, external_id: impl Fn(&T) -> Option<&str>, kind: &str) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| match external_id(item) {
            Some(id) if !seen.insert(id.to_string()) => {
                warn!(kind, external_id = id, "provider repeated an external id, keeping the first");
                false
            }
            _ => true,
        })
        .collect()
}

/// A series that moved to another group stops being the main series of the
/// group it left.
async fn detach_main_series(tx: &mut Transaction, group_id: GroupId, series_id: SeriesId) -> Result<()> {
    let Some(mut group) = tx.group(group_id).await.or_raise(|| ErrorKind::Store)? else {
        return Ok(());
    };
    if group.is_main(series_id) {
        debug!(group = %group_id, "series left the group it was the main series of");
        group.main_series_id = None;
        tx.save_group(&group).await.or_raise(|| ErrorKind::Store)?;
    }
    Ok(())
}

/// Re-derive a series' download status from what is in the transaction, and
/// carry it over to the group when the series is the group's main series.
pub(crate) async fn update_status(tx: &mut Transaction, series: &mut Series, ctx: &Context) -> Result<DownloadStatus> {
    let books = tx.books(series.id).await.or_raise(|| ErrorKind::Store)?;
    let releases = tx.releases(series.id).await.or_raise(|| ErrorKind::Store)?;
    let status = derive_status(&books, &releases, series.attrs.publishing_status, ctx.language, ctx.today());
    if series.download_status != status {
        debug!(from = %series.download_status, to = %status, "download status changed");
        series.download_status = status;
        tx.save_series(series).await.or_raise(|| ErrorKind::Store)?;
    }
    if let Some(group_id) = series.group_id {
        let mut group = tx
            .group(group_id)
            .await
            .or_raise(|| ErrorKind::Store)?
            .ok_or_raise(|| ErrorKind::InvalidState("series references a missing group"))?;
        if propagate(series, &mut group) {
            tx.save_group(&group).await.or_raise(|| ErrorKind::Store)?;
        }
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notifier;
    use crate::testing::{self, SOURCE, TODAY, book, ctx, registry, repo};
    use lnauto_metadata::error::ErrorKind as ProviderErrorKind;
    use lnauto_metadata::models::{BookAttrs, ChapterAttrs};
    use lnauto_metadata::provider::MockProvider;
    use lnauto_metadata::{Language, PublishingStatus};
    use lnauto_store::SeriesGroup;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use time::macros::date;

    fn two_volumes() -> FetchedSeries {
        let (v1, r1) = book("b-1", "Volume 1", Some(date!(2020 - 01 - 01)));
        let (v2, r2) = book("b-2", "Volume 2", Some(date!(2021 - 01 - 01)));
        testing::series("42", "Spice and Wolf", PublishingStatus::Ongoing).with_book(v1, r1).with_book(v2, r2)
    }

    fn drain(receiver: &mut tokio::sync::mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
        std::iter::from_fn(|| receiver.try_recv().ok()).collect()
    }

    fn ctx_with(notifier: Notifier) -> Context {
        Context::new(notifier).with_today(TODAY)
    }

    #[tokio::test]
    async fn test_first_import_creates_tree() {
        let repo = repo().await;
        let provider = Arc::new(MockProvider::default().with_series("42", two_volumes()));
        let (notifier, mut receiver) = Notifier::channel();
        let ctx = ctx_with(notifier);

        let outcome = reconcile(&repo, &registry(&provider), &ctx, &Request::new(SOURCE, "42")).await.unwrap();
        assert_eq!(outcome.change, ChangeKind::Created);
        assert_eq!(outcome.books.created, 2);
        assert_eq!(outcome.releases.created, 2);
        assert_eq!(outcome.status, DownloadStatus::None);

        let series = repo.series(outcome.series_id).await.unwrap().unwrap();
        assert_eq!(series.source.as_deref(), Some(SOURCE));
        assert_eq!(series.group_id, Some(outcome.group_id));
        let group = repo.group(outcome.group_id).await.unwrap().unwrap();
        assert_eq!(group.main_series_id, Some(series.id));
        assert_eq!(group.title, "Spice and Wolf");
        assert!(group.monitored);

        // A first import announces itself once, not once per child.
        assert_eq!(drain(&mut receiver), [Notification::success("Added 'Spice and Wolf' to library.")]);
    }

    #[tokio::test]
    async fn test_second_run_is_unchanged() {
        let repo = repo().await;
        let provider = Arc::new(MockProvider::default().with_series("42", two_volumes()));
        let providers = registry(&provider);
        let (notifier, mut receiver) = Notifier::channel();
        let ctx = ctx_with(notifier);
        let request = Request::new(SOURCE, "42");

        let first = reconcile(&repo, &providers, &ctx, &request).await.unwrap();
        drain(&mut receiver);
        let second = reconcile(&repo, &providers, &ctx, &request).await.unwrap();

        assert_eq!(second.series_id, first.series_id);
        assert_eq!(second.group_id, first.group_id);
        assert_eq!(second.change, ChangeKind::Unchanged);
        assert_eq!(second.books, Tally { unchanged: 2, ..Tally::default() });
        assert_eq!(second.releases, Tally { unchanged: 2, ..Tally::default() });
        assert_eq!(repo.books(first.series_id).await.unwrap().len(), 2);
        assert_eq!(repo.releases(first.series_id).await.unwrap().len(), 2);
        assert_eq!(repo.list_series().await.unwrap().len(), 1);
        assert!(drain(&mut receiver).is_empty());
    }

    #[tokio::test]
    async fn test_refresh_keeps_user_fields() {
        let repo = repo().await;
        let provider = Arc::new(MockProvider::default().with_series("42", two_volumes()));
        let providers = registry(&provider);
        let ctx = ctx();
        let request = Request::new(SOURCE, "42");
        let outcome = reconcile(&repo, &providers, &ctx, &request).await.unwrap();

        let mut tx = repo.begin().await.unwrap();
        let mut books = tx.books(outcome.series_id).await.unwrap();
        books[0].downloaded = true;
        books[1].monitored = false;
        tx.save_book(&books[0]).await.unwrap();
        tx.save_book(&books[1]).await.unwrap();
        tx.commit().await.unwrap();

        let mut renamed = two_volumes();
        renamed.books[0].book.title = "Volume I".to_string();
        provider.set("42", renamed).await;
        let outcome = reconcile(&repo, &providers, &ctx, &request).await.unwrap();
        assert_eq!(outcome.books.updated, 1);

        let books = repo.books(outcome.series_id).await.unwrap();
        assert_eq!(books[0].attrs.title, "Volume I");
        assert!(books[0].downloaded);
        assert!(!books[1].monitored);
        assert_eq!(outcome.status, DownloadStatus::Missing);
    }

    #[tokio::test]
    async fn test_incremental_changes_are_announced() {
        let repo = repo().await;
        let (v1, r1) = book("b-1", "Volume 1", Some(date!(2020 - 01 - 01)));
        let first = testing::series("42", "Spice and Wolf", PublishingStatus::Ongoing).with_book(v1, r1);
        let provider = Arc::new(MockProvider::default().with_series("42", first));
        let providers = registry(&provider);
        let (notifier, mut receiver) = Notifier::channel();
        let ctx = ctx_with(notifier);
        let request = Request::new(SOURCE, "42");

        reconcile(&repo, &providers, &ctx, &request).await.unwrap();
        drain(&mut receiver);
        provider.set("42", two_volumes()).await;
        let outcome = reconcile(&repo, &providers, &ctx, &request).await.unwrap();

        assert_eq!(outcome.books.created, 1);
        assert_eq!(
            drain(&mut receiver),
            [
                Notification::info("New book 'Volume 2' added to 'Spice and Wolf'."),
                Notification::info("New release of Volume 2 added to 'Spice and Wolf'."),
            ]
        );
        assert!(outcome.message().starts_with("Refreshed 'Spice and Wolf': 1 new book(s)"));
    }

    #[tokio::test]
    async fn test_missing_book_is_soft_deleted() {
        let repo = repo().await;
        let provider = Arc::new(MockProvider::default().with_series("42", two_volumes()));
        let providers = registry(&provider);
        let ctx = ctx();
        let request = Request::new(SOURCE, "42");
        reconcile(&repo, &providers, &ctx, &request).await.unwrap();

        let mut shrunk = two_volumes();
        shrunk.books.truncate(1);
        provider.set("42", shrunk).await;
        let outcome = reconcile(&repo, &providers, &ctx, &request).await.unwrap();
        assert_eq!(outcome.books.deleted, 1);

        let books = repo.books(outcome.series_id).await.unwrap();
        assert_eq!(books.len(), 2);
        assert!(!books[0].deleted);
        assert!(books[1].deleted);
        // Releases of a deleted book stay put, and are not swept themselves.
        let releases = repo.releases(outcome.series_id).await.unwrap();
        assert_eq!(releases.len(), 2);
        assert!(releases.iter().all(|r| !r.deleted));

        // Reappearing restores the same book.
        provider.set("42", two_volumes()).await;
        let outcome = reconcile(&repo, &providers, &ctx, &request).await.unwrap();
        assert_eq!(outcome.books.created, 0);
        assert!(repo.books(outcome.series_id).await.unwrap().iter().all(|b| !b.deleted));
    }

    #[tokio::test]
    async fn test_requested_group_is_left_alone() {
        let repo = repo().await;
        let provider = Arc::new(
            MockProvider::default()
                .with_series("42", two_volumes())
                .with_series("43", testing::series("43", "Spice and Wolf (Manga)", PublishingStatus::Ongoing)),
        );
        let providers = registry(&provider);
        let ctx = ctx();
        let main = reconcile(&repo, &providers, &ctx, &Request::new(SOURCE, "42")).await.unwrap();
        let before = repo.group(main.group_id).await.unwrap().unwrap();

        let request = Request::new(SOURCE, "43").with_group(main.group_id);
        let spinoff = reconcile(&repo, &providers, &ctx, &request).await.unwrap();
        assert_eq!(spinoff.group_id, main.group_id);
        assert_eq!(repo.group(main.group_id).await.unwrap().unwrap(), before);
        assert_eq!(repo.series_in_group(main.group_id).await.unwrap().len(), 2);

        // Later refreshes keep it there without a request for it.
        let again = reconcile(&repo, &providers, &ctx, &Request::new(SOURCE, "43")).await.unwrap();
        assert_eq!(again.group_id, main.group_id);
        assert_eq!(repo.group(main.group_id).await.unwrap().unwrap().title, "Spice and Wolf");
    }

    #[tokio::test]
    async fn test_unknown_group_is_rejected() {
        let repo = repo().await;
        let provider = Arc::new(MockProvider::default().with_series("42", two_volumes()));
        let missing = GroupId::new();
        let request = Request::new(SOURCE, "42").with_group(missing);

        let err = reconcile(&repo, &registry(&provider), &ctx(), &request).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::GroupNotFound(id) if *id == missing));
        assert!(repo.list_series().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_group_is_replaced() {
        let repo = repo().await;
        let provider = Arc::new(MockProvider::default().with_series("42", two_volumes()));
        let providers = registry(&provider);
        let request = Request::new(SOURCE, "42");
        let first = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert!(repo.delete_group(first.group_id).await.unwrap());

        let second = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert_ne!(second.group_id, first.group_id);
        let group = repo.group(second.group_id).await.unwrap().unwrap();
        assert_eq!(group.main_series_id, Some(first.series_id));
    }

    #[tokio::test]
    async fn test_main_series_mirrors_into_group() {
        let repo = repo().await;
        let provider = Arc::new(MockProvider::default().with_series("42", two_volumes()));
        let providers = registry(&provider);
        let request = Request::new(SOURCE, "42");
        let first = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();

        let mut renamed = two_volumes();
        renamed.series.title = "Ookami to Koushinryou".to_string();
        renamed.series.img_url = Some("https://example.org/cover.jpg".to_string());
        provider.set("42", renamed).await;
        reconcile(&repo, &providers, &ctx(), &request).await.unwrap();

        let group: SeriesGroup = repo.group(first.group_id).await.unwrap().unwrap();
        assert_eq!(group.title, "Ookami to Koushinryou");
        assert_eq!(group.img_url.as_deref(), Some("https://example.org/cover.jpg"));
    }

    #[tokio::test]
    async fn test_request_errors() {
        let repo = repo().await;
        let provider = Arc::new(MockProvider::default());
        provider.fail("500", ProviderErrorKind::Transport("bad gateway".to_string())).await;
        provider.fail("404", ProviderErrorKind::NotFound("404".to_string())).await;
        let providers = registry(&provider);
        let ctx = ctx();

        let err = reconcile(&repo, &providers, &ctx, &Request::new("nowhere", "42")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownSource(s) if s == "nowhere"));
        let err = reconcile(&repo, &providers, &ctx, &Request::new(SOURCE, " ")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Validation(_)));
        let err = reconcile(&repo, &providers, &ctx, &Request::new(SOURCE, "42")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::SeriesNotFound(id) if id == "42"));
        let err = reconcile(&repo, &providers, &ctx, &Request::new(SOURCE, "404")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::SeriesNotFound(_)));
        let err = reconcile(&repo, &providers, &ctx, &Request::new(SOURCE, "500")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Provider { retryable: true }));
        assert!(err.is_retryable());

        assert!(repo.list_series().await.unwrap().is_empty());
        // Validation and unknown sources never reach the provider.
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_provider_id_is_overridden_by_request() {
        let repo = repo().await;
        let echoed = testing::series("0042", "Spice and Wolf", PublishingStatus::Ongoing);
        let provider = Arc::new(MockProvider::default().with_series("42", echoed));
        let outcome = reconcile(&repo, &registry(&provider), &ctx(), &Request::new(SOURCE, "42")).await.unwrap();
        let series = repo.series_by_key(SOURCE, "42").await.unwrap().unwrap();
        assert_eq!(series.id, outcome.series_id);
    }

    #[tokio::test]
    async fn test_chapters_match_by_position() {
        let repo = repo().await;
        let snapshot = testing::series("42", "Web Novel", PublishingStatus::Ongoing)
            .with_chapter(ChapterAttrs::new("Prologue", None, None), [])
            .with_chapter(ChapterAttrs::new("Chapter 1", Some(1), Some(1)), [
                ReleaseAttrs::new("c-1", Language::En, Some(date!(2020 - 01 - 01))),
            ]);
        let provider = Arc::new(MockProvider::default().with_series("42", snapshot.clone()));
        let providers = registry(&provider);
        let request = Request::new(SOURCE, "42");
        reconcile(&repo, &providers, &ctx(), &request).await.unwrap();

        let mut retitled = snapshot;
        retitled.chapters[0].chapter.title = "Prologue: A Wolf".to_string();
        provider.set("42", retitled).await;
        let outcome = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert_eq!(outcome.chapters, Tally { updated: 1, unchanged: 1, ..Tally::default() });
        assert_eq!(outcome.releases.unchanged, 1);

        let chapters = repo.chapters(outcome.series_id).await.unwrap();
        assert_eq!(chapters.len(), 2);
        assert!(chapters.iter().any(|c| c.attrs.title == "Prologue: A Wolf"));
    }

    #[tokio::test]
    async fn test_chapter_sweep_is_opt_in() {
        let repo = repo().await;
        let snapshot = testing::series("42", "Web Novel", PublishingStatus::Ongoing)
            .with_chapter(ChapterAttrs::new("Chapter 1", None, Some(1)), [])
            .with_chapter(ChapterAttrs::new("Chapter 2", None, Some(2)), []);
        let provider = Arc::new(MockProvider::default().with_series("42", snapshot.clone()));
        let providers = registry(&provider);
        let request = Request::new(SOURCE, "42");
        reconcile(&repo, &providers, &ctx(), &request).await.unwrap();

        let mut shrunk = snapshot;
        shrunk.chapters.truncate(1);
        provider.set("42", shrunk).await;
        let kept = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert_eq!(kept.chapters.deleted, 0);

        let sweeping = Context { sweep_chapters: true, ..ctx() };
        let swept = reconcile(&repo, &providers, &sweeping, &request).await.unwrap();
        assert_eq!(swept.chapters.deleted, 1);
        let chapters = repo.chapters(swept.series_id).await.unwrap();
        assert_eq!(chapters.iter().filter(|c| c.deleted).count(), 1);
    }

    #[tokio::test]
    async fn test_status_follows_downloads_to_group() {
        let repo = repo().await;
        let mut snapshot = two_volumes();
        snapshot.series.publishing_status = PublishingStatus::Completed;
        let provider = Arc::new(MockProvider::default().with_series("42", snapshot));
        let providers = registry(&provider);
        let request = Request::new(SOURCE, "42");
        let outcome = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();

        let mut tx = repo.begin().await.unwrap();
        for mut book in tx.books(outcome.series_id).await.unwrap() {
            book.downloaded = true;
            tx.save_book(&book).await.unwrap();
        }
        tx.commit().await.unwrap();

        let outcome = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert_eq!(outcome.status, DownloadStatus::Completed);
        let group = repo.group(outcome.group_id).await.unwrap().unwrap();
        assert_eq!(group.download_status, DownloadStatus::Completed);
    }

    #[tokio::test]
    async fn test_unreleased_books_do_not_count() {
        let repo = repo().await;
        let (v3, r3) = book("b-3", "Volume 3", Some(date!(2030 - 01 - 01)));
        let mut snapshot = two_volumes().with_book(v3, r3);
        snapshot.series.publishing_status = PublishingStatus::Ongoing;
        let provider = Arc::new(MockProvider::default().with_series("42", snapshot));
        let providers = registry(&provider);
        let request = Request::new(SOURCE, "42");
        let outcome = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();

        let mut tx = repo.begin().await.unwrap();
        for mut book in tx.books(outcome.series_id).await.unwrap().into_iter().take(2) {
            book.downloaded = true;
            tx.save_book(&book).await.unwrap();
        }
        tx.commit().await.unwrap();

        let outcome = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert_eq!(outcome.status, DownloadStatus::FullyContinuing);
    }

    fn unnamed(title: &str) -> BookAttrs {
        BookAttrs { external_id: None, ..BookAttrs::new("", title) }
    }

    #[tokio::test]
    async fn test_books_without_external_id_stay_apart() {
        let repo = repo().await;
        let fetched = testing::series("42", "Spice and Wolf", PublishingStatus::Ongoing)
            .with_book(unnamed("Side Story A"), Vec::new())
            .with_book(unnamed("Side Story B"), Vec::new());
        let provider = Arc::new(MockProvider::default().with_series("42", fetched));
        let providers = registry(&provider);
        let request = Request::new(SOURCE, "42");

        let first = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert_eq!(first.books.created, 2);
        let mut tx = repo.begin().await.unwrap();
        let mut books = tx.books(first.series_id).await.unwrap();
        assert_eq!(books.len(), 2);
        books[1].downloaded = true;
        tx.save_book(&books[1]).await.unwrap();
        tx.commit().await.unwrap();

        let second = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert_eq!(second.books, Tally { unchanged: 2, ..Tally::default() });
        let books = repo.books(first.series_id).await.unwrap();
        let titles: Vec<_> = books.iter().map(|book| book.attrs.title.as_str()).collect();
        assert_eq!(titles, ["Side Story A", "Side Story B"]);
        assert!(!books[0].downloaded);
        assert!(books[1].downloaded);
    }

    #[tokio::test]
    async fn test_releases_without_external_id_stay_apart() {
        let repo = repo().await;
        let released = Some(date!(2020 - 01 - 01));
        let (attrs, _) = book("b-1", "Volume 1", released);
        let releases = vec![
            ReleaseAttrs { external_id: None, ..ReleaseAttrs::new("", Language::En, released) },
            ReleaseAttrs { external_id: None, ..ReleaseAttrs::new("", Language::Ja, Some(date!(2019 - 06 - 01))) },
        ];
        let fetched = testing::series("42", "Spice and Wolf", PublishingStatus::Ongoing).with_book(attrs, releases);
        let provider = Arc::new(MockProvider::default().with_series("42", fetched.clone()));
        let providers = registry(&provider);
        let request = Request::new(SOURCE, "42");

        let first = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert_eq!(first.releases.created, 2);
        let second = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert_eq!(second.releases, Tally { unchanged: 2, ..Tally::default() });
        assert_eq!(repo.releases(first.series_id).await.unwrap().len(), 2);

        // A changed id-less release updates one of the rows instead of adding a third.
        let mut moved = fetched;
        moved.books[0].releases[1].release_date = Some(date!(2019 - 07 - 01));
        provider.set("42", moved).await;
        let third = reconcile(&repo, &providers, &ctx(), &request).await.unwrap();
        assert_eq!(third.releases, Tally { updated: 1, unchanged: 1, ..Tally::default() });
        assert_eq!(repo.releases(first.series_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_external_id_keeps_first_book() {
        let repo = repo().await;
        let (v1, r1) = book("b-1", "Volume 1", Some(date!(2020 - 01 - 01)));
        let (repeat, r2) = book("b-1", "Volume 1 (again)", Some(date!(2020 - 02 - 01)));
        let fetched =
            testing::series("42", "Spice and Wolf", PublishingStatus::Ongoing).with_book(v1, r1).with_book(repeat, r2);
        let provider = Arc::new(MockProvider::default().with_series("42", fetched));

        let outcome = reconcile(&repo, &registry(&provider), &ctx(), &Request::new(SOURCE, "42")).await.unwrap();
        assert_eq!(outcome.books.created, 1);
        assert_eq!(outcome.releases.created, 1);
        let books = repo.books(outcome.series_id).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].attrs.title, "Volume 1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_requests_for_one_series_are_serialized() {
        let repo = repo().await;
        let delay = Duration::from_millis(100);
        let provider = Arc::new(MockProvider::default().with_series("42", two_volumes()).with_delay(delay));
        let providers = registry(&provider);
        let ctx = ctx();
        let request = Request::new(SOURCE, "42");

        let started = Instant::now();
        let (a, b) = tokio::join!(
            reconcile(&repo, &providers, &ctx, &request),
            reconcile(&repo, &providers, &ctx, &request),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        // The second fetch only starts once the first reconciliation is done.
        assert_eq!(provider.calls(), 2);
        assert!(started.elapsed() >= delay * 2);
        assert_eq!(a.series_id, b.series_id);
        let changes = [a.change, b.change];
        assert!(changes.contains(&ChangeKind::Created));
        assert!(changes.contains(&ChangeKind::Unchanged));
        assert_eq!(repo.list_series().await.unwrap().len(), 1);
        assert_eq!(repo.books(a.series_id).await.unwrap().len(), 2);
        assert_eq!(repo.releases(a.series_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_moving_main_series_clears_old_group() {
        let repo = repo().await;
        let provider = Arc::new(
            MockProvider::default()
                .with_series("42", two_volumes())
                .with_series("43", testing::series("43", "Log Horizon", PublishingStatus::Completed)),
        );
        let providers = registry(&provider);
        let ctx = ctx();
        let moved = reconcile(&repo, &providers, &ctx, &Request::new(SOURCE, "42")).await.unwrap();
        let target = reconcile(&repo, &providers, &ctx, &Request::new(SOURCE, "43")).await.unwrap();
        let before = repo.group(target.group_id).await.unwrap().unwrap();

        let request = Request::new(SOURCE, "42").with_group(target.group_id);
        let outcome = reconcile(&repo, &providers, &ctx, &request).await.unwrap();
        assert_eq!(outcome.group_id, target.group_id);
        assert_eq!(repo.series(moved.series_id).await.unwrap().unwrap().group_id, Some(target.group_id));

        let old = repo.group(moved.group_id).await.unwrap().unwrap();
        assert_eq!(old.main_series_id, None);
        assert_eq!(repo.group(target.group_id).await.unwrap().unwrap(), before);
    }
}
