//! Shared fixtures for this crate's tests.

use crate::Context;
use lnauto_metadata::models::{BookAttrs, FetchedSeries, ReleaseAttrs, SeriesAttrs};
use lnauto_metadata::provider::MockProvider;
use lnauto_metadata::{Language, ProviderRegistry, PublishingStatus};
use lnauto_store::{Database, Repository};
use std::sync::Arc;
use time::Date;
use time::macros::date;

pub(crate) const SOURCE: &str = "mock";
pub(crate) const TODAY: Date = date!(2024 - 06 - 01);

pub(crate) async fn repo() -> Repository {
    let db = Database::connect_in_memory().await.unwrap();
    Repository::from(&db)
}

pub(crate) fn registry(provider: &Arc<MockProvider>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register_handle(provider.clone());
    registry
}

pub(crate) fn ctx() -> Context {
    Context::default().with_today(TODAY)
}

pub(crate) fn series(external_id: &str, title: &str, status: PublishingStatus) -> FetchedSeries {
    FetchedSeries::new(SeriesAttrs { publishing_status: status, ..SeriesAttrs::new(external_id, title) })
}

/// A book with a single English release on `released`.
pub(crate) fn book(external_id: &str, title: &str, released: Option<Date>) -> (BookAttrs, Vec<ReleaseAttrs>) {
    let attrs = BookAttrs { release_date: released, ..BookAttrs::new(external_id, title) };
    let release = ReleaseAttrs::new(format!("{external_id}-en"), Language::En, released);
    (attrs, vec![release])
}
