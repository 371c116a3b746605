//! Metadata provider contract for the ln-auto library.
//!
//! This crate defines what a metadata source hands to the library: a
//! [`FetchedSeries`](models::FetchedSeries) tree of series attributes, books
//! with their releases, and chapters with their releases. Providers implement
//! [`MetadataProvider`](provider::MetadataProvider) and are looked up by name
//! through a [`ProviderRegistry`](provider::ProviderRegistry).

pub mod error;
pub mod models;
pub mod provider;

pub use crate::models::{FetchedSeries, Language, PublishingStatus};
pub use crate::provider::{MetadataProvider, ProviderHandle, ProviderRegistry};
