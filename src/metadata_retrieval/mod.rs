/// Data structures and traits for season and series metadata retrieval.
///
/// This module provides the lookup inputs (`SeasonInfo`, `SeriesInfo`), the
/// resolved items (`Season`, `Series`) wrapped in a `MetadataResult`, and the
/// traits that connect the season provider to the host and to the series
/// provider it delegates to.
mod cached;
mod offline;
mod season;

pub use cached::CachedSeriesProvider;
pub use offline::OfflineSeriesProvider;
pub use season::AniDbSeasonProvider;

use crate::provider_ids::ProviderIds;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during metadata retrieval operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The caller cancelled the request
    #[error("Request was cancelled")]
    Cancelled,

    /// The provider does not implement this operation
    #[error("{operation} is not supported by this provider")]
    NotSupported { operation: &'static str },

    /// Request to an upstream metadata source failed
    #[error("Request failed: {0}")]
    Request(String),
}

/// Lookup input describing a season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonInfo {
    /// Display name as known to the library
    pub name: Option<String>,
    /// Season number within the series
    pub index_number: Option<i32>,
    /// Filesystem location of the season
    pub path: Option<PathBuf>,
    /// External ids already known for the season
    pub provider_ids: ProviderIds,
}

/// Lookup input describing a series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesInfo {
    /// External ids of the series, the AniDB id in particular
    pub provider_ids: ProviderIds,
}

/// A resolved season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Season {
    /// Display name, the series name when inherited from it
    pub name: Option<String>,
    /// Season number within the series
    pub index_number: Option<i32>,
    /// Plot summary
    pub overview: Option<String>,
    /// Year the series started airing
    pub production_year: Option<i32>,
    /// First air date
    pub premiere_date: Option<DateTime<Utc>>,
    /// Last air date, `None` while still airing
    pub end_date: Option<DateTime<Utc>>,
    /// Average user rating
    pub community_rating: Option<f32>,
    /// Animation studios, in provider order
    pub studios: Vec<String>,
    /// Genres, in provider order
    pub genres: Vec<String>,
    /// External ids of the season itself
    pub provider_ids: ProviderIds,
}

/// A resolved series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Series {
    /// The series title
    pub name: Option<String>,
    /// Plot summary
    pub overview: Option<String>,
    /// Year the series started airing
    pub production_year: Option<i32>,
    /// First air date
    pub premiere_date: Option<DateTime<Utc>>,
    /// Last air date, `None` while still airing
    pub end_date: Option<DateTime<Utc>>,
    /// Average user rating
    pub community_rating: Option<f32>,
    /// Animation studios, in provider order
    pub studios: Vec<String>,
    /// Genres, in provider order
    pub genres: Vec<String>,
    /// External ids of the series
    pub provider_ids: ProviderIds,
}

/// The outcome of a metadata lookup.
///
/// `has_metadata` tells whether the provider found anything; `item` holds
/// whatever fields could be filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataResult<T> {
    /// Whether the provider found metadata for the lookup
    pub has_metadata: bool,
    /// The resolved item
    pub item: T,
}

/// A single entry shown in the host's metadata search UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteSearchResult {
    /// Display name of the match
    pub name: Option<String>,
    /// First air date of the match
    pub premiere_date: Option<DateTime<Utc>>,
    /// Year the match started airing
    pub production_year: Option<i32>,
    /// External ids of the match
    pub provider_ids: ProviderIds,
    /// Name of the provider that produced this result
    pub search_provider_name: String,
}

/// Trait for providers that can fetch series-level metadata.
///
/// The season provider delegates to an implementor of this trait once it
/// has worked out which series a season belongs to.
#[async_trait]
pub trait SeriesMetadataProvider: Send + Sync {
    /// Fetches metadata for the series identified by `info`.
    ///
    /// # Arguments
    ///
    /// * `info` - Lookup input carrying the series' provider ids
    /// * `cancel` - Token the caller triggers to abandon the request
    ///
    /// # Returns
    ///
    /// The series result; `has_metadata` is false when nothing was found.
    /// Implementors should stop early and return [`ProviderError::Cancelled`]
    /// when `cancel` is triggered.
    async fn get_metadata(
        &self,
        info: &SeriesInfo,
        cancel: &CancellationToken,
    ) -> Result<MetadataResult<Series>, ProviderError>;
}

/// The provider contract the host expects from a metadata plugin.
///
/// `I` is the lookup input, `T` the item type it resolves to.
#[async_trait]
pub trait RemoteMetadataProvider<I, T>: Send + Sync
where
    I: Sync,
{
    /// Display name of the provider
    fn name(&self) -> &'static str;

    /// Resolves metadata for the given lookup input.
    async fn get_metadata(
        &self,
        info: &I,
        cancel: &CancellationToken,
    ) -> Result<MetadataResult<T>, ProviderError>;

    /// Produces the entries the host lists when the user searches manually.
    async fn get_search_results(
        &self,
        info: &I,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteSearchResult>, ProviderError>;

    /// Fetches an image referenced by a previous result.
    async fn get_image_response(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, ProviderError>;
}
