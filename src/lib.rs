//! anidb_season - AniDB season metadata for media libraries
//!
//! This library resolves which AniDB series a season belongs to, either from
//! the season's provider ids or from an `[anidb-<id>]` / `[anidbid-<id>]`
//! tag in its path, and fills in the season's metadata from that series.
//!
//! The series lookup itself is delegated to a [`SeriesMetadataProvider`],
//! which callers inject. [`CachedSeriesProvider`] adds a persistent JSON
//! cache in front of any series provider.

mod cache;
mod config;
mod metadata_retrieval;
mod provider_ids;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub use cache::{CacheError, CacheStorage};
pub use config::ApplicationPaths;
pub use metadata_retrieval::{
    AniDbSeasonProvider, CachedSeriesProvider, MetadataResult, OfflineSeriesProvider,
    ProviderError, RemoteMetadataProvider, RemoteSearchResult, Season, SeasonInfo, Series,
    SeriesInfo, SeriesMetadataProvider,
};
pub use provider_ids::{MetadataProvider, ProviderIds, is_anidb_id};

// Re-exported so implementors don't need a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;

/// Name of the cache storage holding series results
const SERIES_CACHE_NAME: &str = "series";

/// Season provider that resolves series from the local cache only
pub type OfflineSeasonProvider =
    AniDbSeasonProvider<CachedSeriesProvider<OfflineSeriesProvider>>;

/// Top-level error type for anidb_season operations
#[derive(Debug, Error)]
pub enum AnidbSeasonError {
    /// Error during metadata retrieval
    #[error("Metadata retrieval error: {0}")]
    Provider(#[from] ProviderError),

    /// Error during cache operations
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// An AniDB id must be a non-empty sequence of digits
    #[error("Invalid AniDB id: {0:?}")]
    InvalidAnidbId(String),

    /// A series record could not be parsed
    #[error("Invalid series record: {0}")]
    InvalidSeries(#[from] serde_json::Error),

    /// A series record parsed but is unusable
    #[error("Invalid series record: {0}")]
    IncompleteSeries(&'static str),

    /// A result could not be written as JSON
    #[error("Failed to serialize output: {0}")]
    Output(#[source] serde_json::Error),
}

/// A series record as accepted by [`import_series`]
///
/// Stricter than [`Series`]: the record must be a JSON object, carry a
/// name, and contain no unknown keys.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeriesRecord {
    name: String,
    overview: Option<String>,
    production_year: Option<i32>,
    premiere_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    community_rating: Option<f32>,
    #[serde(default)]
    studios: Vec<String>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    provider_ids: ProviderIds,
}

impl From<SeriesRecord> for Series {
    fn from(record: SeriesRecord) -> Self {
        Series {
            name: Some(record.name),
            overview: record.overview,
            production_year: record.production_year,
            premiere_date: record.premiere_date,
            end_date: record.end_date,
            community_rating: record.community_rating,
            studios: record.studios,
            genres: record.genres,
            provider_ids: record.provider_ids,
        }
    }
}

/// Opens the series cache below the given application paths
///
/// # Arguments
///
/// * `paths` - Host-supplied application paths
/// * `ttl` - Maximum age of cached series, `None` keeps them forever
pub fn open_series_cache(
    paths: &ApplicationPaths,
    ttl: Option<Duration>,
) -> Result<CacheStorage<MetadataResult<Series>>, AnidbSeasonError> {
    Ok(CacheStorage::open(paths, SERIES_CACHE_NAME, ttl)?)
}

/// Builds a season provider that answers from previously cached series only
///
/// Cached series never expire here: the offline provider cannot refetch
/// them, so an expired entry would simply be lost.
///
/// # Examples
///
/// ```no_run
/// use anidb_season::{
///     offline_season_provider, ApplicationPaths, CancellationToken, RemoteMetadataProvider,
///     SeasonInfo,
/// };
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let paths = ApplicationPaths::from_project_dirs()?;
/// let provider = offline_season_provider(&paths)?;
///
/// let info = SeasonInfo {
///     path: Some("/media/Mushishi [anidb-3174]/Season 1".into()),
///     ..SeasonInfo::default()
/// };
/// let result = provider.get_metadata(&info, &CancellationToken::new()).await?;
/// println!("{:?}", result.item.name);
/// # Ok(())
/// # }
/// ```
pub fn offline_season_provider(
    paths: &ApplicationPaths,
) -> Result<OfflineSeasonProvider, AnidbSeasonError> {
    let cache = open_series_cache(paths, None)?;
    Ok(AniDbSeasonProvider::new(CachedSeriesProvider::new(
        OfflineSeriesProvider,
        cache,
    )))
}

/// Stores a series record in the cache so offline lookups can find it
///
/// # Arguments
///
/// * `paths` - Host-supplied application paths
/// * `anidb_id` - AniDB id of the series, digits only
/// * `series_json` - A JSON object in the [`Series`] format with a non-empty
///   `name`; unknown keys are rejected
///
/// # Returns
///
/// The stored series. It is always cached as a result with metadata.
pub fn import_series(
    paths: &ApplicationPaths,
    anidb_id: &str,
    series_json: &str,
) -> Result<Series, AnidbSeasonError> {
    if !is_anidb_id(anidb_id) {
        return Err(AnidbSeasonError::InvalidAnidbId(anidb_id.to_string()));
    }

    // Serde would also fill a struct from a JSON array
    let value: serde_json::Value = serde_json::from_str(series_json)?;
    if !value.is_object() {
        return Err(AnidbSeasonError::IncompleteSeries("expected a JSON object"));
    }

    let record: SeriesRecord = serde_json::from_value(value)?;
    if record.name.trim().is_empty() {
        return Err(AnidbSeasonError::IncompleteSeries("name must not be empty"));
    }

    let series = Series::from(record);
    let cache = open_series_cache(paths, None)?;

    cache.store(
        anidb_id,
        &MetadataResult {
            has_metadata: true,
            item: series.clone(),
        },
    )?;

    tracing::info!("Imported series {:?} as AniDB id {}", series.name, anidb_id);

    Ok(series)
}
