//! AniDB season provider
//!
//! Resolves the AniDB series a season belongs to, either from the season's
//! own provider ids or from an `[anidb-<id>]` tag in its path, and copies
//! series-level metadata onto the season.

use super::{
    MetadataResult, ProviderError, RemoteMetadataProvider, RemoteSearchResult, Season, SeasonInfo,
    Series, SeriesInfo, SeriesMetadataProvider,
};
use crate::provider_ids::{MetadataProvider, ProviderIds};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tokio_util::sync::CancellationToken;

/// Matches `[anidb-<digits>]` and `[anidbid-<digits>]`, case-sensitive
static ANIDB_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[anidb(id)?-(?<anidb_id>[0-9]+)\]").expect("AniDB id pattern is valid")
});

/// Where the series id of a season came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdSource {
    /// Explicitly set in the season's provider ids
    ProviderIds,
    /// Parsed from a tag in the season's path
    Path,
}

/// Season metadata provider backed by a series-level AniDB provider.
///
/// The series provider is injected, so any [`SeriesMetadataProvider`] works:
/// a network client, a [`CachedSeriesProvider`](super::CachedSeriesProvider),
/// or a test double.
pub struct AniDbSeasonProvider<S> {
    series_provider: S,
}

impl<S> AniDbSeasonProvider<S>
where
    S: SeriesMetadataProvider,
{
    pub const NAME: &'static str = "AniDB";

    /// Creates a season provider delegating to `series_provider`
    pub fn new(series_provider: S) -> Self {
        Self { series_provider }
    }

    /// Returns the underlying series provider
    pub fn series_provider(&self) -> &S {
        &self.series_provider
    }

    /// Resolves the series id for `info` and remembers where it came from
    fn resolve_series_id(info: &SeasonInfo) -> Option<(String, IdSource)> {
        if let Some(id) = info.provider_ids.get_non_empty(MetadataProvider::AniDb) {
            return Some((id.to_string(), IdSource::ProviderIds));
        }

        anidb_id_from_path(info.path.as_deref()).map(|id| (id, IdSource::Path))
    }
}

#[async_trait]
impl<S> RemoteMetadataProvider<SeasonInfo, Season> for AniDbSeasonProvider<S>
where
    S: SeriesMetadataProvider,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn get_metadata(
        &self,
        info: &SeasonInfo,
        cancel: &CancellationToken,
    ) -> Result<MetadataResult<Season>, ProviderError> {
        let mut result = MetadataResult {
            has_metadata: true,
            item: Season {
                name: info.name.clone(),
                index_number: info.index_number,
                ..Season::default()
            },
        };

        let Some((series_id, source)) = Self::resolve_series_id(info) else {
            tracing::debug!(
                "No AniDB series id for season {:?} ({:?})",
                info.name,
                info.path
            );
            return Ok(result);
        };

        tracing::debug!("Resolved AniDB series id {} from {:?}", series_id, source);

        let series_info = SeriesInfo {
            provider_ids: ProviderIds::new().with(MetadataProvider::AniDb, series_id),
        };

        let series_result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            series_result = self.series_provider.get_metadata(&series_info, cancel) => {
                series_result?
            }
        };

        if series_result.has_metadata {
            apply_series_fields(&mut result.item, series_result.item, source);
        }

        Ok(result)
    }

    async fn get_search_results(
        &self,
        info: &SeasonInfo,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteSearchResult>, ProviderError> {
        let metadata = self.get_metadata(info, cancel).await?;

        Ok(search_results_from(metadata, self.name()))
    }

    async fn get_image_response(
        &self,
        _url: &str,
        _cancel: &CancellationToken,
    ) -> Result<reqwest::Response, ProviderError> {
        Err(ProviderError::NotSupported {
            operation: "Image retrieval",
        })
    }
}

/// Extracts the AniDB series id from an `[anidb-<id>]` or `[anidbid-<id>]`
/// tag anywhere in `path`
fn anidb_id_from_path(path: Option<&Path>) -> Option<String> {
    let path = path?.to_string_lossy();

    ANIDB_ID_PATTERN
        .captures(&path)
        .and_then(|caps| caps.name("anidb_id"))
        .map(|id| id.as_str().to_string())
}

/// Projects a season result onto the host's search result list
///
/// Yields a single entry when the result has metadata, nothing otherwise.
fn search_results_from(
    metadata: MetadataResult<Season>,
    provider_name: &str,
) -> Vec<RemoteSearchResult> {
    if !metadata.has_metadata {
        return Vec::new();
    }

    let season = metadata.item;
    vec![RemoteSearchResult {
        name: season.name,
        premiere_date: season.premiere_date,
        production_year: season.production_year,
        provider_ids: season.provider_ids,
        search_provider_name: provider_name.to_string(),
    }]
}

/// Copies series-level fields onto the season.
///
/// Name and overview are only inherited when the season had no explicit id
/// of its own.
fn apply_series_fields(season: &mut Season, series: Series, source: IdSource) {
    if source == IdSource::Path {
        season.name = series.name;
        season.overview = series.overview;
    }

    season.production_year = series.production_year;
    season.premiere_date = series.premiere_date;
    season.end_date = series.end_date;
    season.community_rating = series.community_rating;
    season.studios = series.studios;
    season.genres = series.genres;
}
