//! Cached series provider implementation
//!
//! This module provides a caching wrapper for series providers that
//! stores series metadata on disk, keyed by AniDB id.

use super::{MetadataResult, ProviderError, Series, SeriesInfo, SeriesMetadataProvider};
use crate::cache::CacheStorage;
use crate::provider_ids::{MetadataProvider, is_anidb_id};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A caching wrapper for series providers
///
/// Only results that carry metadata are stored, so a series that could not
/// be found is looked up again next time. Lookups whose AniDB id is missing
/// or not purely numeric bypass the cache. The cache is persistent across
/// application runs.
pub struct CachedSeriesProvider<P> {
    /// The underlying series provider
    provider: P,
    /// Cache storage for series results
    cache: CacheStorage<MetadataResult<Series>>,
}

impl<P> CachedSeriesProvider<P>
where
    P: SeriesMetadataProvider,
{
    /// Creates a new cached series provider wrapping the given provider
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let paths = ApplicationPaths::from_project_dirs()?;
    /// let cache = CacheStorage::open(&paths, "series", None)?;
    /// let cached = CachedSeriesProvider::new(OfflineSeriesProvider, cache);
    /// ```
    pub fn new(provider: P, cache: CacheStorage<MetadataResult<Series>>) -> Self {
        Self { provider, cache }
    }

    /// Returns the cache storage used by this provider
    pub fn cache(&self) -> &CacheStorage<MetadataResult<Series>> {
        &self.cache
    }
}

#[async_trait]
impl<P> SeriesMetadataProvider for CachedSeriesProvider<P>
where
    P: SeriesMetadataProvider,
{
    async fn get_metadata(
        &self,
        info: &SeriesInfo,
        cancel: &CancellationToken,
    ) -> Result<MetadataResult<Series>, ProviderError> {
        let Some(series_id) = info
            .provider_ids
            .get(MetadataProvider::AniDb)
            .filter(|id| is_anidb_id(id))
        else {
            return self.provider.get_metadata(info, cancel).await;
        };

        match self.cache.load(series_id) {
            Ok(Some(series)) => {
                tracing::debug!("Series cache hit for AniDB id {}", series_id);
                return Ok(series);
            }
            Ok(None) => {
                tracing::debug!("Series cache miss for AniDB id {}", series_id);
            }
            Err(e) => {
                // Cache failures must not prevent metadata retrieval
                tracing::warn!("Ignoring unreadable series cache entry: {}", e);
            }
        }

        let series = self.provider.get_metadata(info, cancel).await?;

        if series.has_metadata {
            if let Err(e) = self.cache.store(series_id, &series) {
                tracing::warn!("Failed to cache series {}: {}", series_id, e);
            }
        }

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApplicationPaths;
    use crate::provider_ids::ProviderIds;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, SystemTime};

    struct CountingProvider {
        has_metadata: bool,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new(has_metadata: bool) -> Self {
            Self {
                has_metadata,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SeriesMetadataProvider for CountingProvider {
        async fn get_metadata(
            &self,
            _info: &SeriesInfo,
            _cancel: &CancellationToken,
        ) -> Result<MetadataResult<Series>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(MetadataResult {
                has_metadata: self.has_metadata,
                item: Series {
                    name: Some("Mushishi".to_string()),
                    production_year: Some(2005),
                    ..Series::default()
                },
            })
        }
    }

    fn cached_with_ttl(
        dir: &Path,
        provider: CountingProvider,
        ttl: Option<Duration>,
    ) -> CachedSeriesProvider<CountingProvider> {
        let cache = CacheStorage::open(&ApplicationPaths::new(dir), "series", ttl).unwrap();
        CachedSeriesProvider::new(provider, cache)
    }

    fn cached(dir: &Path, provider: CountingProvider) -> CachedSeriesProvider<CountingProvider> {
        cached_with_ttl(dir, provider, None)
    }

    fn anidb(id: &str) -> SeriesInfo {
        SeriesInfo {
            provider_ids: ProviderIds::new().with(MetadataProvider::AniDb, id),
        }
    }

    #[tokio::test]
    async fn test_second_lookup_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let provider = cached(dir.path(), CountingProvider::new(true));
        let cancel = CancellationToken::new();

        let first = provider.get_metadata(&anidb("3174"), &cancel).await.unwrap();
        let second = provider.get_metadata(&anidb("3174"), &cancel).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.item.name.as_deref(), Some("Mushishi"));
        assert_eq!(provider.provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_results_without_metadata_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let provider = cached(dir.path(), CountingProvider::new(false));
        let cancel = CancellationToken::new();

        provider.get_metadata(&anidb("3174"), &cancel).await.unwrap();
        provider.get_metadata(&anidb("3174"), &cancel).await.unwrap();

        assert_eq!(provider.provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.cache().load("3174").unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_without_anidb_id_bypasses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let provider = cached(dir.path(), CountingProvider::new(true));
        let cancel = CancellationToken::new();

        provider.get_metadata(&SeriesInfo::default(), &cancel).await.unwrap();
        provider.get_metadata(&anidb(""), &cancel).await.unwrap();

        assert_eq!(provider.provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(std::fs::read_dir(provider.cache().cache_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_falls_back_to_provider() {
        let dir = tempfile::tempdir().unwrap();
        let provider = cached(dir.path(), CountingProvider::new(true));
        std::fs::write(provider.cache().cache_dir().join("3174.json"), "{").unwrap();

        let series = provider
            .get_metadata(&anidb("3174"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(series.has_metadata);
        assert_eq!(provider.provider.calls.load(Ordering::SeqCst), 1);
        // The fresh result replaced the corrupt entry
        assert_eq!(provider.cache().load("3174").unwrap(), Some(series));
    }

    #[tokio::test]
    async fn test_expired_entry_is_fetched_again() {
        let dir = tempfile::tempdir().unwrap();
        let ttl = Duration::from_secs(60 * 60);
        let provider = cached_with_ttl(dir.path(), CountingProvider::new(true), Some(ttl));
        let cancel = CancellationToken::new();

        provider.get_metadata(&anidb("3174"), &cancel).await.unwrap();
        provider.get_metadata(&anidb("3174"), &cancel).await.unwrap();
        assert_eq!(provider.provider.calls.load(Ordering::SeqCst), 1);

        // Age the entry past its time-to-live
        let entry = std::fs::File::options()
            .write(true)
            .open(provider.cache().cache_dir().join("3174.json"))
            .unwrap();
        entry.set_modified(SystemTime::now() - 2 * ttl).unwrap();

        let refreshed = provider.get_metadata(&anidb("3174"), &cancel).await.unwrap();
        assert!(refreshed.has_metadata);
        assert_eq!(provider.provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_numeric_ids_bypass_cache() {
        let dir = tempfile::tempdir().unwrap();
        let provider = cached(dir.path(), CountingProvider::new(true));
        let cancel = CancellationToken::new();

        // These would collapse onto the same sanitized file name
        for id in ["12/3", "12_3", "A1", "a1"] {
            provider.get_metadata(&anidb(id), &cancel).await.unwrap();
        }

        assert_eq!(provider.provider.calls.load(Ordering::SeqCst), 4);
        assert_eq!(std::fs::read_dir(provider.cache().cache_dir()).unwrap().count(), 0);
    }
}
