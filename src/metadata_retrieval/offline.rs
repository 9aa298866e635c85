//! Offline series provider
//!
//! A series provider that performs no lookups at all. Combined with the
//! series cache it lets seasons be resolved from previously imported series
//! data without any network access.

use super::{MetadataResult, ProviderError, Series, SeriesInfo, SeriesMetadataProvider};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A series provider that never finds anything.
///
/// Wrapped in a [`CachedSeriesProvider`](super::CachedSeriesProvider) it
/// resolves series purely from previously cached data.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSeriesProvider;

#[async_trait]
impl SeriesMetadataProvider for OfflineSeriesProvider {
    async fn get_metadata(
        &self,
        _info: &SeriesInfo,
        cancel: &CancellationToken,
    ) -> Result<MetadataResult<Series>, ProviderError> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        Ok(MetadataResult::default())
    }
}
