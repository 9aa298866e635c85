//! Provider id mapping
//!
//! Associates an external metadata source with the identifier that source
//! uses for a given season or series.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// External metadata sources an item can be cross-referenced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetadataProvider {
    /// The AniDB anime database
    AniDb,
    /// TheTVDB
    Tvdb,
    /// The Movie Database
    Tmdb,
    /// IMDb
    Imdb,
}

impl MetadataProvider {
    /// The display name used by the host for this provider
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataProvider::AniDb => "AniDB",
            MetadataProvider::Tvdb => "Tvdb",
            MetadataProvider::Tmdb => "Tmdb",
            MetadataProvider::Imdb => "Imdb",
        }
    }
}

impl fmt::Display for MetadataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true for a well-formed AniDB id: one or more ASCII digits
pub fn is_anidb_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Mapping from metadata provider to external identifier
///
/// Each provider appears at most once. An empty identifier is stored as-is,
/// so callers can tell an absent entry from an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderIds(BTreeMap<MetadataProvider, String>);

impl ProviderIds {
    /// Creates an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the identifier for `provider`, returning the previous one
    pub fn insert(&mut self, provider: MetadataProvider, id: impl Into<String>) -> Option<String> {
        self.0.insert(provider, id.into())
    }

    /// Builder-style variant of [`ProviderIds::insert`]
    pub fn with(mut self, provider: MetadataProvider, id: impl Into<String>) -> Self {
        self.insert(provider, id);
        self
    }

    /// Returns the stored identifier, which may be empty
    pub fn get(&self, provider: MetadataProvider) -> Option<&str> {
        self.0.get(&provider).map(String::as_str)
    }

    /// Returns the identifier only when it is present and non-empty
    pub fn get_non_empty(&self, provider: MetadataProvider) -> Option<&str> {
        self.get(provider).filter(|id| !id.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetadataProvider, &str)> {
        self.0.iter().map(|(provider, id)| (*provider, id.as_str()))
    }
}
