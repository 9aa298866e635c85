//! Cache storage module
//!
//! This module provides persistent caching below the host's cache directory.
//! Entries are serialized to JSON, one file per identifier.

use crate::config::ApplicationPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to determine cache directory location
    #[error("Failed to determine cache directory location")]
    CacheDirectoryNotFound,

    /// Failed to create or access cache directory
    #[error("Failed to create cache directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read cached data
    #[error("Failed to read cache file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write cached data
    #[error("Failed to write cache file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to deserialize cached data
    #[error("Failed to deserialize cache file {path}: {source}")]
    DeserializationFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to serialize data for caching
    #[error("Failed to serialize data: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A generic cache storage for serializable data
///
/// Entries older than the configured time-to-live are treated as missing.
pub struct CacheStorage<T> {
    /// The directory where cached data is stored
    cache_dir: PathBuf,
    /// Maximum age of an entry, `None` keeps entries forever
    ttl: Option<Duration>,
    _phantom: PhantomData<T>,
}

impl<T> CacheStorage<T>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    /// Opens or creates a cache storage with the given name
    ///
    /// The storage lives in a subdirectory of the application cache path,
    /// named after the sanitized `name`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let paths = ApplicationPaths::from_project_dirs()?;
    /// let cache: CacheStorage<MetadataResult<Series>> =
    ///     CacheStorage::open(&paths, "series", Some(Duration::from_secs(86400)))?;
    /// ```
    pub fn open(
        paths: &ApplicationPaths,
        name: &str,
        ttl: Option<Duration>,
    ) -> Result<Self, CacheError> {
        let cache_dir = paths.cache_path().join(sanitize_name(name));

        fs::create_dir_all(&cache_dir).map_err(|e| CacheError::DirectoryCreationFailed {
            path: cache_dir.clone(),
            source: e,
        })?;

        Ok(Self {
            cache_dir,
            ttl,
            _phantom: PhantomData,
        })
    }

    /// Loads cached data for the given identifier
    ///
    /// Returns `None` if the entry doesn't exist or has expired. Returns an
    /// error if the entry exists but cannot be read or deserialized.
    pub fn load(&self, identifier: &str) -> Result<Option<T>, CacheError> {
        let file_path = self.entry_path(identifier);

        if !file_path.exists() {
            return Ok(None);
        }

        if self.is_expired(&file_path)? {
            tracing::debug!("Cache entry {} expired", file_path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&file_path).map_err(|e| CacheError::ReadFailed {
            path: file_path.clone(),
            source: e,
        })?;

        let data =
            serde_json::from_str(&content).map_err(|e| CacheError::DeserializationFailed {
                path: file_path,
                source: e,
            })?;

        Ok(Some(data))
    }

    /// Stores data in the cache with the given identifier
    pub fn store(&self, identifier: &str, data: &T) -> Result<(), CacheError> {
        let file_path = self.entry_path(identifier);

        let content = serde_json::to_string_pretty(data)?;

        fs::write(&file_path, content).map_err(|e| CacheError::WriteFailed {
            path: file_path,
            source: e,
        })?;

        Ok(())
    }

    /// Returns the path to the cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, identifier: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", sanitize_name(identifier)))
    }

    fn is_expired(&self, file_path: &Path) -> Result<bool, CacheError> {
        let Some(ttl) = self.ttl else {
            return Ok(false);
        };

        let modified = fs::metadata(file_path)
            .and_then(|meta| meta.modified())
            .map_err(|e| CacheError::ReadFailed {
                path: file_path.to_path_buf(),
                source: e,
            })?;

        // A modification time in the future counts as fresh
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        Ok(age > ttl)
    }
}

/// Sanitizes a name for use in file paths
///
/// Converts to lowercase and replaces all characters that are not
/// a-z, 0-9, or hyphen with underscores.
fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        title: String,
    }

    fn open_in(dir: &Path, ttl: Option<Duration>) -> CacheStorage<Entry> {
        CacheStorage::open(&ApplicationPaths::new(dir), "Series Data", ttl).unwrap()
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Simple"), "simple");
        assert_eq!(sanitize_name("With Spaces"), "with_spaces");
        assert_eq!(sanitize_name("With-Hyphens"), "with-hyphens");
        assert_eq!(sanitize_name("Special!@#$%"), "special_____");
        assert_eq!(sanitize_name("Mixed123ABC"), "mixed123abc");
    }

    #[test]
    fn test_open_creates_sanitized_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path(), None);

        assert_eq!(cache.cache_dir(), dir.path().join("series_data"));
        assert!(cache.cache_dir().is_dir());
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path(), None);

        assert_eq!(cache.load("69").unwrap(), None);

        let entry = Entry {
            title: "One Piece".to_string(),
        };
        cache.store("69", &entry).unwrap();

        assert_eq!(cache.load("69").unwrap(), Some(entry));
        assert!(cache.cache_dir().join("69.json").is_file());
    }

    #[test]
    fn test_expired_entry_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path(), Some(Duration::ZERO));

        cache
            .store(
                "69",
                &Entry {
                    title: "One Piece".to_string(),
                },
            )
            .unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.load("69").unwrap(), None);
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path(), None);
        fs::write(cache.cache_dir().join("69.json"), "not json").unwrap();

        assert!(matches!(
            cache.load("69"),
            Err(CacheError::DeserializationFailed { .. })
        ));
    }
}
