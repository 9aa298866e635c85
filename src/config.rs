//! Application path configuration
//!
//! The host application decides where plugin data lives. This module models
//! that decision so the series cache can be placed accordingly.

use crate::cache::CacheError;
use std::path::{Path, PathBuf};

/// Host-supplied application paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationPaths {
    /// Root directory for cached data
    cache_path: PathBuf,
}

impl ApplicationPaths {
    /// Uses an explicit cache root directory
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
        }
    }

    /// Uses the platform's standard cache directory for this application
    ///
    /// On Linux this is typically `~/.cache/anidb-season`.
    pub fn from_project_dirs() -> Result<Self, CacheError> {
        let proj_dirs = directories::ProjectDirs::from("net", "anidb", "anidb-season")
            .ok_or(CacheError::CacheDirectoryNotFound)?;

        Ok(Self::new(proj_dirs.cache_dir()))
    }

    /// Returns the cache root directory
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }
}
