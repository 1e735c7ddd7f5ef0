//! Disk cache for the last good feed of each mode.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Mode;

use super::error::CatalogError;
use super::raw::RawStop;

/// Default cache TTL: 7 days.
const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct CachedFeed {
    /// Unix timestamp when the cache was written.
    cached_at_secs: u64,
    stops: Vec<RawStop>,
}

/// Configuration for the feed disk cache.
#[derive(Debug, Clone)]
pub struct CatalogCacheConfig {
    /// Directory holding one `{mode}.json` per mode.
    pub dir: PathBuf,
    /// How long a cached feed remains usable.
    pub ttl: Duration,
}

impl CatalogCacheConfig {
    /// Create a new cache config with the given directory and default TTL.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for CatalogCacheConfig {
    fn default() -> Self {
        Self::new("data")
    }
}

/// Disk cache for normalized feeds.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    config: CatalogCacheConfig,
}

impl CatalogCache {
    pub fn new(config: CatalogCacheConfig) -> Self {
        Self { config }
    }

    /// Cache file for a mode.
    pub fn path(&self, mode: Mode) -> PathBuf {
        self.config.dir.join(format!("{}.json", mode.code()))
    }

    /// The cached feed for a mode, unless missing, unreadable or older
    /// than the TTL.
    pub fn load(&self, mode: Mode) -> Option<Vec<RawStop>> {
        let path = self.path(mode);
        let feed: CachedFeed = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(feed) => feed,
                Err(e) => {
                    warn!(mode = %mode, path = %path.display(), error = %e, "ignoring corrupt feed cache");
                    return None;
                }
            },
            Err(_) => return None,
        };

        let age = unix_now()?.saturating_sub(feed.cached_at_secs);
        if age >= self.config.ttl.as_secs() {
            debug!(mode = %mode, age_secs = age, "feed cache expired");
            return None;
        }
        Some(feed.stops)
    }

    /// Write a mode's feed through a temp file, so a crash mid-write never
    /// leaves a truncated cache behind.
    pub fn save(&self, mode: Mode, stops: &[RawStop]) -> Result<(), CatalogError> {
        let cached_at_secs = unix_now().ok_or_else(|| cache_error("clock before unix epoch"))?;
        let feed = CachedFeed {
            cached_at_secs,
            stops: stops.to_vec(),
        };
        let json = serde_json::to_vec(&feed).map_err(|e| cache_error(format!("encode: {e}")))?;

        let dir: &Path = &self.config.dir;
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| cache_error(format!("create {}: {e}", dir.display())))?;
        }
        let path = self.path(mode);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| cache_error(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &path).map_err(|e| cache_error(format!("rename {}: {e}", path.display())))?;

        debug!(mode = %mode, stops = stops.len(), "cached feed");
        Ok(())
    }
}

fn unix_now() -> Option<u64> {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

fn cache_error(message: impl Into<String>) -> CatalogError {
    CatalogError::Cache {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_per_mode() {
        let dir = tempdir().unwrap();
        let cache = CatalogCache::new(CatalogCacheConfig::new(dir.path()));

        let stops = vec![RawStop::new("Sol", "SOL"), RawStop::new("Ópera", "OPE")];
        cache.save(Mode::Metro, &stops).unwrap();

        assert_eq!(cache.load(Mode::Metro).unwrap(), stops);
        assert!(cache.load(Mode::BusUrban).is_none());
    }

    #[test]
    fn expired_cache_returns_none() {
        let dir = tempdir().unwrap();
        let cache = CatalogCache::new(
            CatalogCacheConfig::new(dir.path()).with_ttl(Duration::from_secs(0)),
        );
        cache.save(Mode::Bikeshare, &[RawStop::new("Casal", "77")]).unwrap();
        assert!(cache.load(Mode::Bikeshare).is_none());
    }

    #[test]
    fn corrupt_cache_is_ignored() {
        let dir = tempdir().unwrap();
        let cache = CatalogCache::new(CatalogCacheConfig::new(dir.path()));
        std::fs::write(cache.path(Mode::Metro), "{not json").unwrap();
        assert!(cache.load(Mode::Metro).is_none());
    }

    #[test]
    fn creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("feeds");
        let cache = CatalogCache::new(CatalogCacheConfig::new(&nested));
        cache.save(Mode::CommuterRail, &[RawStop::new("Atocha", "1")]).unwrap();
        assert!(nested.join("cerc.json").exists());
    }
}
