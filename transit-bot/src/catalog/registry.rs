//! Per-mode catalog registry with atomic replacement.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::Mode;

use super::build::{BuildRules, Catalog};
use super::cache::CatalogCache;
use super::client::CatalogClient;
use super::error::CatalogError;
use super::raw::RawStop;

/// Something that can produce a mode's raw stop records.
pub trait FeedSource {
    fn fetch(
        &self,
        mode: Mode,
    ) -> impl Future<Output = Result<Vec<RawStop>, CatalogError>> + Send;
}

/// Fetches feeds over HTTP and keeps the last good one on disk.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    client: CatalogClient,
    cache: CatalogCache,
}

impl CatalogLoader {
    pub fn new(client: CatalogClient, cache: CatalogCache) -> Self {
        Self { client, cache }
    }

    /// The last good feed for a mode, if still fresh enough.
    pub fn cached(&self, mode: Mode) -> Option<Vec<RawStop>> {
        self.cache.load(mode)
    }
}

impl FeedSource for CatalogLoader {
    async fn fetch(&self, mode: Mode) -> Result<Vec<RawStop>, CatalogError> {
        let stops = self.client.fetch(mode).await?;
        if let Err(e) = self.cache.save(mode, &stops) {
            warn!(mode = %mode, error = %e, "failed to cache feed");
        }
        Ok(stops)
    }
}

/// Thread-safe holder of the current catalog for every mode.
///
/// Readers take an `Arc` snapshot and keep using it for the whole request;
/// a refresh builds the new catalog off to the side and swaps the pointer,
/// so a snapshot never mixes generations.
#[derive(Clone)]
pub struct CatalogRegistry {
    slots: Arc<HashMap<Mode, RwLock<Arc<Catalog>>>>,
    rules: Arc<HashMap<Mode, BuildRules>>,
}

impl CatalogRegistry {
    /// A registry with an empty catalog for every mode.
    pub fn new(rules: HashMap<Mode, BuildRules>) -> Self {
        let slots = Mode::ALL
            .into_iter()
            .map(|mode| (mode, RwLock::new(Arc::new(Catalog::empty(mode)))))
            .collect();
        Self {
            slots: Arc::new(slots),
            rules: Arc::new(rules),
        }
    }

    fn slot(&self, mode: Mode) -> &RwLock<Arc<Catalog>> {
        // Every mode gets a slot in `new`.
        &self.slots[&mode]
    }

    fn rules(&self, mode: Mode) -> BuildRules {
        self.rules.get(&mode).cloned().unwrap_or_default()
    }

    /// Current catalog for a mode.
    pub async fn snapshot(&self, mode: Mode) -> Arc<Catalog> {
        Arc::clone(&*self.slot(mode).read().await)
    }

    /// Publish a new catalog, returning the one it replaced.
    pub async fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let mode = catalog.mode();
        let new = Arc::new(catalog);
        let mut guard = self.slot(mode).write().await;
        std::mem::replace(&mut *guard, new)
    }

    /// Build from raw records and publish. Returns the stop count.
    pub async fn load(&self, mode: Mode, raw: &[RawStop]) -> usize {
        let catalog = Catalog::build(mode, raw, &self.rules(mode));
        let count = catalog.len();
        self.replace(catalog).await;
        count
    }

    /// Refresh one mode from a source.
    ///
    /// On success, replaces the current catalog. On failure, or when the feed
    /// yields no usable stop, the existing catalog is preserved and the error
    /// is returned.
    pub async fn refresh<S: FeedSource>(&self, source: &S, mode: Mode) -> Result<usize, CatalogError> {
        let raw = source.fetch(mode).await?;
        let catalog = Catalog::build(mode, &raw, &self.rules(mode));
        if catalog.is_empty() {
            return Err(CatalogError::Empty(mode));
        }
        let count = catalog.len();
        self.replace(catalog).await;
        Ok(count)
    }

    /// Refresh every mode concurrently, logging each outcome.
    pub async fn refresh_all<S: FeedSource + Sync>(&self, source: &S) -> Vec<(Mode, Result<usize, CatalogError>)> {
        let results = join_all(Mode::ALL.into_iter().map(|mode| async move {
            (mode, self.refresh(source, mode).await)
        }))
        .await;

        for (mode, result) in &results {
            match result {
                Ok(count) => info!(mode = %mode, stops = count, "refreshed catalog"),
                Err(e) => warn!(mode = %mode, error = %e, "catalog refresh failed, keeping previous"),
            }
        }
        results
    }

    /// First load at start-up: fetch, falling back to the disk cache.
    ///
    /// Modes with neither stay empty until the next scheduled refresh.
    pub async fn warm_start(&self, loader: &CatalogLoader) {
        for (mode, result) in self.refresh_all(loader).await {
            if result.is_ok() {
                continue;
            }
            match loader.cached(mode) {
                Some(raw) => {
                    let count = self.load(mode, &raw).await;
                    info!(mode = %mode, stops = count, "loaded catalog from disk cache");
                }
                None => warn!(mode = %mode, "no catalog available"),
            }
        }
    }
}
