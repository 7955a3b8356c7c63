//! Versioned cache-first store for the player's static assets.
//!
//! Bumping [`CacheManifest::name`] is the only invalidation mechanism:
//! [`OfflineCache::activate`] drops every cache stored under another name.

mod manifest;
mod storage;

use thiserror::Error;
use tracing::{debug, info};

pub use manifest::{CacheManifest, DEFAULT_CACHE_NAME};
pub use storage::{AssetFetcher, CacheStorage, MemoryCacheStorage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("fetching {url} failed: {reason}")]
    Fetch { url: String, reason: String },
}

/// Where a response body came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Served {
    Cache,
    Network,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub body: Vec<u8>,
    pub served: Served,
}

#[derive(Debug, Clone, Default)]
pub struct OfflineCache {
    manifest: CacheManifest,
}

impl OfflineCache {
    pub fn new(manifest: CacheManifest) -> Self {
        Self { manifest }
    }

    pub fn manifest(&self) -> &CacheManifest {
        &self.manifest
    }

    /// Fetch every manifest asset and store them under the current cache
    /// name. Nothing is stored unless every fetch succeeds.
    pub fn install<S, F>(&self, storage: &mut S, fetcher: &F) -> Result<usize, CacheError>
    where
        S: CacheStorage,
        F: AssetFetcher,
    {
        let entries = self
            .manifest
            .urls
            .iter()
            .map(|url| fetcher.fetch(url).map(|body| (url.clone(), body)))
            .collect::<Result<Vec<_>, _>>()?;

        let n = entries.len();
        storage.put_all(&self.manifest.name, entries);
        info!(cache = %self.manifest.name, assets = n, "offline cache installed");
        Ok(n)
    }

    /// Delete every cache not named after the current manifest. Returns the
    /// deleted names.
    pub fn activate<S: CacheStorage>(&self, storage: &mut S) -> Vec<String> {
        let stale: Vec<String> = storage
            .cache_names()
            .into_iter()
            .filter(|name| *name != self.manifest.name)
            .collect();
        for name in &stale {
            storage.delete(name);
        }
        if !stale.is_empty() {
            info!(deleted = ?stale, "old offline caches removed");
        }
        stale
    }

    /// Serve `url` from any cache, falling back to the network. Network
    /// responses are not written back.
    pub fn respond<S, F>(&self, storage: &S, fetcher: &F, url: &str) -> Result<Response, CacheError>
    where
        S: CacheStorage,
        F: AssetFetcher,
    {
        if let Some(body) = storage.lookup(url) {
            return Ok(Response {
                body,
                served: Served::Cache,
            });
        }
        debug!(%url, "cache miss");
        fetcher.fetch(url).map(|body| Response {
            body,
            served: Served::Network,
        })
    }
}
