use std::collections::BTreeMap;

use super::CacheError;

/// Named caches of URL → body.
pub trait CacheStorage {
    fn cache_names(&self) -> Vec<String>;
    /// Replace-or-insert every entry under `cache`, creating it if needed.
    fn put_all(&mut self, cache: &str, entries: Vec<(String, Vec<u8>)>);
    /// First match across all caches.
    fn lookup(&self, url: &str) -> Option<Vec<u8>>;
    fn delete(&mut self, cache: &str) -> bool;
}

pub trait AssetFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, CacheError>;
}

impl<F> AssetFetcher for F
where
    F: Fn(&str) -> Result<Vec<u8>, CacheError>,
{
    fn fetch(&self, url: &str) -> Result<Vec<u8>, CacheError> {
        self(url)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    caches: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, cache: &str) -> usize {
        self.caches.get(cache).map_or(0, BTreeMap::len)
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn cache_names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    fn put_all(&mut self, cache: &str, entries: Vec<(String, Vec<u8>)>) {
        self.caches
            .entry(cache.to_string())
            .or_default()
            .extend(entries);
    }

    fn lookup(&self, url: &str) -> Option<Vec<u8>> {
        self.caches.values().find_map(|c| c.get(url).cloned())
    }

    fn delete(&mut self, cache: &str) -> bool {
        self.caches.remove(cache).is_some()
    }
}
