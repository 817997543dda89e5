use std::collections::BTreeMap;

use thiserror::Error;

use crate::site::TrackedSite;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("failed to read baseline for {url}: {message}")]
    Read { url: String, message: String },
    #[error("failed to write baseline for {url}: {message}")]
    Write { url: String, message: String },
}

/// Keyed storage for per-site baselines, last write wins.
///
/// Each URL has a single writer during a run: its load happens before its save.
pub trait BaselineStore {
    /// Returns the stored site, or an uninitialized one if the URL was never checked.
    fn load(&self, url: &str) -> Result<TrackedSite, StoreError>;
    fn save(&mut self, site: &TrackedSite) -> Result<(), StoreError>;
    /// Drops a stored baseline; returns whether one existed.
    fn remove(&mut self, url: &str) -> Result<bool, StoreError>;
}

/// Baselines held in memory, for tests and dry runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBaselineStore {
    sites: BTreeMap<String, TrackedSite>,
}

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&TrackedSite> {
        self.sites.get(url)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl BaselineStore for MemoryBaselineStore {
    fn load(&self, url: &str) -> Result<TrackedSite, StoreError> {
        Ok(self
            .sites
            .get(url)
            .cloned()
            .unwrap_or_else(|| TrackedSite::new(url)))
    }

    fn save(&mut self, site: &TrackedSite) -> Result<(), StoreError> {
        self.sites.insert(site.url.clone(), site.clone());
        Ok(())
    }

    fn remove(&mut self, url: &str) -> Result<bool, StoreError> {
        Ok(self.sites.remove(url).is_some())
    }
}
