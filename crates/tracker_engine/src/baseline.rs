use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracker_core::{BaselineStore, StoreError, TrackedSite};
use tracker_logging::{tracker_debug, tracker_info};

use crate::persist::{write_atomically, PersistError};

/// Baselines kept in one JSON object keyed by URL.
///
/// Every save rewrites the file atomically, so a crash mid-run loses at most the
/// site being written.
#[derive(Debug)]
pub struct JsonBaselineStore {
    path: PathBuf,
    sites: BTreeMap<String, TrackedSite>,
}

impl JsonBaselineStore {
    /// Opens the store, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        let sites = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|err| PersistError::Malformed {
                path: path.clone(),
                message: err.to_string(),
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracker_info!("No baseline file at {:?}; starting fresh", path);
                BTreeMap::new()
            }
            Err(err) => return Err(err.into()),
        };
        tracker_debug!("Loaded {} baseline(s) from {:?}", sites.len(), path);
        Ok(Self { path, sites })
    }

    pub fn path(&self) -> &Path {
        &self.path
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

    fn flush(&self) -> Result<(), PersistError> {
        let text = serde_json::to_string_pretty(&self.sites).map_err(|err| {
            PersistError::Malformed {
                path: self.path.clone(),
                message: err.to_string(),
            }
        })?;
        write_atomically(&self.path, &text)
    }
}

impl BaselineStore for JsonBaselineStore {
    fn load(&self, url: &str) -> Result<TrackedSite, StoreError> {
        Ok(self
            .sites
            .get(url)
            .cloned()
            .unwrap_or_else(|| TrackedSite::new(url)))
    }

    fn save(&mut self, site: &TrackedSite) -> Result<(), StoreError> {
        let previous = self.sites.insert(site.url.clone(), site.clone());
        if let Err(err) = self.flush() {
            // Keep memory in step with what is on disk.
            match previous {
                Some(previous) => self.sites.insert(site.url.clone(), previous),
                None => self.sites.remove(&site.url),
            };
            return Err(StoreError::Write {
                url: site.url.clone(),
                message: err.to_string(),
            });
        }
        Ok(())
    }

    fn remove(&mut self, url: &str) -> Result<bool, StoreError> {
        let Some(previous) = self.sites.remove(url) else {
            return Ok(false);
        };
        if let Err(err) = self.flush() {
            self.sites.insert(url.to_string(), previous);
            return Err(StoreError::Write {
                url: url.to_string(),
                message: err.to_string(),
            });
        }
        Ok(true)
    }
}
