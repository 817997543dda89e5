use serde::{Deserialize, Serialize};
use url::Url;

/// Name of the group that receives URLs added without a group.
pub const DEFAULT_GROUP: &str = "Default";

/// A named set of tracked URLs, used to organise notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteGroup {
    pub name: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl SiteGroup {
    pub fn new(name: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            name: name.into(),
            urls,
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        let key = normalize_url_for_dedupe(url);
        self.urls.iter().any(|u| normalize_url_for_dedupe(u) == key)
    }
}

/// Normalize a URL for deduplication: trim whitespace, lowercase scheme/host,
/// drop a trailing slash. Unparseable input falls back to trimmed lowercase text.
pub fn normalize_url_for_dedupe(url: &str) -> String {
    let trimmed = url.trim();
    match Url::parse(trimmed) {
        Ok(parsed) => parsed.as_str().trim_end_matches('/').to_string(),
        Err(_) => trimmed.trim_end_matches('/').to_ascii_lowercase(),
    }
}

/// The ordered set of tracked URLs. Tracking order is group order, then URL order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingList {
    groups: Vec<SiteGroup>,
}

impl TrackingList {
    pub fn new(groups: Vec<SiteGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[SiteGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<SiteGroup> {
        self.groups
    }

    /// Every tracked URL in tracking order; duplicates across groups appear once.
    pub fn urls(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.groups
            .iter()
            .flat_map(|group| group.urls.iter())
            .filter(|url| seen.insert(normalize_url_for_dedupe(url)))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.urls().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.urls.is_empty())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.groups.iter().any(|group| group.contains(url))
    }

    /// Appends `url` to `group` (created if missing). Returns false if already tracked.
    pub fn add_url(&mut self, url: &str, group: Option<&str>) -> bool {
        let url = url.trim();
        if url.is_empty() || self.contains(url) {
            return false;
        }
        let name = group.unwrap_or(DEFAULT_GROUP);
        match self.groups.iter_mut().find(|g| g.name == name) {
            Some(existing) => existing.urls.push(url.to_string()),
            None => self
                .groups
                .push(SiteGroup::new(name, vec![url.to_string()])),
        }
        true
    }

    /// Removes `url` from every group; returns the stored spelling if it was tracked.
    pub fn remove_url(&mut self, url: &str) -> Option<String> {
        let key = normalize_url_for_dedupe(url);
        let mut removed = None;
        for group in &mut self.groups {
            group.urls.retain(|u| {
                if normalize_url_for_dedupe(u) == key {
                    removed.get_or_insert_with(|| u.clone());
                    false
                } else {
                    true
                }
            });
        }
        removed
    }
}
