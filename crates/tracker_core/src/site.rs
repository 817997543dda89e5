use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::highlight::Highlight;

/// Metadata field name (`title`, `description`, ...) to its last observed value.
pub type PageMeta = BTreeMap<String, String>;

/// Persisted record for one tracked URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSite {
    pub url: String,
    #[serde(flatten)]
    pub state: SiteState,
}

/// A site starts uninitialized and becomes established on its first successful check.
///
/// Comparing against an uninitialized site never reports a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SiteState {
    #[default]
    Uninitialized,
    Established(Baseline),
}

/// The most recent observation of a site, replaced after every successful check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub content_fingerprint: Fingerprint,
    pub meta_fingerprint: Fingerprint,
    /// Field list `meta_fingerprint` was computed over, in order.
    #[serde(default)]
    pub meta_fields: Vec<String>,
    #[serde(default)]
    pub last_meta: PageMeta,
    pub last_checked_at: DateTime<Utc>,
    #[serde(default)]
    pub last_changed_at: Option<DateTime<Utc>>,
    pub last_content_size: u64,
    #[serde(default)]
    pub last_extracted_highlights: Vec<Highlight>,
    #[serde(default)]
    pub check_count: u64,
}

impl TrackedSite {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: SiteState::Uninitialized,
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self.state, SiteState::Uninitialized)
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        match &self.state {
            SiteState::Uninitialized => None,
            SiteState::Established(baseline) => Some(baseline),
        }
    }
}
