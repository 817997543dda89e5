use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highlight::HighlightDiff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    #[default]
    None,
    Content,
    Meta,
    Both,
}

impl ChangeKind {
    pub fn from_flags(content_changed: bool, meta_changed: bool) -> Self {
        match (content_changed, meta_changed) {
            (false, false) => ChangeKind::None,
            (true, false) => ChangeKind::Content,
            (false, true) => ChangeKind::Meta,
            (true, true) => ChangeKind::Both,
        }
    }

    pub fn is_change(self) -> bool {
        self != ChangeKind::None
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::None => write!(f, "no change"),
            ChangeKind::Content => write!(f, "content"),
            ChangeKind::Meta => write!(f, "meta"),
            ChangeKind::Both => write!(f, "content and meta"),
        }
    }
}

/// Old and new normalized value of one metadata field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: String,
    pub new: String,
}

impl FieldChange {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Per-site failure; never counts as a change.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SiteError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("baseline store failed: {0}")]
    Store(String),
}

/// Outcome of checking one site in one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckResult {
    pub url: String,
    pub change_kind: ChangeKind,
    /// Decoded UTF-8 body length of this check minus that of the previous one, in bytes.
    pub content_size_delta: i64,
    pub meta_diff: BTreeMap<String, FieldChange>,
    pub highlight_diff: HighlightDiff,
    /// Set when this check established the baseline.
    pub first_sight: bool,
    pub error: Option<SiteError>,
}

impl CheckResult {
    pub fn unchanged(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn baseline_established(url: impl Into<String>) -> Self {
        Self {
            first_sight: true,
            ..Self::unchanged(url)
        }
    }

    pub fn failed(url: impl Into<String>, error: SiteError) -> Self {
        Self {
            error: Some(error),
            ..Self::unchanged(url)
        }
    }

    /// A reportable change: something changed and the check succeeded.
    pub fn is_change(&self) -> bool {
        self.error.is_none() && self.change_kind.is_change()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
