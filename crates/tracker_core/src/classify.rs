use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::{content_fingerprint, meta_fingerprint, normalize_meta_value};
use crate::highlight::{diff_highlights, RuleSet};
use crate::normalize::{normalize_content, NormalizeOptions};
use crate::result::{ChangeKind, CheckResult, FieldChange};
use crate::site::{Baseline, PageMeta, SiteState, TrackedSite};
use tracker_logging::{tracker_debug, tracker_info};

/// Metadata fields tracked when nothing else is configured.
pub const DEFAULT_META_FIELDS: [&str; 3] = ["title", "description", "keywords"];

/// Settings shared by every classification in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub normalize: NormalizeOptions,
    pub meta_fields: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            meta_fields: DEFAULT_META_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// One successful fetch of a site, as handed over by the fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub body: String,
    pub meta: PageMeta,
    pub observed_at: DateTime<Utc>,
}

/// Fingerprints and extracted values computed from one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub content_fingerprint: crate::Fingerprint,
    pub meta_fingerprint: crate::Fingerprint,
    pub meta: PageMeta,
    pub content_size: u64,
    pub highlights: Vec<crate::Highlight>,
}

impl Snapshot {
    pub fn take(observation: &Observation, config: &ClassifierConfig, rules: &RuleSet) -> Self {
        let normalized = normalize_content(&observation.body, &config.normalize);
        let meta = config
            .meta_fields
            .iter()
            .filter_map(|field| {
                let value = normalize_meta_value(observation.meta.get(field).map(String::as_str));
                (!value.is_empty()).then(|| (field.clone(), value))
            })
            .collect();
        Self {
            content_fingerprint: content_fingerprint(&normalized),
            meta_fingerprint: meta_fingerprint(&observation.meta, &config.meta_fields),
            meta,
            content_size: observation.body.len() as u64,
            highlights: rules.extract(&normalized),
        }
    }
}

/// Result of classifying one observation: the report and the baseline to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub result: CheckResult,
    pub updated: TrackedSite,
}

/// Compares an observation against the stored baseline.
///
/// The returned site always carries the new observation as its baseline, whether or
/// not anything changed. An uninitialized site only has its baseline established.
pub fn classify(
    site: &TrackedSite,
    observation: &Observation,
    config: &ClassifierConfig,
    rules: &RuleSet,
) -> Classification {
    let snapshot = Snapshot::take(observation, config, rules);

    let previous = match &site.state {
        SiteState::Uninitialized => {
            tracker_info!(
                "Baseline established for {} (content {}, meta {})",
                site.url,
                snapshot.content_fingerprint.short(),
                snapshot.meta_fingerprint.short()
            );
            let updated = TrackedSite {
                url: site.url.clone(),
                state: SiteState::Established(Baseline {
                    content_fingerprint: snapshot.content_fingerprint,
                    meta_fingerprint: snapshot.meta_fingerprint,
                    meta_fields: config.meta_fields.clone(),
                    last_meta: snapshot.meta,
                    last_checked_at: observation.observed_at,
                    last_changed_at: None,
                    last_content_size: snapshot.content_size,
                    last_extracted_highlights: snapshot.highlights,
                    check_count: 1,
                }),
            };
            return Classification {
                result: CheckResult::baseline_established(site.url.as_str()),
                updated,
            };
        }
        SiteState::Established(baseline) => baseline,
    };

    let content_changed = previous.content_fingerprint != snapshot.content_fingerprint;
    let (meta_changed, meta_diff) = compare_meta(&site.url, previous, &snapshot, config);
    let change_kind = ChangeKind::from_flags(content_changed, meta_changed);
    let highlight_diff = diff_highlights(&previous.last_extracted_highlights, &snapshot.highlights);
    let content_size_delta = snapshot.content_size as i64 - previous.last_content_size as i64;

    let check_count = previous.check_count + 1;
    if change_kind.is_change() {
        tracker_info!(
            "Change detected for {}: {} (size {:+} bytes, {} meta field(s), +{}/-{} highlight(s))",
            site.url,
            change_kind,
            content_size_delta,
            meta_diff.len(),
            highlight_diff.added.len(),
            highlight_diff.removed.len()
        );
    } else {
        tracker_debug!("No change for {} (check #{})", site.url, check_count);
    }

    let updated = TrackedSite {
        url: site.url.clone(),
        state: SiteState::Established(Baseline {
            content_fingerprint: snapshot.content_fingerprint,
            meta_fingerprint: snapshot.meta_fingerprint,
            meta_fields: config.meta_fields.clone(),
            last_meta: snapshot.meta,
            last_checked_at: observation.observed_at,
            last_changed_at: if change_kind.is_change() {
                Some(observation.observed_at)
            } else {
                previous.last_changed_at
            },
            last_content_size: snapshot.content_size,
            last_extracted_highlights: snapshot.highlights,
            check_count,
        }),
    };

    Classification {
        result: CheckResult {
            url: site.url.clone(),
            change_kind,
            content_size_delta,
            meta_diff,
            highlight_diff,
            first_sight: false,
            error: None,
        },
        updated,
    }
}

/// Fingerprints are only comparable over the same field list. When the configured
/// fields differ from the baseline's, only values of fields present in both are
/// compared and the new fingerprint silently becomes the baseline.
fn compare_meta(
    url: &str,
    previous: &Baseline,
    snapshot: &Snapshot,
    config: &ClassifierConfig,
) -> (bool, BTreeMap<String, FieldChange>) {
    // Baselines written before the field list was recorded used the same config.
    let recorded = if previous.meta_fields.is_empty() {
        &config.meta_fields
    } else {
        &previous.meta_fields
    };
    if *recorded == config.meta_fields {
        if previous.meta_fingerprint == snapshot.meta_fingerprint {
            return (false, BTreeMap::new());
        }
        return (
            true,
            diff_meta(&previous.last_meta, &snapshot.meta, &config.meta_fields),
        );
    }

    tracker_info!(
        "Tracked metadata fields changed for {}; re-establishing metadata baseline",
        url
    );
    let shared: Vec<String> = config
        .meta_fields
        .iter()
        .filter(|field| recorded.contains(field))
        .cloned()
        .collect();
    let diff = diff_meta(&previous.last_meta, &snapshot.meta, &shared);
    (!diff.is_empty(), diff)
}

fn diff_meta(old: &PageMeta, new: &PageMeta, fields: &[String]) -> BTreeMap<String, FieldChange> {
    fields
        .iter()
        .filter_map(|field| {
            let before = normalize_meta_value(old.get(field).map(String::as_str));
            let after = normalize_meta_value(new.get(field).map(String::as_str));
            (before != after).then(|| (field.clone(), FieldChange::new(before, after)))
        })
        .collect()
}
