//! Tracker core: change detection, classification and notification policy.
//!
//! Everything here is pure. Fetching, storage media and delivery live in
//! `tracker_engine`; this crate only sees already-fetched text and
//! already-loaded baselines.
mod check;
mod classify;
mod fingerprint;
mod highlight;
mod normalize;
mod notify;
mod result;
mod site;
mod store;
mod summary;
mod tracking;

pub use check::{Checker, FetchAttempt};
pub use classify::{
    classify, Classification, ClassifierConfig, Observation, Snapshot, DEFAULT_META_FIELDS,
};
pub use fingerprint::{content_fingerprint, meta_fingerprint, normalize_meta_value, Fingerprint};
pub use highlight::{
    diff_highlights, Highlight, HighlightDiff, HighlightRule, PatternRule, PatternSpec, RuleError,
    RuleSet,
};
pub use normalize::{normalize_content, NormalizeOptions};
pub use notify::{compose_notification, Notification, NotificationKind, NotificationPolicy};
pub use result::{ChangeKind, CheckResult, FieldChange, SiteError};
pub use site::{Baseline, PageMeta, SiteState, TrackedSite};
pub use store::{BaselineStore, MemoryBaselineStore, StoreError};
pub use summary::RunSummary;
pub use tracking::{normalize_url_for_dedupe, SiteGroup, TrackingList, DEFAULT_GROUP};
