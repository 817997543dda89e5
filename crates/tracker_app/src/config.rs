use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracker_core::{
    ClassifierConfig, NormalizeOptions, PatternSpec, RuleSet, TrackingList, DEFAULT_META_FIELDS,
};
use tracker_engine::{
    default_highlight_selectors, write_atomically, FetchSettings, SelectorRule, SelectorSpec,
    DEFAULT_USER_AGENT,
};
use tracker_logging::tracker_info;

pub const DEFAULT_CONFIG_PATH: &str = "tracker.ron";
const DEFAULT_BASELINE_PATH: &str = "baselines.json";
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

/// Everything the binary reads from `tracker.ron`. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub groups: TrackingList,
    pub normalize: NormalizeOptions,
    pub meta_fields: Vec<String>,
    pub extraction_patterns: Vec<PatternSpec>,
    pub highlight_selectors: Vec<SelectorSpec>,
    pub notification: NotificationConfig,
    pub fetch: FetchConfig,
    pub check_interval_secs: u64,
    pub baseline_path: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            groups: TrackingList::default(),
            normalize: NormalizeOptions::default(),
            meta_fields: DEFAULT_META_FIELDS.iter().map(|f| f.to_string()).collect(),
            extraction_patterns: Vec::new(),
            highlight_selectors: default_highlight_selectors(),
            notification: NotificationConfig::default(),
            fetch: FetchConfig::default(),
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            baseline_path: PathBuf::from(DEFAULT_BASELINE_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Discord user ids mentioned on alerts.
    pub recipient_mentions: Vec<String>,
    pub discord_webhook_url: Option<String>,
    pub send_heartbeat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub max_bytes: u64,
    pub politeness_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            request_timeout_secs: settings.request_timeout.as_secs(),
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_bytes: settings.max_bytes,
            politeness_delay_ms: 1000,
        }
    }
}

impl TrackerConfig {
    /// Reads the configuration, writing the default file first if none exists.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => ron::from_str(&text)
                .with_context(|| format!("failed to parse configuration {}", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save(path)?;
                tracker_info!("Created default configuration at {:?}", path);
                Ok(config)
            }
            Err(err) => {
                Err(err).with_context(|| format!("failed to read configuration {}", path.display()))
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let pretty = ron::ser::PrettyConfig::new();
        let content =
            ron::ser::to_string_pretty(self, pretty).context("failed to serialize configuration")?;
        write_atomically(path, &content)
            .with_context(|| format!("failed to write configuration {}", path.display()))
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            normalize: self.normalize.clone(),
            meta_fields: self.meta_fields.clone(),
        }
    }

    /// Pattern rules first, then selector rules, each in configured order.
    pub fn rule_set(&self) -> Result<RuleSet> {
        let mut rules =
            RuleSet::from_specs(&self.extraction_patterns).context("invalid extraction pattern")?;
        for spec in &self.highlight_selectors {
            rules.push(SelectorRule::new(spec.clone()).context("invalid highlight selector")?);
        }
        Ok(rules)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.fetch.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.fetch.request_timeout_secs),
            max_bytes: self.fetch.max_bytes,
            user_agent: self.fetch.user_agent.clone(),
            ..FetchSettings::default()
        }
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.fetch.politeness_delay_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs.max(1))
    }

    /// Webhook to post to: the override when given, else the configured one.
    /// Blank values count as unset.
    pub fn webhook_url<'a>(&'a self, override_url: Option<&'a str>) -> Option<&'a str> {
        override_url
            .or(self.notification.discord_webhook_url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
