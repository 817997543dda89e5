use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A snippet of interest pulled out of a page, tagged with the rule that found it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Highlight {
    pub label: String,
    pub text: String,
}

impl Highlight {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Extracts structured snippets from text.
pub trait HighlightRule: Send + Sync {
    fn label(&self) -> &str;
    fn extract(&self, text: &str) -> Vec<Highlight>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("invalid extraction pattern for rule {label:?}: {message}")]
    InvalidPattern { label: String, message: String },
}

/// Configuration form of a pattern rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub label: String,
    pub pattern: String,
}

/// Regex rule: every non-overlapping match becomes a highlight, trimmed.
#[derive(Debug, Clone)]
pub struct PatternRule {
    label: String,
    pattern: Regex,
}

impl PatternRule {
    pub fn new(label: impl Into<String>, pattern: &str) -> Result<Self, RuleError> {
        let label = label.into();
        let pattern = Regex::new(pattern).map_err(|err| RuleError::InvalidPattern {
            label: label.clone(),
            message: err.to_string(),
        })?;
        Ok(Self { label, pattern })
    }
}

impl HighlightRule for PatternRule {
    fn label(&self) -> &str {
        &self.label
    }

    fn extract(&self, text: &str) -> Vec<Highlight> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|snippet| !snippet.is_empty())
            .map(|snippet| Highlight::new(self.label.as_str(), snippet))
            .collect()
    }
}

/// Ordered list of rules; swapping the set never touches classification.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn HighlightRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[PatternSpec]) -> Result<Self, RuleError> {
        let mut set = Self::new();
        for spec in specs {
            set.push(PatternRule::new(spec.label.as_str(), &spec.pattern)?);
        }
        Ok(set)
    }

    pub fn push(&mut self, rule: impl HighlightRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule in order; results of earlier rules come first.
    pub fn extract(&self, text: &str) -> Vec<Highlight> {
        self.rules.iter().flat_map(|rule| rule.extract(text)).collect()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.label()))
            .finish()
    }
}

/// Highlights that appeared or disappeared between two observations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighlightDiff {
    pub added: Vec<Highlight>,
    pub removed: Vec<Highlight>,
}

impl HighlightDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Multiset difference: each occurrence counts, so duplicates on one side are kept.
///
/// `added` follows the order of `current`, `removed` the order of `previous`.
pub fn diff_highlights(previous: &[Highlight], current: &[Highlight]) -> HighlightDiff {
    HighlightDiff {
        added: unmatched(current, previous),
        removed: unmatched(previous, current),
    }
}

fn unmatched(side: &[Highlight], other: &[Highlight]) -> Vec<Highlight> {
    let mut available: HashMap<&Highlight, usize> = HashMap::new();
    for item in other {
        *available.entry(item).or_default() += 1;
    }
    side.iter()
        .filter(|item| match available.get_mut(item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .cloned()
        .collect()
}
