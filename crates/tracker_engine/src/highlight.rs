use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracker_core::{Highlight, HighlightRule};

use crate::extract::ParseError;

/// Configuration form of a [`SelectorRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSpec {
    pub label: String,
    pub selector: String,
    /// Matches kept per page, in document order.
    pub max_matches: usize,
    /// Shorter texts are skipped.
    pub min_chars: usize,
    /// Longer texts are cut to this many characters.
    pub max_chars: usize,
}

impl Default for SelectorSpec {
    fn default() -> Self {
        Self {
            label: String::new(),
            selector: String::new(),
            max_matches: 3,
            min_chars: 0,
            max_chars: 100,
        }
    }
}

impl SelectorSpec {
    pub fn new(label: &str, selector: &str) -> Self {
        Self {
            label: label.to_string(),
            selector: selector.to_string(),
            ..Self::default()
        }
    }

    fn promo(label: &str, selector: &str) -> Self {
        Self {
            min_chars: 6,
            ..Self::new(label, selector)
        }
    }
}

/// Headings plus the usual promotion containers of casino and shop pages.
pub fn default_highlight_selectors() -> Vec<SelectorSpec> {
    vec![
        SelectorSpec {
            max_matches: 10,
            ..SelectorSpec::new("heading", "h1, h2, h3")
        },
        SelectorSpec::promo("promo", r#"div[class*="promo"]"#),
        SelectorSpec::promo("offer", r#"div[class*="offer"]"#),
        SelectorSpec::promo("bonus", r#"div[class*="bonus"]"#),
        SelectorSpec::promo("jackpot", r#"div[class*="jackpot"]"#),
        SelectorSpec::promo("amount", r#"div[class*="amount"]"#),
        SelectorSpec::promo("price", r#"span[class*="price"]"#),
    ]
}

/// Highlights the text of elements matching a CSS selector.
pub struct SelectorRule {
    spec: SelectorSpec,
    selector: Selector,
}

impl SelectorRule {
    pub fn new(spec: SelectorSpec) -> Result<Self, ParseError> {
        let selector = Selector::parse(&spec.selector).map_err(|err| ParseError::InvalidSelector {
            field: spec.label.clone(),
            selector: spec.selector.clone(),
            message: err.to_string(),
        })?;
        Ok(Self { spec, selector })
    }
}

impl std::fmt::Debug for SelectorRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorRule").field("spec", &self.spec).finish()
    }
}

impl HighlightRule for SelectorRule {
    fn label(&self) -> &str {
        &self.spec.label
    }

    fn extract(&self, text: &str) -> Vec<Highlight> {
        if !text.contains('<') {
            return Vec::new();
        }
        let doc = Html::parse_document(text);
        doc.select(&self.selector)
            .map(|element| {
                element
                    .text()
                    .flat_map(str::split_whitespace)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|snippet| !snippet.is_empty() && snippet.chars().count() >= self.spec.min_chars)
            .take(self.spec.max_matches)
            .map(|snippet| {
                let snippet: String = snippet.chars().take(self.spec.max_chars).collect();
                Highlight::new(self.spec.label.as_str(), snippet)
            })
            .collect()
    }
}
