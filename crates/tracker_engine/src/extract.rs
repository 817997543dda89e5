use scraper::{Html, Selector};
use tracker_core::PageMeta;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid selector {selector:?} for field {field}: {message}")]
    InvalidSelector {
        field: String,
        selector: String,
        message: String,
    },
    #[error("body contains no markup")]
    NotMarkup,
}

/// Where one metadata field is read from. Rules for the same field are tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRule {
    pub field: String,
    pub selector: String,
    /// Attribute holding the value; `None` reads the element text.
    pub attribute: Option<String>,
}

impl MetaRule {
    pub fn text(field: &str, selector: &str) -> Self {
        Self {
            field: field.to_string(),
            selector: selector.to_string(),
            attribute: None,
        }
    }

    pub fn attribute(field: &str, selector: &str, attribute: &str) -> Self {
        Self {
            field: field.to_string(),
            selector: selector.to_string(),
            attribute: Some(attribute.to_string()),
        }
    }
}

/// Title, description (with the Open Graph fallback) and keywords.
pub fn default_meta_rules() -> Vec<MetaRule> {
    vec![
        MetaRule::text("title", "title"),
        MetaRule::attribute("description", r#"meta[name="description"]"#, "content"),
        MetaRule::attribute("description", r#"meta[property="og:description"]"#, "content"),
        MetaRule::attribute("keywords", r#"meta[name="keywords"]"#, "content"),
    ]
}

pub trait MetaExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<PageMeta, ParseError>;
}

struct CompiledRule {
    field: String,
    selector: Selector,
    attribute: Option<String>,
}

pub struct HtmlMetaExtractor {
    rules: Vec<CompiledRule>,
}

impl HtmlMetaExtractor {
    pub fn with_rules(rules: &[MetaRule]) -> Result<Self, ParseError> {
        let rules = rules
            .iter()
            .map(|rule| {
                let selector =
                    Selector::parse(&rule.selector).map_err(|err| ParseError::InvalidSelector {
                        field: rule.field.clone(),
                        selector: rule.selector.clone(),
                        message: err.to_string(),
                    })?;
                Ok(CompiledRule {
                    field: rule.field.clone(),
                    selector,
                    attribute: rule.attribute.clone(),
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        Ok(Self { rules })
    }
}

impl Default for HtmlMetaExtractor {
    fn default() -> Self {
        let rules = default_meta_rules()
            .iter()
            .filter_map(|rule| {
                Some(CompiledRule {
                    field: rule.field.clone(),
                    selector: Selector::parse(&rule.selector).ok()?,
                    attribute: rule.attribute.clone(),
                })
            })
            .collect();
        Self { rules }
    }
}

impl MetaExtractor for HtmlMetaExtractor {
    /// Values are trimmed; fields with no non-empty match are left out.
    fn extract(&self, html: &str) -> Result<PageMeta, ParseError> {
        if !html.contains('<') {
            return Err(ParseError::NotMarkup);
        }
        let doc = Html::parse_document(html);
        let mut meta = PageMeta::new();
        for rule in &self.rules {
            if meta.contains_key(&rule.field) {
                continue;
            }
            let value = doc.select(&rule.selector).find_map(|element| {
                let raw = match &rule.attribute {
                    Some(attribute) => element.value().attr(attribute)?.to_string(),
                    None => element.text().collect::<String>(),
                };
                let trimmed = raw.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            });
            if let Some(value) = value {
                meta.insert(rule.field.clone(), value);
            }
        }
        Ok(meta)
    }
}
