use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::site::PageMeta;

// Separates metadata values inside the hashed string; cannot occur in trimmed text.
const FIELD_SEPARATOR: char = '\u{1f}';

/// Hex-encoded SHA-256 digest standing in for a larger piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest.iter() {
            use std::fmt::Write;
            let _ = write!(&mut hex, "{byte:02x}");
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight hex digits, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint of an already normalized body.
pub fn content_fingerprint(normalized: &str) -> Fingerprint {
    Fingerprint::of(normalized)
}

/// Metadata values are compared trimmed; an absent field reads as empty.
pub fn normalize_meta_value(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Fingerprint of the tracked metadata fields, in the given field order.
pub fn meta_fingerprint(meta: &PageMeta, fields: &[String]) -> Fingerprint {
    let mut joined = String::new();
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            joined.push(FIELD_SEPARATOR);
        }
        joined.push_str(field);
        joined.push('=');
        joined.push_str(&normalize_meta_value(meta.get(field).map(String::as_str)));
    }
    Fingerprint::of(&joined)
}
