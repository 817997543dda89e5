use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which kinds of surface noise are removed before content is fingerprinted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Collapse every whitespace run into a single space and trim the ends.
    pub normalize_whitespace: bool,
    /// Replace dates, clock times, epoch numbers and "last updated" phrases with markers.
    pub mask_timestamps: bool,
    /// Replace session ids, CSRF tokens, nonces, UUIDs, generated element ids and
    /// cache-busting query parameters.
    pub mask_volatile_tokens: bool,
    /// Replace live player, user and view counters and countdown timers.
    pub mask_live_counters: bool,
    /// Drop the bodies of inline `<script>` elements.
    pub strip_scripts: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            normalize_whitespace: true,
            mask_timestamps: true,
            mask_volatile_tokens: true,
            mask_live_counters: true,
            strip_scripts: false,
        }
    }
}

impl NormalizeOptions {
    /// Only whitespace is normalized; everything else is kept verbatim.
    pub fn whitespace_only() -> Self {
        Self {
            normalize_whitespace: true,
            mask_timestamps: false,
            mask_volatile_tokens: false,
            mask_live_counters: false,
            strip_scripts: false,
        }
    }
}

struct Rewrite {
    pattern: Regex,
    replacement: &'static str,
}

fn rewrite(pattern: &str, replacement: &'static str) -> Rewrite {
    Rewrite {
        pattern: Regex::new(pattern).expect("built-in normalization pattern"),
        replacement,
    }
}

static SCRIPT_BODIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script([^>]*)>.*?</script>").expect("built-in normalization pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("built-in normalization pattern"));

// Phrases first: they swallow the rest of the line, including any date inside it.
static TIMESTAMP_REWRITES: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    vec![
        rewrite(r"(?i)last updated:?[ \t]*[^<\n]+", "Last updated: [TIME]"),
        rewrite(r"(?i)generated at:?[ \t]*[^<\n]+", "Generated at: [TIME]"),
        rewrite(r"(?i)current time:?[ \t]*[^<\n]+", "Current time: [TIME]"),
        rewrite(
            r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?",
            "[TIMESTAMP]",
        ),
        rewrite(r"\b\d{1,2}[/.-]\d{1,2}[/.-]\d{4}\b", "[DATE]"),
        rewrite(r"\b\d{1,2}:\d{2}(:\d{2})?(\s*(AM|PM|am|pm))?\b", "[TIME]"),
        rewrite(r"\b\d{10,13}\b", "[TIMESTAMP]"),
    ]
});

static TOKEN_REWRITES: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    vec![
        rewrite(r"sessionid=[A-Za-z0-9]+", "sessionid=[SESSION]"),
        rewrite(
            r#"(?i)csrf[_-]?token["']?\s*[:=]\s*["']?[A-Za-z0-9]+"#,
            "csrf_token=[TOKEN]",
        ),
        rewrite(
            r#"(?i)auth[_-]?token["']?\s*[:=]\s*["']?[A-Za-z0-9]+"#,
            "auth_token=[TOKEN]",
        ),
        rewrite(r#"(?i)name="csrf[_-]?token"\s+value="[^"]*""#, r#"name="csrf_token" value="[TOKEN]""#),
        rewrite(r"\btoken=[A-Za-z0-9]+", "token=[TOKEN]"),
        rewrite(r#"(data-)?nonce=["']?[A-Za-z0-9+/=]+["']?"#, r#"nonce="[NONCE]""#),
        rewrite(
            r"(?i)\b[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}\b",
            "[UUID]",
        ),
        rewrite(r#"data-id="[a-zA-Z0-9-]+""#, r#"data-id="[DATA_ID]""#),
        rewrite(r#"\bid="[a-zA-Z0-9-]{8,}""#, r#"id="[RANDOM_ID]""#),
        rewrite(r"[?&](v|_|t|cb|cache|timestamp)=\d+", ""),
        rewrite(r"[?&](utm_[^&=]*|ga_[^&=]*|fbclid)=[^&\s\x22'<>]*", ""),
    ]
});

static COUNTER_REWRITES: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    vec![
        rewrite(r"(?i)\b\d+\s*(players?|users?|online)\b", "[COUNT] players"),
        rewrite(r"(?i)\b(players?|users?|online):\s*\d+", "players: [COUNT]"),
        rewrite(r"(?i)\b\d+\s*(views?|clicks?|visits?)\b", "[COUNT] views"),
        rewrite(r"\b\d{1,2}[hms]\s*\d{0,2}[ms]?\s*\d{0,2}s?\b", "[COUNTDOWN]"),
    ]
});

/// Strips volatile noise from a fetched body so that only meaningful edits change its fingerprint.
///
/// The result is only ever hashed, never stored. The same input and options always
/// produce the same output.
pub fn normalize_content(raw: &str, options: &NormalizeOptions) -> String {
    let mut text = raw.to_string();

    if options.strip_scripts {
        text = SCRIPT_BODIES
            .replace_all(&text, "<script$1></script>")
            .into_owned();
    }
    if options.mask_timestamps {
        text = apply(&TIMESTAMP_REWRITES, text);
    }
    if options.mask_volatile_tokens {
        text = apply(&TOKEN_REWRITES, text);
    }
    if options.mask_live_counters {
        text = apply(&COUNTER_REWRITES, text);
    }
    if options.normalize_whitespace {
        text = WHITESPACE.replace_all(&text, " ").trim().to_string();
    }
    text
}

fn apply(rewrites: &[Rewrite], mut text: String) -> String {
    for rule in rewrites {
        if let std::borrow::Cow::Owned(replaced) =
            rule.pattern.replace_all(&text, rule.replacement)
        {
            text = replaced;
        }
    }
    text
}
