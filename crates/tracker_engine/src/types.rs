use std::fmt;

/// Raw response body of one tracked page plus what the server said about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub requested_url: String,
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

impl FetchMetadata {
    pub fn redirected(&self) -> bool {
        self.requested_url != self.final_url
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Why a page could not be fetched. Reported on the site's check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl => f.write_str("invalid url"),
            Self::HttpStatus(code) => write!(f, "http status {code}"),
            Self::Timeout => f.write_str("timed out"),
            Self::RedirectLimitExceeded => f.write_str("too many redirects"),
            Self::TooLarge {
                max_bytes,
                actual: Some(actual),
            } => write!(f, "body of {actual} bytes exceeds limit of {max_bytes}"),
            Self::TooLarge {
                max_bytes,
                actual: None,
            } => write!(f, "body exceeds limit of {max_bytes} bytes"),
            Self::UnsupportedContentType { content_type } => {
                write!(f, "not a page ({content_type})")
            }
            Self::Network => f.write_str("network error"),
        }
    }
}
