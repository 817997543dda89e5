use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::redirect::Policy;
use tracker_logging::tracker_debug;

use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

/// Browser-like agent; some promotion pages refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
    /// Media types accepted as pages. Empty accepts anything.
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allowed_content_types: ["text/html", "application/xhtml+xml", "text/plain"]
                .iter()
                .map(|ct| ct.to_string())
                .collect(),
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError>;
}

/// HTTP fetcher sharing one connection pool across every site and run.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let user_agent = HeaderValue::from_str(&settings.user_agent)
            .map_err(|err| FetchError::new(FailureKind::Network, format!("user agent: {err}")))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(Policy::limited(settings.redirect_limit))
            .default_headers([(USER_AGENT, user_agent)].into_iter().collect())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn accepts(&self, content_type: &str) -> bool {
        let media_type = content_type.split(';').next().unwrap_or_default().trim();
        self.settings.allowed_content_types.is_empty()
            || self
                .settings
                .allowed_content_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(media_type))
    }

    fn too_large(&self, actual: Option<u64>) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual,
            },
            "page not read",
        )
    }

    /// Streams the body, giving up as soon as it passes `max_bytes`.
    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(classify_error)?;
            let len = (body.len() + chunk.len()) as u64;
            if len > self.settings.max_bytes {
                return Err(self.too_large(Some(len)));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let target = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }
        if response
            .content_length()
            .is_some_and(|len| len > self.settings.max_bytes)
        {
            return Err(self.too_large(response.content_length()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(ct) = content_type.as_deref().filter(|ct| !self.accepts(ct)) {
            return Err(FetchError::new(
                FailureKind::UnsupportedContentType {
                    content_type: ct.to_string(),
                },
                "skipped",
            ));
        }

        let final_url = response.url().to_string();
        let bytes = self.read_body(response).await?;
        if final_url != url {
            tracker_debug!("{} redirected to {}", url, final_url);
        }

        Ok(FetchOutput {
            metadata: FetchMetadata {
                requested_url: url.to_string(),
                final_url,
                status: status.as_u16(),
                content_type,
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

fn classify_error(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_redirect() {
        FailureKind::RedirectLimitExceeded
    } else {
        FailureKind::Network
    };
    FetchError::new(kind, err.to_string())
}
