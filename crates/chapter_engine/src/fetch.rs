use std::time::Duration;

use chapter_core::{RetryPolicy, RetrySchedule};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::decode::decode_page;

/// Browser identity presented on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProfile {
    Desktop,
    Mobile,
}

impl IdentityProfile {
    pub fn user_agent(self) -> &'static str {
        match self {
            IdentityProfile::Desktop => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36"
            }
            IdentityProfile::Mobile => {
                "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36"
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub identity: IdentityProfile,
    /// Pre-folded `Cookie` header value applied to every request.
    pub cookie_header: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
            identity: IdentityProfile::Desktop,
            cookie_header: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// A fetched and decoded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub html: String,
    pub final_url: Url,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("resource not found: {url}")]
    NotFound { url: Url },
    #[error("gave up on {url} after {attempts} attempts")]
    RetriesExhausted { url: Url, attempts: u32 },
    #[error("fetch cancelled")]
    Cancelled,
    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),
}

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// One logical fetch: retries retryable failures internally per the
    /// configured policy. `cancel` is observed before every attempt and
    /// during every backoff sleep.
    async fn fetch_page(&self, url: &Url, cancel: &CancellationToken)
        -> Result<Page, FetchError>;
}

enum Attempt {
    Success(Page),
    NotFound,
    Forbidden,
    Transient(String),
}

/// `reqwest`-backed fetcher holding one pooled client for the whole run,
/// so the session survives across chapters.
#[derive(Debug)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = settings.cookie_header.as_deref() {
            match HeaderValue::from_str(cookie) {
                Ok(value) => {
                    headers.insert(COOKIE, value);
                }
                Err(err) => {
                    log::warn!("cookie header rejected ({err}); continuing without cookies");
                }
            }
        }

        let client = reqwest::Client::builder()
            .user_agent(settings.identity.user_agent())
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, settings })
    }

    async fn attempt(&self, url: &Url) -> Attempt {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(err) => return Attempt::Transient(describe_transport(&err)),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Attempt::NotFound;
        }
        if status == StatusCode::FORBIDDEN {
            return Attempt::Forbidden;
        }
        if !status.is_success() {
            return Attempt::Transient(format!("http status {status}"));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        match response.bytes().await {
            Ok(bytes) => Attempt::Success(Page {
                html: decode_page(&bytes, content_type.as_deref()),
                final_url,
            }),
            Err(err) => Attempt::Transient(describe_transport(&err)),
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch_page(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<Page, FetchError> {
        let mut schedule = RetrySchedule::new(&self.settings.retry);
        loop {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            let cause = match self.attempt(url).await {
                Attempt::Success(page) => return Ok(page),
                Attempt::NotFound => {
                    log::error!("404 not found: {url}");
                    return Err(FetchError::NotFound { url: url.clone() });
                }
                Attempt::Forbidden => {
                    log::warn!("403 forbidden on {url}; cookies may be missing or stale");
                    "403 forbidden".to_string()
                }
                Attempt::Transient(cause) => cause,
            };

            let Some(wait) = schedule.next_wait() else {
                let attempts = schedule.retries().saturating_add(1);
                log::error!("giving up on {url} after {attempts} attempts: {cause}");
                return Err(FetchError::RetriesExhausted {
                    url: url.clone(),
                    attempts,
                });
            };
            log::warn!(
                "request failed ({cause}); retry {} of {} in {:?}",
                schedule.retries(),
                self.settings
                    .retry
                    .max_retries
                    .map_or_else(|| "unlimited".to_string(), |m| m.to_string()),
                wait
            );
            if cancel
                .run_until_cancelled(tokio::time::sleep(wait))
                .await
                .is_none()
            {
                return Err(FetchError::Cancelled);
            }
        }
    }
}

fn describe_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "timeout".to_string();
    }
    if err.is_connect() {
        return format!("connection failed: {err}");
    }
    err.to_string()
}
