//! HTTP client for the hint backend.
//!
//! Posts an extracted problem to the backend's `/hint` or `/solution`
//! endpoint and returns the generated text. Transient failures
//! (network, timeout, non-2xx status) are retried with a linearly
//! growing backoff; a well-formed HTTP response with an unusable
//! payload is permanent and surfaces immediately.

pub mod error;

pub use error::{ApiError, ApiResult};

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use problem_info::ProblemRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_millis(1000);
const DEFAULT_RETRIES: u32 = 2;

/// Descriptions are truncated to this many characters before sending.
const MAX_DESCRIPTION_CHARS: usize = 10_000;

/// Error bodies kept for diagnostics are capped at this length.
const MAX_ERROR_BODY_CHARS: usize = 1_000;

const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
const CLIENT_SOURCE: &str = "problem-info";

/// Which kind of help to request from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Hint,
    Solution,
}

impl RequestKind {
    fn path(&self) -> &'static str {
        match self {
            RequestKind::Hint => "/hint",
            RequestKind::Solution => "/solution",
        }
    }

    /// The response field carrying the answer for this kind.
    fn field(&self) -> &'static str {
        match self {
            RequestKind::Hint => "hint",
            RequestKind::Solution => "solution",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

#[derive(Debug, Serialize)]
struct HintRequest<'a> {
    title: &'a str,
    desc: &'a str,
    metadata: RequestMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestMetadata {
    request_id: String,
    timestamp: String,
    source: &'static str,
    version: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct HintResponse {
    hint: Option<String>,
    solution: Option<String>,
}

impl HintResponse {
    fn take(self, kind: RequestKind) -> Option<String> {
        let text = match kind {
            RequestKind::Hint => self.hint,
            RequestKind::Solution => self.solution,
        };
        text.filter(|t| !t.trim().is_empty())
    }
}

/// Client for the hint backend API.
///
/// # Example
///
/// ```rust,ignore
/// use hint_client::{HintClient, RequestKind};
///
/// let client = HintClient::new("http://localhost:8000");
/// let hint = client.request(RequestKind::Hint, &record).await?;
/// ```
pub struct HintClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    backoff_unit: Duration,
    retries: u32,
}

impl HintClient {
    /// Create a client for the given backend base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Create a client from the `HINT_API_URL` environment variable.
    /// Returns `None` when the variable is unset or empty.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("HINT_API_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        Some(Self::new(base_url))
    }

    /// Set the per-request timeout (default 30s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the backoff unit; the n-th retry waits `unit * n` (default 1s).
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Set how many retries follow the initial attempt (default 2).
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Request a hint for the problem.
    pub async fn hint(&self, record: &ProblemRecord) -> ApiResult<String> {
        self.request(RequestKind::Hint, record).await
    }

    /// Request a full solution for the problem.
    pub async fn solution(&self, record: &ProblemRecord) -> ApiResult<String> {
        self.request(RequestKind::Solution, record).await
    }

    /// Send a request, retrying transient failures with backoff.
    pub async fn request(&self, kind: RequestKind, record: &ProblemRecord) -> ApiResult<String> {
        let mut attempt = 0;
        loop {
            match self.attempt(kind, record).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    let delay = backoff_delay(self.backoff_unit, attempt);
                    warn!(
                        %kind,
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, kind: RequestKind, record: &ProblemRecord) -> ApiResult<String> {
        let request_id = Uuid::new_v4().to_string();
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), kind.path());
        debug!(%kind, %url, %request_id, title = %record.title, "sending request");
        let started = std::time::Instant::now();

        // The budget bounds the whole exchange, headers and body both; a
        // server that stalls mid-body must still read as a timeout.
        let exchange = self.exchange(kind, record, &request_id, &url);
        let text = match tokio::time::timeout(self.timeout, exchange).await {
            Err(_) => {
                return Err(ApiError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
            Ok(outcome) => outcome?,
        };

        debug!(
            %kind,
            %request_id,
            duration_ms = started.elapsed().as_millis() as u64,
            response_len = text.len(),
            "request succeeded"
        );
        Ok(text)
    }

    async fn exchange(
        &self,
        kind: RequestKind,
        record: &ProblemRecord,
        request_id: &str,
        url: &str,
    ) -> ApiResult<String> {
        let body = HintRequest {
            title: &record.title,
            desc: truncate_chars(&record.description, MAX_DESCRIPTION_CHARS),
            metadata: RequestMetadata {
                request_id: request_id.to_string(),
                timestamp: Utc::now().to_rfc3339(),
                source: CLIENT_SOURCE,
                version: CLIENT_VERSION,
            },
        };

        let send = self
            .client
            .post(url)
            .header("X-Request-ID", request_id)
            .header("X-Client-Version", CLIENT_VERSION)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&body)
            .send();

        let response = match send.await {
            Err(e) if e.is_timeout() => {
                return Err(ApiError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
            Err(e) => return Err(ApiError::Network(e)),
            Ok(response) => response,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS).to_string(),
            });
        }

        let parsed: HintResponse =
            response
                .json()
                .await
                .map_err(|e| ApiError::InvalidResponse {
                    reason: format!("malformed body: {e}"),
                })?;

        parsed.take(kind).ok_or_else(|| ApiError::InvalidResponse {
            reason: format!("missing or empty '{}' field", kind.field()),
        })
    }
}

/// Delay before the n-th retry (1-based): `unit * n`.
fn backoff_delay(unit: Duration, retry: u32) -> Duration {
    unit * retry
}

/// Truncate to a character count without splitting a code point.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
