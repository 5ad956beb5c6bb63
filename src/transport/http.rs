use crate::Result;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// How the API key is attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `?key=<key>` query parameter (Gemini)
    QueryKey,
}

/// Retry policy for transient failures (429, 5xx, timeouts, connect errors).
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryConfig {
    /// Exponential backoff: min_delay * 2^attempt, capped at max_delay.
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.min_delay.as_millis() as u64;
        let cap = self.max_delay.as_millis() as u64;
        let delay = base.saturating_mul(1u64 << attempt.min(16)).min(cap);
        Duration::from_millis(delay)
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    auth: Auth,
    retry: RetryConfig,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        auth: Auth,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            auth,
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and decode the JSON response, retrying transient failures.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0u32;

        loop {
            match self.send_once(&url, body).await {
                Ok(json) => return Ok(json),
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.backoff(attempt);
                    warn!(%url, attempt, ?delay, error = %err, "retrying model request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(crate::Error::Transport(err)),
            }
        }
    }

    async fn send_once(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<serde_json::Value, TransportError> {
        let mut request = self.client.post(url).json(body);

        if let Some(key) = &self.api_key {
            request = match self.auth {
                Auth::Bearer => request.bearer_auth(key),
                Auth::QueryKey => request.query(&[("key", key)]),
            };
        }

        debug!(%url, "sending model request");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The API key stays out of debug output.
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("has_api_key", &self.api_key.is_some())
            .field("retry", &self.retry)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http(e) => e.is_timeout() || e.is_connect(),
            TransportError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            TransportError::Other(_) => false,
        }
    }
}
