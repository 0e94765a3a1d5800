//! Outbound metadata requests with retry, backoff and rate-limit handling.
//!
//! Only rate limiting (429) and connection-level faults are retried. Any other
//! non-200 status ends the request immediately.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header::RETRY_AFTER, Client as HttpClient};
use tokio::time::sleep;

use crate::error::{AppResult, FetchError, TransportError};

/// Status, rate-limit hint and body of one HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Raw `Retry-After` header value, if any
    pub retry_after: Option<String>,
    pub body: String,
}

/// One GET request; a fresh exchange on every call
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}

/// `reqwest`-backed transport with a per-request timeout
pub struct ReqwestTransport {
    http_client: HttpClient,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else {
        TransportError::Connection(error.to_string())
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let response = self.http_client.get(url).send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(classify)?;

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Attempt budget and base delay
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_retries: u32,
    /// Backoff base, and the wait used when a 429 carries no usable hint
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following a connection fault on `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay * 2u32.saturating_pow(attempt)
    }

    /// Wait requested by a 429 response
    pub fn rate_limit_wait(&self, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.retry_delay)
    }
}

/// Drops the query string so API keys never reach the logs
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[derive(Clone)]
pub struct ResilientFetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// GETs `url` and parses the JSON body
    pub async fn fetch(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let max_retries = self.policy.max_retries;
        let endpoint = redact(url);

        for attempt in 0..max_retries {
            let is_last = attempt + 1 >= max_retries;

            match self.transport.get(url).await {
                Ok(response) if response.status == 200 => {
                    return serde_json::from_str(&response.body).map_err(|e| {
                        tracing::error!(endpoint = %endpoint, error = %e, "Failed to parse API response");
                        FetchError::Malformed(e.to_string())
                    });
                }
                Ok(response) if response.status == 429 => {
                    let wait = self.policy.rate_limit_wait(response.retry_after.as_deref());
                    tracing::warn!(
                        endpoint = %endpoint,
                        wait_secs = wait.as_secs_f64(),
                        "Rate limited"
                    );
                    if !is_last {
                        sleep(wait).await;
                    }
                }
                Ok(response) => {
                    tracing::error!(
                        endpoint = %endpoint,
                        status = response.status,
                        "API request failed"
                    );
                    return Err(FetchError::Status(response.status));
                }
                Err(e) => {
                    tracing::error!(
                        endpoint = %endpoint,
                        attempt = attempt + 1,
                        max_retries,
                        error = %e,
                        "API request failed"
                    );
                    if !is_last {
                        let wait = self.policy.backoff(attempt);
                        tracing::info!(wait_secs = wait.as_secs_f64(), "Retrying");
                        sleep(wait).await;
                    }
                }
            }
        }

        Err(FetchError::RetriesExhausted)
    }
}
