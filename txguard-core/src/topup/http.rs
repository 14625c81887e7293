//! HTTP transaction client.
//!
//! Production implementation of [`TransactionApi`] over the remote
//! transaction endpoint, with exponential backoff on transient transport
//! failures. Retried attempts resend the request unchanged, including its
//! `clientReference`, so a timeout after the server already processed the
//! mutation cannot double-charge. Server-side rejections (4xx with a
//! structured body) are never retried: the pipeline needs the body for
//! message extraction.

use async_trait::async_trait;
use backoff::{future::retry_notify, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use super::api::{ApiFailure, TopupRequest, TopupResponse, TransactionApi};
use crate::error::TopupError;

/// Configuration for the HTTP transaction client.
#[derive(Clone)]
pub struct HttpApiConfig {
    /// API base URL, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Bearer token for the authenticated session.
    pub auth_token: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl HttpApiConfig {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

impl std::fmt::Debug for HttpApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// [`TransactionApi`] over HTTPS.
pub struct HttpTransactionApi {
    client: Client,
    config: HttpApiConfig,
}

impl HttpTransactionApi {
    pub fn new(config: HttpApiConfig) -> Result<Self, TopupError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn submit_once(
        &self,
        request: &TopupRequest,
    ) -> Result<TopupResponse, backoff::Error<ApiFailure>> {
        let url = format!("{}/transactions/topup", self.config.base_url);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.auth_token)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, latency_ms = start.elapsed().as_millis() as u64, "Top-up request failed");
                let failure = ApiFailure::transport(e.to_string());
                if e.is_timeout() || e.is_connect() {
                    backoff::Error::transient(failure)
                } else {
                    backoff::Error::permanent(failure)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // Keep the structured body for the pipeline's message
            // extraction when the server sent one.
            let failure = match response.json::<serde_json::Value>().await {
                Ok(body) => ApiFailure {
                    body: Some(body),
                    transport: Some(format!("HTTP {status}")),
                },
                Err(_) => ApiFailure::transport(format!("HTTP {status}")),
            };
            return if is_transient_status(status) {
                Err(backoff::Error::transient(failure))
            } else {
                Err(backoff::Error::permanent(failure))
            };
        }

        let parsed: TopupResponse = response.json().await.map_err(|e| {
            backoff::Error::permanent(ApiFailure::transport(format!(
                "Failed to parse top-up response: {e}"
            )))
        })?;

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            success = parsed.success,
            "Top-up request completed"
        );
        Ok(parsed)
    }
}

/// Statuses worth retrying. Replaying is safe: every attempt of one
/// mutation carries the same `clientReference`, which the server uses to
/// dedupe a request it already processed.
fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

#[async_trait]
impl TransactionApi for HttpTransactionApi {
    #[instrument(level = "info", skip_all, fields(product_code = %request.product_code))]
    async fn submit_topup(&self, request: &TopupRequest) -> Result<TopupResponse, ApiFailure> {
        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(200),
            max_interval: Duration::from_secs(2),
            max_elapsed_time: Some(self.config.timeout * self.config.max_retries),
            ..Default::default()
        };

        retry_notify(
            backoff,
            || async { self.submit_once(request).await },
            |failure: ApiFailure, duration: Duration| {
                warn!(
                    transport = ?failure.transport,
                    retry_after_ms = duration.as_millis() as u64,
                    "Top-up retry scheduled"
                );
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient_status(StatusCode::BAD_REQUEST));
        assert!(!is_transient_status(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = HttpApiConfig::new("https://api.example.com/v1", "secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
