// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Authenticated, retrying transport for Databricks REST calls.
//!
//! Every request carries a fresh `Authorization` header from the
//! [`AuthProvider`]. Throttling, gateway errors and connection failures are
//! retried with exponential backoff. The token exchange and health probe use
//! the plain pooled client and issue a single request each.

use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, Response, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Transport settings shared by every connector request.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    /// Whole-request timeout, body included.
    pub read_timeout: Duration,
    pub max_retries: u32,
    /// First backoff step; doubled on every further attempt.
    pub retry_delay: Duration,
    pub max_connections_per_host: usize,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            max_retries: 5,
            retry_delay: Duration::from_millis(1500),
            max_connections_per_host: 100,
            user_agent: format!("CubeDev_Cube/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build the pooled reqwest client every component shares.
pub fn build_reqwest_client(config: &HttpClientConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.read_timeout)
        .pool_max_idle_per_host(config.max_connections_per_host)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| Error::io(format!("Failed to create HTTP client: {}", e)))
}

/// When and how long to back off.
#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    fn from_config(config: &HttpClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_delay,
        }
    }

    fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_retries
    }

    /// Delay after the `attempt`-th failure (1-based).
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    fn retryable_status(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }

    fn retryable_error(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect() || error.is_request()
    }
}

/// HTTP client for the Databricks SQL REST endpoints.
pub struct DatabricksHttpClient {
    client: Client,
    config: HttpClientConfig,
    retry: RetryPolicy,
    auth_provider: Arc<dyn AuthProvider>,
}

impl fmt::Debug for DatabricksHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabricksHttpClient")
            .field("config", &self.config)
            .field("auth_provider", &self.auth_provider)
            .finish()
    }
}

impl DatabricksHttpClient {
    pub fn new(config: HttpClientConfig, auth_provider: Arc<dyn AuthProvider>) -> Result<Self> {
        let client = build_reqwest_client(&config)?;
        Ok(Self::with_client(client, config, auth_provider))
    }

    /// Wrap an existing reqwest client, sharing its connection pool.
    pub fn with_client(
        client: Client,
        config: HttpClientConfig,
        auth_provider: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            client,
            retry: RetryPolicy::from_config(&config),
            config,
            auth_provider,
        }
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Start a request on the pooled client; send it with [`Self::execute`].
    pub fn request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    pub async fn auth_header(&self) -> Result<String> {
        self.auth_provider.auth_header().await
    }

    /// Send `builder`, authenticating and retrying transient failures.
    ///
    /// Non-2xx responses that are not retryable become an [`Error::Io`]
    /// carrying the status and response body.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = builder
                .try_clone()
                .ok_or_else(|| Error::io("Request body cannot be retried"))?
                .header(AUTHORIZATION, self.auth_header().await?)
                .build()
                .map_err(|e| Error::io(format!("Failed to build request: {}", e)))?;

            debug!(
                "{} {} (attempt {}/{})",
                request.method(),
                request.url(),
                attempt,
                self.retry.max_attempts()
            );

            let failure = match self.client.execute(request).await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    if !(RetryPolicy::retryable_status(status) && self.retry.allows(attempt)) {
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::io(format!("HTTP {} - {}", status.as_u16(), body)));
                    }
                    format!("HTTP {}", status.as_u16())
                }
                Err(e) => {
                    if !(RetryPolicy::retryable_error(&e) && self.retry.allows(attempt)) {
                        return Err(Error::io(format!(
                            "HTTP request failed after {} attempts: {}",
                            attempt, e
                        )));
                    }
                    e.to_string()
                }
            };

            let delay = self.retry.backoff(attempt);
            warn!(
                "Request failed with {} (attempt {}/{}), retrying in {:?}",
                failure,
                attempt,
                self.retry.max_attempts(),
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialBroker;

    fn policy() -> RetryPolicy {
        RetryPolicy::from_config(&HttpClientConfig::default())
    }

    #[test]
    fn test_http_client_config_default() {
        let config = HttpClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.read_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.max_connections_per_host, 100);
        assert!(config.user_agent.starts_with("CubeDev_Cube/"));
    }

    #[test]
    fn test_retryable_status() {
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::GATEWAY_TIMEOUT,
        ] {
            assert!(RetryPolicy::retryable_status(status), "{}", status);
        }
        for status in [
            StatusCode::OK,
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            assert!(!RetryPolicy::retryable_status(status), "{}", status);
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = policy();
        assert_eq!(policy.backoff(1), Duration::from_millis(1500));
        assert_eq!(policy.backoff(2), Duration::from_millis(3000));
        assert_eq!(policy.backoff(4), Duration::from_millis(12000));
    }

    #[test]
    fn test_attempt_budget() {
        let policy = policy();
        assert_eq!(policy.max_attempts(), 6);
        assert!(policy.allows(5));
        assert!(!policy.allows(6));
    }

    #[tokio::test]
    async fn test_auth_header_from_provider() {
        let auth = Arc::new(CredentialBroker::with_static_token("test-token"));
        let client = DatabricksHttpClient::new(HttpClientConfig::default(), auth).unwrap();
        assert_eq!(client.auth_header().await.unwrap(), "Bearer test-token");
    }

    #[tokio::test]
    async fn test_non_retryable_connect_failure_is_io_error() {
        let auth = Arc::new(CredentialBroker::with_static_token("t"));
        let config = HttpClientConfig {
            max_retries: 0,
            connect_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let client = DatabricksHttpClient::new(config, auth).unwrap();
        let err = client
            .execute(client.request(reqwest::Method::GET, "http://127.0.0.1:9/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
