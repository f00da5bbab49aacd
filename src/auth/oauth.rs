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

//! OAuth M2M token exchange and caching.
//!
//! [`CredentialBroker`] owns the single cached access token of a driver.
//! The token is refreshed through a client-credentials exchange against
//! `https://{host}/oidc/v1/token` once it is within [`TOKEN_EXPIRY_SKEW`] of
//! its server-reported lifetime.
//!
//! The cache lives behind a `tokio::sync::Mutex` that is held across the
//! exchange, so concurrent callers hitting an expired token wait for one
//! refresh instead of racing their own.

use crate::auth::{AuthConfig, AuthProvider};
use crate::client::base_url;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Tokens are refreshed this long before the server-reported expiry.
pub const TOKEN_EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// Successful response of the OIDC token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Performs one client-credentials exchange.
#[async_trait]
pub trait TokenExchange: Send + Sync + fmt::Debug {
    async fn exchange(&self) -> Result<TokenResponse>;
}

/// [`TokenExchange`] against the workspace OIDC endpoint.
pub struct OidcTokenExchange {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl fmt::Debug for OidcTokenExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcTokenExchange")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl OidcTokenExchange {
    pub fn new(
        client: Client,
        host: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token_url: format!("{}/oidc/v1/token", base_url(host)),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl TokenExchange for OidcTokenExchange {
    async fn exchange(&self) -> Result<TokenResponse> {
        debug!("Exchanging client credentials at {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", "all-apis")])
            .send()
            .await
            .map_err(|e| Error::AuthExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::AuthExchange(
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::AuthExchange(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| Error::AuthExchange(format!("Malformed token response: {}", e)))
    }
}

/// Lifecycle of the cached credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Unset,
    Valid,
    Expired,
}

struct Credential {
    token: String,
    refresh_at: Instant,
}

enum Scheme {
    /// Personal access token, presented as-is.
    Static(String),
    OAuth(Arc<dyn TokenExchange>),
}

/// Hands out a bearer token that is valid at the time of the call.
pub struct CredentialBroker {
    scheme: Scheme,
    cached: Mutex<Option<Credential>>,
}

impl fmt::Debug for CredentialBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match &self.scheme {
            Scheme::Static(_) => "token",
            Scheme::OAuth(_) => "oauth",
        };
        f.debug_struct("CredentialBroker")
            .field("scheme", &scheme)
            .finish()
    }
}

impl CredentialBroker {
    /// Build a broker for an already validated [`AuthConfig`].
    pub fn new(config: &AuthConfig, client: Client, host: &str) -> Self {
        match config {
            AuthConfig::Token { token, .. } => Self::with_static_token(token.clone()),
            AuthConfig::OAuth {
                client_id,
                client_secret,
            } => Self::with_exchange(Arc::new(OidcTokenExchange::new(
                client,
                host,
                client_id.clone(),
                client_secret.clone(),
            ))),
        }
    }

    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self {
            scheme: Scheme::Static(token.into()),
            cached: Mutex::new(None),
        }
    }

    pub fn with_exchange(exchange: Arc<dyn TokenExchange>) -> Self {
        Self {
            scheme: Scheme::OAuth(exchange),
            cached: Mutex::new(None),
        }
    }

    pub fn is_oauth(&self) -> bool {
        matches!(self.scheme, Scheme::OAuth(_))
    }

    pub async fn state(&self) -> CredentialState {
        match &self.scheme {
            Scheme::Static(_) => CredentialState::Valid,
            Scheme::OAuth(_) => match self.cached.lock().await.as_ref() {
                None => CredentialState::Unset,
                Some(c) if Instant::now() >= c.refresh_at => CredentialState::Expired,
                Some(_) => CredentialState::Valid,
            },
        }
    }

    /// Return a token, refreshing it first if it is unset or expired.
    ///
    /// A failed exchange leaves any previously cached token in place.
    pub async fn get_valid_token(&self) -> Result<String> {
        let exchange = match &self.scheme {
            Scheme::Static(token) => return Ok(token.clone()),
            Scheme::OAuth(exchange) => exchange,
        };

        let mut cached = self.cached.lock().await;
        if let Some(credential) = cached.as_ref() {
            if Instant::now() < credential.refresh_at {
                return Ok(credential.token.clone());
            }
        }

        let requested_at = Instant::now();
        let response = exchange.exchange().await?;
        if response.access_token.is_empty() {
            return Err(Error::AuthExchange(
                "Malformed token response: empty access_token".to_string(),
            ));
        }

        let refresh_at = requested_at
            .checked_add(Duration::from_secs(response.expires_in).saturating_sub(TOKEN_EXPIRY_SKEW))
            .ok_or_else(|| {
                Error::AuthExchange(format!(
                    "Malformed token response: expires_in {} out of range",
                    response.expires_in
                ))
            })?;
        info!(
            "Obtained OAuth access token (expires in {}s)",
            response.expires_in
        );

        let token = response.access_token;
        *cached = Some(Credential {
            token: token.clone(),
            refresh_at,
        });
        Ok(token)
    }

    pub async fn authorization_header(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.get_valid_token().await?))
    }
}

#[async_trait]
impl AuthProvider for CredentialBroker {
    async fn auth_header(&self) -> Result<String> {
        self.authorization_header().await
    }
}
