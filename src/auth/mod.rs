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

//! Authentication for Databricks REST and SQL calls.
//!
//! Two schemes are supported and are mutually exclusive:
//! - personal access token (the JDBC `PWD`, presented as a bearer token)
//! - OAuth machine-to-machine client credentials, exchanged for a
//!   short-lived access token by [`CredentialBroker`]

pub mod oauth;

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;

pub use oauth::{
    CredentialBroker, CredentialState, OidcTokenExchange, TokenExchange, TokenResponse,
    TOKEN_EXPIRY_SKEW,
};

/// Supplies the `Authorization` header value for outgoing requests.
#[async_trait]
pub trait AuthProvider: Send + Sync + fmt::Debug {
    async fn auth_header(&self) -> Result<String>;
}

/// Validated credential configuration.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// `UID`/`PWD` authentication; the password is a personal access token.
    Token { uid: String, token: String },
    /// OAuth M2M client credentials.
    OAuth {
        client_id: String,
        client_secret: String,
    },
}

impl AuthConfig {
    /// Pick the auth scheme from the configured secrets.
    ///
    /// Exactly one of {token} or {client id + secret} must be present.
    pub fn resolve(
        uid: &str,
        token: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> Result<Self> {
        let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);

        match (non_empty(client_id), non_empty(client_secret), non_empty(token)) {
            (Some(_), None, _) => Err(Error::config(
                "Invalid credentials: No OAuth Client Secret provided",
            )),
            (None, Some(_), _) => Err(Error::config(
                "Invalid credentials: No OAuth Client ID provided",
            )),
            (Some(_), Some(_), Some(_)) => Err(Error::config(
                "Invalid credentials: both a token and OAuth client credentials are provided",
            )),
            (Some(client_id), Some(client_secret), None) => Ok(AuthConfig::OAuth {
                client_id,
                client_secret,
            }),
            (None, None, Some(token)) => Ok(AuthConfig::Token {
                uid: uid.to_string(),
                token,
            }),
            (None, None, None) => Err(Error::config("No credentials provided")),
        }
    }

    pub fn is_oauth(&self) -> bool {
        matches!(self, AuthConfig::OAuth { .. })
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::Token { uid, .. } => f
                .debug_struct("Token")
                .field("uid", uid)
                .field("token", &"***")
                .finish(),
            AuthConfig::OAuth { client_id, .. } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .field("client_secret", &"***")
                .finish(),
        }
    }
}
