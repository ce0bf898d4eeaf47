//! Cached bearer token for a third-party identity service.
//!
//! The identity service answers a password-scoped auth request with a JSON
//! envelope holding the expiry, and hands out the token itself in the
//! `X-Subject-Token` response header. [`TokenManager`] keeps the last token
//! and refreshes it once it has expired.

use crate::error::{Result, RegistryError};
use chrono::{DateTime, Utc};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tokio::sync::Mutex;

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;

/// Header carrying the issued token on the identity service's response.
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Identity service endpoint and the password identity used against it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Token endpoint, e.g. `https://iam.example.com/v3/auth/tokens`
    pub endpoint: String,
    pub user: String,
    pub password: String,
    /// Domain the user belongs to
    pub domain: String,
    /// Project the token is scoped to
    pub project: String,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .field("project", &self.project)
            .finish()
    }
}

impl IdentityConfig {
    fn request_body(&self) -> serde_json::Value {
        json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": self.user,
                            "password": self.password,
                            "domain": { "name": self.domain }
                        }
                    }
                },
                "scope": {
                    "project": { "name": self.project }
                }
            }
        })
    }
}

/// A token value and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Returns true once `now` has reached the expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    token: TokenBody,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    expires_at: DateTime<Utc>,
}

/// Hands out a valid identity token, refreshing it on expiry.
///
/// The cache is guarded by one async mutex held across the check and the
/// refresh, so concurrent callers never observe a half-written token.
#[derive(Debug)]
pub struct TokenManager {
    http_client: ReqwestClient,
    identity: IdentityConfig,
    cached: Mutex<Option<AuthToken>>,
}

impl TokenManager {
    /// Creates a manager with an empty cache. The first [`generate`](Self::generate)
    /// call fetches a token.
    pub fn new(identity: IdentityConfig, http_client: ReqwestClient) -> Self {
        Self {
            http_client,
            identity,
            cached: Mutex::new(None),
        }
    }

    /// Seeds the cache with an existing token.
    pub fn with_token(self, token: AuthToken) -> Self {
        Self {
            cached: Mutex::new(Some(token)),
            ..self
        }
    }

    /// Fetches a token right away, replacing whatever is cached.
    pub async fn prime(&self) -> Result<()> {
        let token = self.fetch().await?;
        *self.cached.lock().await = Some(token);
        Ok(())
    }

    /// Returns a copy of the cached token, if any.
    pub async fn current(&self) -> Option<AuthToken> {
        self.cached.lock().await.clone()
    }

    /// Returns the cached token while it is valid, otherwise fetches a new one.
    ///
    /// Returns `None` when the refresh fails; callers proceed without auth
    /// and let the remote side reject the request.
    pub async fn generate(&self) -> Option<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref()
            && !token.is_expired_at(Utc::now())
        {
            return Some(token.value.clone());
        }

        match self.fetch().await {
            Ok(token) => {
                let value = token.value.clone();
                *cached = Some(token);
                Some(value)
            }
            Err(e) => {
                tracing::error!(endpoint = %self.identity.endpoint, "failed to refresh identity token: {}", e);
                None
            }
        }
    }

    async fn fetch(&self) -> Result<AuthToken> {
        tracing::debug!(endpoint = %self.identity.endpoint, "requesting identity token");

        let response = self
            .http_client
            .post(&self.identity.endpoint)
            .json(&self.identity.request_body())
            .send()
            .await
            .map_err(|e| {
                RegistryError::network_with_source(
                    format!("Failed to reach identity service at {}", self.identity.endpoint),
                    e,
                )
            })?;

        let status = response.status();
        let url = response.url().to_string();
        let value = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await.map_err(|e| {
            RegistryError::network_with_source("Failed to read identity service response", e)
        })?;

        if !status.is_success() {
            return Err(RegistryError::status(
                status.as_u16(),
                url,
                String::from_utf8_lossy(&body),
            ));
        }

        let envelope: TokenEnvelope = serde_json::from_slice(&body).map_err(|e| {
            RegistryError::validation_with_source("Failed to parse identity service response", e)
        })?;

        let value = value.filter(|v| !v.is_empty()).ok_or_else(|| {
            RegistryError::validation(format!(
                "Identity service response missing {} header",
                SUBJECT_TOKEN_HEADER
            ))
        })?;

        Ok(AuthToken {
            value,
            expires_at: envelope.token.expires_at,
        })
    }
}
