//! Destination registry adapter.
//!
//! Before images are replicated the destination needs a project (or
//! namespace) to hold them. [`Destination`] shapes the create request for its
//! dialect and authenticates it either with the endpoint credentials or with
//! a token from a shared [`TokenManager`].

use crate::auth::TokenManager;
use crate::client::{Endpoint, drain, status_error};
use crate::dialect::{Dialect, ProjectAuth};
use crate::error::{Result, RegistryError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Visibility of a newly created project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    /// Numeric flag used on the wire: 1 for public, 0 for private.
    pub fn as_flag(self) -> u8 {
        match self {
            Self::Private => 0,
            Self::Public => 1,
        }
    }
}

impl FromStr for Visibility {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" | "0" => Ok(Self::Private),
            "public" | "1" => Ok(Self::Public),
            other => Err(RegistryError::validation(format!(
                "Unknown visibility '{}': expected 'public' or 'private'",
                other
            ))),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private => f.write_str("private"),
            Self::Public => f.write_str("public"),
        }
    }
}

/// A registry that can create projects.
#[async_trait]
pub trait ProjectRegistry: Send + Sync {
    /// Creates `name` on the registry.
    ///
    /// Whether an existing project is an error depends on the dialect: the
    /// standard dialect returns a conflict error (`is_conflict()`), the
    /// namespace dialect treats it as success.
    async fn create_project(&self, name: &str, visibility: Visibility) -> Result<()>;
}

/// Create-project adapter for one destination registry.
#[derive(Debug, Clone)]
pub struct Destination {
    endpoint: Endpoint,
    dialect: Arc<dyn Dialect>,
    tokens: Option<Arc<TokenManager>>,
}

impl Destination {
    /// Creates an adapter.
    ///
    /// Dialects that authenticate with identity tokens need a token manager;
    /// constructing one without it is a configuration error.
    pub fn new(
        endpoint: Endpoint,
        dialect: Arc<dyn Dialect>,
        tokens: Option<Arc<TokenManager>>,
    ) -> Result<Self> {
        if matches!(dialect.project_auth(), ProjectAuth::IdentityToken { .. }) && tokens.is_none() {
            return Err(RegistryError::config(
                format!(
                    "The {} dialect needs an identity token manager to create projects",
                    dialect.name()
                ),
                None,
            ));
        }

        Ok(Self {
            endpoint,
            dialect,
            tokens,
        })
    }

    /// Returns the destination endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn authorize(&self, url: &str) -> reqwest::RequestBuilder {
        match self.dialect.project_auth() {
            ProjectAuth::Basic => self.endpoint.request(Method::POST, url),
            ProjectAuth::IdentityToken { header } => {
                let request = self.endpoint.bare_request(Method::POST, url);
                let token = match &self.tokens {
                    Some(tokens) => tokens.generate().await,
                    None => None,
                };
                match token {
                    Some(token) => request.header(header.as_str(), token),
                    None => {
                        tracing::warn!(%url, "no identity token available, sending unauthenticated");
                        request
                    }
                }
            }
        }
    }
}

#[async_trait]
impl ProjectRegistry for Destination {
    async fn create_project(&self, name: &str, visibility: Visibility) -> Result<()> {
        let project = self
            .dialect
            .project_request(self.endpoint.url(), name, visibility);
        tracing::debug!(url = %project.url, dialect = self.dialect.name(), "creating project {}", name);

        let request = self
            .authorize(&project.url)
            .await
            .header(CONTENT_TYPE, project.content_type)
            .body(project.body.to_string());
        let response = self.endpoint.send(request).await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                drain(response).await;
                tracing::info!("project {} created on {}", name, self.endpoint.url());
                Ok(())
            }
            StatusCode::CONFLICT if self.dialect.conflict_is_success() => {
                drain(response).await;
                tracing::debug!("project {} already exists on {}", name, self.endpoint.url());
                Ok(())
            }
            _ => Err(status_error(response).await),
        }
    }
}
