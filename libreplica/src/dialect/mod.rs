//! Registry dialects.
//!
//! A dialect bundles everything that differs between registry flavours: how
//! repository names are rewritten, where each resource lives, how an upload
//! session is addressed, what a create-project request looks like, and which
//! failures are worth retrying. The protocol client, destination adapter and
//! deletion job are written once against [`Dialect`] and pick up a concrete
//! strategy at construction time.

use crate::destination::Visibility;
use crate::error::{Result, RegistryError, RetryPolicy};
use crate::repository::RepositoryPath;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use url::Url;


/// Upload-session locator returned by the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSession {
    /// `Location` header value, absolute or relative to the endpoint.
    pub location: Option<String>,
    /// `Docker-Upload-UUID` header value.
    pub uuid: Option<String>,
}

impl UploadSession {
    /// Reads the session locator from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };
        // Header lookup is case-insensitive, which covers both
        // Docker-Upload-UUID and Docker-Upload-Uuid spellings.
        Self {
            location: get("Location"),
            uuid: get("Docker-Upload-UUID"),
        }
    }

    /// Returns a session that prefers the values present in `newer`.
    pub fn updated_with(self, newer: UploadSession) -> Self {
        Self {
            location: newer.location.or(self.location),
            uuid: newer.uuid.or(self.uuid),
        }
    }
}

/// How a destination adapter authenticates create-project requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectAuth {
    /// HTTP basic auth with the destination credentials.
    Basic,
    /// A token from the identity service, sent in the named header.
    IdentityToken { header: String },
}

/// A create-project request shaped for one dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRequest {
    pub url: String,
    pub content_type: &'static str,
    pub body: serde_json::Value,
}

/// URL and policy strategy for one registry flavour.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrites a repository name at client construction time.
    fn repository_name(&self, name: &str) -> String {
        name.trim().to_string()
    }

    fn tags_url(&self, base: &str, repository: &str) -> String {
        v2_url(base, repository, &["tags", "list"])
    }

    fn manifest_url(&self, base: &str, repository: &str, reference: &str) -> String {
        v2_url(base, repository, &["manifests", reference])
    }

    fn blob_url(&self, base: &str, repository: &str, digest: &str) -> String {
        v2_url(base, repository, &["blobs", digest])
    }

    /// Collection endpoint that initiates a blob upload.
    fn upload_url(&self, base: &str, repository: &str) -> String {
        v2_url(base, repository, &["blobs", "uploads", ""])
    }

    /// URL addressing an open upload session.
    fn session_url(&self, base: &str, repository: &str, session: &UploadSession) -> Result<Url>;

    /// Deletion target for a whole repository (`tag == None`) or a single tag.
    fn deletion_url(&self, base: &str, path: &RepositoryPath, tag: Option<&str>) -> String;

    /// Builds the create-project request.
    fn project_request(&self, base: &str, name: &str, visibility: Visibility) -> ProjectRequest;

    fn project_auth(&self) -> ProjectAuth {
        ProjectAuth::Basic
    }

    /// Whether 409 on create-project counts as success.
    fn conflict_is_success(&self) -> bool {
        false
    }

    /// Retry classifier used by jobs running against this dialect.
    fn retry_policy(&self) -> RetryPolicy;
}

/// Appends percent-encoded path segments to `root`, so a tag or reference
/// holding `#`, `?` or `/` stays inside its own segment.
fn with_segments<'a, I>(root: &str, segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let segments: Vec<&str> = segments.into_iter().collect();
    if let Ok(mut url) = Url::parse(root) {
        let extended = match url.path_segments_mut() {
            Ok(mut path) => {
                path.pop_if_empty().extend(&segments);
                true
            }
            Err(()) => false,
        };
        if extended {
            return url.to_string();
        }
    }
    format!("{}/{}", root.trim_end_matches('/'), segments.join("/"))
}

/// `{base}/v2/{repository}/{tail...}`; repository components keep their slashes.
fn v2_url(base: &str, repository: &str, tail: &[&str]) -> String {
    let segments = std::iter::once("v2")
        .chain(repository.split('/'))
        .chain(tail.iter().copied());
    with_segments(base, segments)
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url)
        .map_err(|e| RegistryError::validation_with_source(format!("Invalid URL: {}", url), e))
}

/// Generic distribution-compliant registry with a Harbor-style management API.
#[derive(Debug, Clone, Default)]
pub struct StandardDialect {
    pub retry_policy: RetryPolicy,
}

impl Dialect for StandardDialect {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn session_url(&self, base: &str, _repository: &str, session: &UploadSession) -> Result<Url> {
        let location = session.location.as_deref().ok_or_else(|| {
            RegistryError::validation("Upload session response missing Location header")
        })?;
        // Location may be absolute or relative to the endpoint.
        parse_url(base)?.join(location).map_err(|e| {
            RegistryError::validation_with_source(
                format!("Invalid upload Location '{}'", location),
                e,
            )
        })
    }

    fn deletion_url(&self, base: &str, path: &RepositoryPath, tag: Option<&str>) -> String {
        let segments = ["api", "repositories", path.namespace(), path.name(), "tags"];
        with_segments(base, segments.into_iter().chain(tag))
    }

    fn project_request(&self, base: &str, name: &str, visibility: Visibility) -> ProjectRequest {
        ProjectRequest {
            url: format!("{}/api/projects/", base),
            content_type: "application/json",
            body: json!({
                "project_name": name,
                "public": visibility.as_flag(),
            }),
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }
}

/// Registry whose repositories live under prefixed names inside namespaces,
/// managed through a separate API guarded by an identity token.
#[derive(Debug, Clone)]
pub struct NamespaceDialect {
    /// Literal prefix added to every repository and namespace name.
    pub prefix: String,
    /// Tenant domain used in deletion paths.
    pub domain: String,
    /// Management API root, e.g. `dockyard/v2`.
    pub api_prefix: String,
    /// Header carrying the identity token.
    pub token_header: String,
    pub retry_policy: RetryPolicy,
}

impl Default for NamespaceDialect {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            domain: String::new(),
            api_prefix: "dockyard/v2".to_string(),
            token_header: "X-Auth-Token".to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl NamespaceDialect {
    fn api_root(&self, base: &str) -> String {
        format!("{}/{}", base, self.api_prefix.trim_matches('/'))
    }
}

impl Dialect for NamespaceDialect {
    fn name(&self) -> &'static str {
        "namespace"
    }

    fn repository_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name.trim())
    }

    fn session_url(&self, base: &str, repository: &str, session: &UploadSession) -> Result<Url> {
        let uuid = session.uuid.as_deref().ok_or_else(|| {
            RegistryError::validation("Upload session response missing Docker-Upload-UUID header")
        })?;
        parse_url(&v2_url(base, repository, &["blobs", "uploads", uuid]))
    }

    fn deletion_url(&self, base: &str, path: &RepositoryPath, tag: Option<&str>) -> String {
        let repository = format!("{}{}", self.prefix, path.name());
        let segments = [
            "domains",
            self.domain.as_str(),
            "namespaces",
            path.namespace(),
            "repositories",
            repository.as_str(),
            "tags",
        ];
        with_segments(&self.api_root(base), segments.into_iter().chain(tag))
    }

    fn project_request(&self, base: &str, name: &str, _visibility: Visibility) -> ProjectRequest {
        ProjectRequest {
            url: format!("{}/namespaces", self.api_root(base)),
            content_type: "application/json;charset=utf8",
            body: json!({ "namespace": format!("{}{}", self.prefix, name) }),
        }
    }

    fn project_auth(&self) -> ProjectAuth {
        ProjectAuth::IdentityToken {
            header: self.token_header.clone(),
        }
    }

    fn conflict_is_success(&self) -> bool {
        true
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }
}

/// Names the dialects available from configuration and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Standard,
    Namespace,
}

impl FromStr for DialectKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "namespace" => Ok(Self::Namespace),
            other => Err(RegistryError::validation(format!(
                "Unknown dialect '{}': expected 'standard' or 'namespace'",
                other
            ))),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Namespace => f.write_str("namespace"),
        }
    }
}
