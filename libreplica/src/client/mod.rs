//! HTTP client for the distribution registry API.
//!
//! This module provides [`DistributionClient`], the concrete
//! [`RepositoryClient`] built on reqwest. URL shapes and upload-session
//! addressing come from the [`Dialect`] it is constructed with, so one
//! implementation of the HTTP plumbing serves every registry flavour.
//!
//! Every response body is read to the end before the response is dropped,
//! except for a successful blob pull, where the open body is handed to the
//! caller as a [`BlobReader`].

use crate::auth::Credentials;
use crate::dialect::{Dialect, UploadSession};
use crate::digest::Digest;
use crate::error::{Result, RegistryError};
use crate::oci;
use crate::repository::RepositoryClient;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;


/// Response from the tags list API endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    /// List of tag names; some registries send `null` for an empty repository
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libreplica::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(60)
///     .with_max_idle_per_host(20)
///     .with_insecure(true);
/// assert!(config.insecure);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Skip TLS certificate verification (default: false)
    pub insecure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
            insecure: false,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }

    /// Enables or disables TLS certificate verification.
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Builds a reqwest client with these settings.
    pub fn build_http_client(&self) -> Result<ReqwestClient> {
        ReqwestClient::builder()
            .timeout(Duration::from_secs(self.timeout_seconds))
            .pool_max_idle_per_host(self.max_idle_per_host)
            .danger_accept_invalid_certs(self.insecure)
            .build()
            .map_err(|e| RegistryError::network_with_source("Failed to create HTTP client", e))
    }
}

/// A registry endpoint: name, base URL, and the HTTP client used to reach it.
///
/// The client carries the TLS settings; credentials are attached to every
/// request built through [`Endpoint::request`].
#[derive(Debug, Clone)]
pub struct Endpoint {
    name: String,
    url: String,
    http_client: ReqwestClient,
    credentials: Credentials,
}

impl Endpoint {
    /// Creates an endpoint with its own HTTP client.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreplica::auth::Credentials;
    /// use libreplica::client::{ClientConfig, Endpoint};
    ///
    /// let endpoint = Endpoint::new(
    ///     "primary",
    ///     "localhost:5000/",
    ///     Credentials::anonymous(),
    ///     &ClientConfig::default(),
    /// )
    /// .unwrap();
    /// assert_eq!(endpoint.url(), "http://localhost:5000");
    /// ```
    pub fn new(
        name: impl Into<String>,
        url: &str,
        credentials: Credentials,
        config: &ClientConfig,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            url: normalize_url(url)?,
            http_client: config.build_http_client()?,
            credentials,
        })
    }

    /// Returns the endpoint name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the normalized base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Starts an authenticated request.
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.credentials.apply(self.http_client.request(method, url))
    }

    /// Starts a request without the endpoint credentials.
    pub(crate) fn bare_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client.request(method, url)
    }

    /// Sends a request, translating transport failures.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| translate_reqwest_error(e, &self.url))
    }
}

/// Normalizes a registry URL by ensuring it has a scheme and removing trailing slashes.
pub(crate) fn normalize_url(url: &str) -> Result<String> {
    let url = url.trim();

    if url.is_empty() {
        return Err(RegistryError::validation("Registry URL cannot be empty"));
    }

    let url = if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("http://{}", url)
    } else {
        url.to_string()
    };

    Ok(url.trim_end_matches('/').to_string())
}

/// Translates a reqwest error into a RegistryError.
///
/// Only failures where the request may not have reached the registry
/// (connect, timeout, send, body I/O) become `Network`. Requests that could
/// never be built or answers that could not be read are `Validation`.
pub(crate) fn translate_reqwest_error(error: reqwest::Error, registry_url: &str) -> RegistryError {
    if error.is_builder() {
        RegistryError::validation_with_source(
            format!("Invalid request for {}", registry_url),
            error,
        )
    } else if error.is_decode() {
        RegistryError::validation_with_source(
            format!("Undecodable response from {}", registry_url),
            error,
        )
    } else if error.is_timeout() {
        RegistryError::network_with_source(format!("Request to {} timed out", registry_url), error)
    } else if error.is_connect() {
        RegistryError::network_with_source(
            format!("Failed to connect to registry at {}", registry_url),
            error,
        )
    } else if error.is_request() || error.is_body() {
        RegistryError::network_with_source(
            format!("Failed to send request to {}", registry_url),
            error,
        )
    } else {
        RegistryError::validation_with_source(
            format!("Unexpected response handling for {}", registry_url),
            error,
        )
    }
}

/// Reads the whole body and turns the response into a status error.
pub(crate) async fn status_error(response: Response) -> RegistryError {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("(unable to read response body)"));
    RegistryError::status(status, url, body)
}

/// Reads and discards the rest of the body.
pub(crate) async fn drain(response: Response) {
    if let Err(e) = response.bytes().await {
        tracing::debug!("failed to drain response body: {}", e);
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|s| s.to_string())
}

/// Extracts the next page URL from the Link header.
///
/// Format: `</v2/team/app/tags/list?n=100&last=v99>; rel="next"`
/// Resolves a `Link` target, absolute or relative, against the page it came from.
fn resolve_link(current: &str, link: &str) -> Result<String> {
    Url::parse(current)
        .and_then(|page| page.join(link))
        .map(String::from)
        .map_err(|e| {
            RegistryError::validation_with_source(format!("Invalid pagination link '{}'", link), e)
        })
}

fn extract_next_link(headers: &HeaderMap) -> Option<String> {
    let link_str = headers.get(reqwest::header::LINK)?.to_str().ok()?;

    for link_part in link_str.split(',') {
        let link_part = link_part.trim();
        if (link_part.contains("rel=\"next\"") || link_part.contains("rel='next'"))
            && let Some(start) = link_part.find('<')
            && let Some(end) = link_part.find('>')
        {
            return Some(link_part[start + 1..end].to_string());
        }
    }

    None
}

/// A manifest as returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulledManifest {
    /// `Docker-Content-Digest`, or the sha256 of the payload when the header is absent
    pub digest: String,
    /// `Content-Type` of the response
    pub media_type: String,
    /// Raw manifest bytes
    pub payload: Bytes,
}

/// An open blob download.
///
/// Holds the response body; dropping the reader releases the connection.
#[derive(Debug)]
pub struct BlobReader {
    size: u64,
    response: Response,
}

impl BlobReader {
    /// Size announced by `Content-Length`.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reads the next chunk, `None` at end of stream.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        self.response
            .chunk()
            .await
            .map_err(|e| RegistryError::network_with_source("Failed to read blob chunk", e))
    }

    /// Reads the rest of the blob into memory.
    pub async fn bytes(self) -> Result<Bytes> {
        self.response
            .bytes()
            .await
            .map_err(|e| RegistryError::network_with_source("Failed to read blob response", e))
    }

    /// Reads the rest of the blob and checks it against `digest`.
    pub async fn verified(self, digest: &Digest) -> Result<Bytes> {
        let data = self.bytes().await?;
        if !digest.matches(&data)? {
            return Err(RegistryError::validation(format!(
                "Blob digest mismatch: expected {}, computed {}",
                digest,
                Digest::sha256_of(&data)?
            )));
        }
        Ok(data)
    }
}

/// Repository client speaking the distribution HTTP API.
#[derive(Debug, Clone)]
pub struct DistributionClient {
    endpoint: Endpoint,
    repository: String,
    dialect: Arc<dyn Dialect>,
}

impl DistributionClient {
    /// Creates a client for `repository` on `endpoint`.
    ///
    /// The repository name is rewritten by the dialect once, here.
    pub fn new(endpoint: Endpoint, repository: &str, dialect: Arc<dyn Dialect>) -> Self {
        let repository = dialect.repository_name(repository);
        Self {
            endpoint,
            repository,
            dialect,
        }
    }

    /// Returns the endpoint this client talks to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the dialect strategy in use.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    fn base(&self) -> &str {
        self.endpoint.url()
    }

    async fn initiate_upload(&self) -> Result<UploadSession> {
        let url = self.dialect.upload_url(self.base(), &self.repository);
        tracing::debug!(%url, "initiating blob upload");

        let response = self
            .endpoint
            .send(
                self.endpoint
                    .request(Method::POST, &url)
                    .header(CONTENT_LENGTH, 0)
                    .body(Vec::<u8>::new()),
            )
            .await?;

        if response.status() != StatusCode::ACCEPTED {
            return Err(status_error(response).await);
        }

        let session = UploadSession::from_headers(response.headers());
        drain(response).await;
        Ok(session)
    }

    async fn transfer(&self, session: UploadSession, data: Bytes) -> Result<UploadSession> {
        let url = self
            .dialect
            .session_url(self.base(), &self.repository, &session)?;
        tracing::debug!(%url, size = data.len(), "transferring blob");

        let response = self
            .endpoint
            .send(
                self.endpoint
                    .request(Method::PATCH, url.as_str())
                    .header(CONTENT_TYPE, "application/octet-stream")
                    .body(data),
            )
            .await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => {
                let updated = session.updated_with(UploadSession::from_headers(response.headers()));
                drain(response).await;
                Ok(updated)
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn commit(&self, session: &UploadSession, digest: &str) -> Result<()> {
        let mut url = self
            .dialect
            .session_url(self.base(), &self.repository, session)?;
        url.query_pairs_mut().append_pair("digest", digest);
        tracing::debug!(%url, "committing blob upload");

        let response = self
            .endpoint
            .send(
                self.endpoint
                    .request(Method::PUT, url.as_str())
                    .header(CONTENT_LENGTH, 0)
                    .body(Vec::<u8>::new()),
            )
            .await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => {
                drain(response).await;
                Ok(())
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn delete(&self, url: &str) -> Result<()> {
        tracing::debug!(%url, "deleting");
        let response = self
            .endpoint
            .send(self.endpoint.request(Method::DELETE, url))
            .await?;

        if response.status() == StatusCode::ACCEPTED {
            drain(response).await;
            return Ok(());
        }
        Err(status_error(response).await)
    }
}

#[async_trait]
impl RepositoryClient for DistributionClient {
    fn name(&self) -> &str {
        &self.repository
    }

    async fn list_tags(&self) -> Result<Vec<String>> {
        let mut all_tags = Vec::new();
        let mut url = self.dialect.tags_url(self.base(), &self.repository);

        loop {
            let response = self
                .endpoint
                .send(self.endpoint.request(Method::GET, &url))
                .await?;

            if response.status() != StatusCode::OK {
                return Err(status_error(response).await);
            }

            let next_path = extract_next_link(response.headers());

            let tags: TagsResponse = response.json().await.map_err(|e| {
                RegistryError::validation_with_source("Failed to parse tags response", e)
            })?;
            all_tags.extend(tags.tags.unwrap_or_default());

            match next_path {
                Some(link) => url = resolve_link(&url, &link)?,
                None => break,
            }
        }

        Ok(all_tags)
    }

    async fn manifest_exists(&self, reference: &str) -> Result<Option<String>> {
        let url = self
            .dialect
            .manifest_url(self.base(), &self.repository, reference);

        let response = self
            .endpoint
            .send(
                self.endpoint
                    .request(Method::GET, &url)
                    .header(ACCEPT, oci::manifest_media_types().join(", ")),
            )
            .await?;

        match response.status() {
            StatusCode::OK => {
                let digest = header_value(response.headers(), "Docker-Content-Digest");
                drain(response).await;
                digest.map(Some).ok_or_else(|| {
                    RegistryError::validation("Response missing Docker-Content-Digest header")
                })
            }
            StatusCode::NOT_FOUND => {
                drain(response).await;
                Ok(None)
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn pull_manifest(&self, reference: &str, accept: &[&str]) -> Result<PulledManifest> {
        let url = self
            .dialect
            .manifest_url(self.base(), &self.repository, reference);

        let mut request = self.endpoint.request(Method::GET, &url);
        if !accept.is_empty() {
            request = request.header(ACCEPT, accept.join(", "));
        }
        let response = self.endpoint.send(request).await?;

        if response.status() != StatusCode::OK {
            return Err(status_error(response).await);
        }

        let digest = header_value(response.headers(), "Docker-Content-Digest");
        let media_type = header_value(response.headers(), CONTENT_TYPE.as_str()).unwrap_or_default();
        let payload = response
            .bytes()
            .await
            .map_err(|e| RegistryError::network_with_source("Failed to read manifest response", e))?;

        let digest = match digest {
            Some(digest) => digest,
            None => Digest::sha256_of(&payload)?.to_string(),
        };

        Ok(PulledManifest {
            digest,
            media_type,
            payload,
        })
    }

    async fn push_manifest(
        &self,
        reference: &str,
        media_type: &str,
        payload: Bytes,
    ) -> Result<String> {
        let url = self
            .dialect
            .manifest_url(self.base(), &self.repository, reference);
        tracing::debug!(%url, media_type, "pushing manifest");

        let response = self
            .endpoint
            .send(
                self.endpoint
                    .request(Method::PUT, &url)
                    .header(CONTENT_TYPE, media_type)
                    .body(payload.clone()),
            )
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(status_error(response).await);
        }

        let digest = header_value(response.headers(), "Docker-Content-Digest");
        drain(response).await;

        match digest {
            Some(digest) => Ok(digest),
            None => Ok(Digest::sha256_of(&payload)?.to_string()),
        }
    }

    async fn delete_manifest(&self, digest: &str) -> Result<()> {
        let url = self
            .dialect
            .manifest_url(self.base(), &self.repository, digest);
        self.delete(&url).await
    }

    async fn blob_exists(&self, digest: &str) -> Result<bool> {
        let url = self.dialect.blob_url(self.base(), &self.repository, digest);

        let response = self
            .endpoint
            .send(self.endpoint.request(Method::GET, &url))
            .await?;

        match response.status() {
            // The blob body is not drained; dropping the response discards the
            // connection instead of downloading the whole layer.
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => {
                drain(response).await;
                Ok(false)
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn pull_blob(&self, digest: &str) -> Result<BlobReader> {
        let url = self.dialect.blob_url(self.base(), &self.repository, digest);

        let response = self
            .endpoint
            .send(self.endpoint.request(Method::GET, &url))
            .await?;

        if response.status() != StatusCode::OK {
            return Err(status_error(response).await);
        }

        let length = header_value(response.headers(), CONTENT_LENGTH.as_str()).ok_or_else(|| {
            RegistryError::validation("Blob response missing Content-Length header")
        })?;
        let size = u64::from_str(&length).map_err(|e| {
            RegistryError::validation_with_source(format!("Invalid Content-Length '{}'", length), e)
        })?;

        Ok(BlobReader { size, response })
    }

    async fn push_blob(&self, digest: &str, size: u64, data: Bytes) -> Result<()> {
        if data.len() as u64 != size {
            return Err(RegistryError::validation(format!(
                "Blob {} announced {} bytes but {} were supplied",
                digest,
                size,
                data.len()
            )));
        }

        let session = self.initiate_upload().await?;
        let session = self.transfer(session, data).await?;
        self.commit(&session, digest).await?;

        tracing::debug!(repository = %self.repository, digest, size, "blob pushed");
        Ok(())
    }

    async fn delete_blob(&self, digest: &str) -> Result<()> {
        let url = self.dialect.blob_url(self.base(), &self.repository, digest);
        self.delete(&url).await
    }
}
