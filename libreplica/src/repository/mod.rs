//! The repository capability interface.
//!
//! [`RepositoryClient`] is the contract every registry dialect implements:
//! one method per remote primitive, each a single request/response exchange
//! with no implicit retry. Replication flows hold a `Box<dyn RepositoryClient>`
//! and never see which dialect is behind it.

use crate::client::{BlobReader, PulledManifest};
use crate::error::{Result, RegistryError};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// Remote primitives of a single repository.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Repository name as sent on the wire (after any dialect rewriting).
    fn name(&self) -> &str;

    /// Lists tags in registry-defined order.
    async fn list_tags(&self) -> Result<Vec<String>>;

    /// Resolves a tag or digest. Returns `None` when the registry answers 404.
    async fn manifest_exists(&self, reference: &str) -> Result<Option<String>>;

    /// Pulls a manifest, offering `accept` media types in order of preference.
    async fn pull_manifest(&self, reference: &str, accept: &[&str]) -> Result<PulledManifest>;

    /// Pushes the exact manifest bytes and returns the stored digest.
    async fn push_manifest(&self, reference: &str, media_type: &str, payload: Bytes)
    -> Result<String>;

    /// Deletes a manifest by digest.
    async fn delete_manifest(&self, digest: &str) -> Result<()>;

    /// Resolves `tag` and deletes the manifest it points at.
    ///
    /// An unknown tag is reported as a 404 status error.
    async fn delete_tag(&self, tag: &str) -> Result<()> {
        match self.manifest_exists(tag).await? {
            Some(digest) => self.delete_manifest(&digest).await,
            None => Err(RegistryError::status(
                404,
                format!("{}:{}", self.name(), tag),
                "",
            )),
        }
    }

    /// Returns true when the blob exists.
    async fn blob_exists(&self, digest: &str) -> Result<bool>;

    /// Opens a blob for reading. The caller owns the returned stream.
    async fn pull_blob(&self, digest: &str) -> Result<BlobReader>;

    /// Uploads a blob through the initiate/transfer/commit sequence.
    async fn push_blob(&self, digest: &str, size: u64, data: Bytes) -> Result<()>;

    /// Deletes a blob by digest.
    async fn delete_blob(&self, digest: &str) -> Result<()>;
}

/// A `namespace/repository` path as used by replication jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPath {
    namespace: String,
    name: String,
}

impl FromStr for RepositoryPath {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(name), None) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(RegistryError::validation(format!(
                "Invalid repository path '{}': expected 'namespace/repository'",
                s
            ))),
        }
    }
}

impl fmt::Display for RepositoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl RepositoryPath {
    /// Returns the namespace (project) part.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the repository part.
    pub fn name(&self) -> &str {
        &self.name
    }
}
