//! Deletion job: removes a repository or a list of its tags from a
//! destination registry.

use super::{Job, JobState};
use crate::auth::Credentials;
use crate::client::{ClientConfig, Endpoint, drain, status_error};
use crate::dialect::Dialect;
use crate::error::{Result, RegistryError, RetryPolicy};
use crate::repository::RepositoryPath;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use tracing::Instrument;

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;

/// What to delete and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionTarget {
    /// `namespace/repo`
    pub repository: String,
    /// Tags to delete; empty deletes the whole repository.
    pub tags: Vec<String>,
    /// Base URL of the destination registry.
    pub destination: String,
    pub credentials: Credentials,
    /// Skip TLS certificate verification.
    pub insecure: bool,
}

/// Outcome of the last [`DeletionJob::enter`].
///
/// Entries are tag names, or the repository path for a whole-repository
/// deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Removed by this run.
    pub deleted: Vec<String>,
    /// Already absent on the destination.
    pub missing: Vec<String>,
}

/// Deletes a repository, or some of its tags, on a destination registry.
///
/// Tags are deleted one after another in the order given. A tag that is
/// already gone is logged and skipped; any other failure stops the batch
/// without undoing earlier deletions. Entering the job again after a
/// partial run is safe.
#[derive(Debug)]
pub struct DeletionJob {
    repository: String,
    tags: Vec<String>,
    endpoint: Endpoint,
    dialect: Arc<dyn Dialect>,
    retry_policy: RetryPolicy,
    report: DeletionReport,
}

impl DeletionJob {
    /// Creates a job. The retry policy defaults to the dialect's.
    pub fn new(target: DeletionTarget, dialect: Arc<dyn Dialect>, config: &ClientConfig) -> Result<Self> {
        let config = config.clone().with_insecure(target.insecure);
        let endpoint = Endpoint::new("destination", &target.destination, target.credentials, &config)?;

        tracing::info!(
            repository = %target.repository,
            tags = ?target.tags,
            destination = %endpoint.url(),
            insecure = target.insecure,
            dialect = dialect.name(),
            "deletion job initialized"
        );

        Ok(Self {
            repository: target.repository,
            tags: target.tags,
            endpoint,
            retry_policy: dialect.retry_policy(),
            dialect,
            report: DeletionReport::default(),
        })
    }

    /// Overrides the retry classifier.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Report of the most recent run.
    pub fn report(&self) -> &DeletionReport {
        &self.report
    }

    fn failure(&self, tag: Option<&str>, source: RegistryError) -> RegistryError {
        RegistryError::deletion(&self.repository, tag, self.endpoint.url(), source)
    }

    async fn run(&mut self) -> Result<JobState> {
        let path: RepositoryPath = self
            .repository
            .parse()
            .map_err(|e| self.failure(None, e))?;
        let base = self.endpoint.url().to_string();

        if self.tags.is_empty() {
            let url = self.dialect.deletion_url(&base, &path, None);
            return match self.delete(&url).await {
                Ok(()) => {
                    tracing::info!("repository {} on {} has been deleted", self.repository, base);
                    self.report.deleted.push(self.repository.clone());
                    Ok(JobState::Finished)
                }
                Err(e) if e.is_not_found() => {
                    tracing::warn!("repository {} does not exist on {}", self.repository, base);
                    self.report.missing.push(self.repository.clone());
                    Ok(JobState::Finished)
                }
                Err(e) => Err(self.failure(None, e)),
            };
        }

        for tag in self.tags.clone() {
            let url = self.dialect.deletion_url(&base, &path, Some(&tag));
            match self.delete(&url).await {
                Ok(()) => {
                    tracing::info!("{}:{} on {} has been deleted", self.repository, tag, base);
                    self.report.deleted.push(tag);
                }
                Err(e) if e.is_not_found() => {
                    tracing::warn!("{}:{} does not exist on {}", self.repository, tag, base);
                    self.report.missing.push(tag);
                }
                Err(e) => return Err(self.failure(Some(&tag), e)),
            }
        }

        Ok(JobState::Finished)
    }

    async fn delete(&self, url: &str) -> Result<()> {
        tracing::debug!(%url, "sending delete request");
        let response = self
            .endpoint
            .send(self.endpoint.request(Method::DELETE, url))
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                drain(response).await;
                Ok(())
            }
            _ => Err(status_error(response).await),
        }
    }
}

#[async_trait]
impl Job for DeletionJob {
    async fn enter(&mut self) -> Result<JobState> {
        let span = tracing::info_span!(
            "deletion",
            repository = %self.repository,
            destination = %self.endpoint.url()
        );
        self.report = DeletionReport::default();

        match self.run().instrument(span.clone()).await {
            Ok(state) => Ok(state),
            Err(e) if self.retry_policy.is_retryable(&e) => {
                span.in_scope(|| tracing::info!(error = %e, "waiting for retrying"));
                Ok(JobState::Retrying)
            }
            Err(e) => {
                span.in_scope(|| tracing::error!("{}", e));
                Err(e)
            }
        }
    }

    async fn exit(&mut self) -> Result<()> {
        Ok(())
    }
}
