//! High-level API for replication work.
//!
//! [`Replicator`] holds the loaded configuration and, when an identity
//! service is configured, the one [`TokenManager`] shared by every
//! destination adapter it hands out. Everything else (repository clients,
//! destinations, deletion jobs) is built per call and owned by the caller.
//!
//! # Examples
//!
//! ```no_run
//! use libreplica::{Credentials, DeletionTarget, DialectKind, Job, Replicator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let replicator = Replicator::builder().build()?;
//!
//!     let mut job = replicator.deletion_job(
//!         DialectKind::Standard,
//!         DeletionTarget {
//!             repository: "team/app".to_string(),
//!             tags: vec!["v1".to_string()],
//!             destination: "https://harbor.example.com".to_string(),
//!             credentials: Credentials::basic("admin", "Harbor12345"),
//!             insecure: false,
//!         },
//!     )?;
//!
//!     let state = job.enter().await?;
//!     println!("{}", state);
//!     job.exit().await?;
//!     Ok(())
//! }
//! ```

use crate::auth::{Credentials, TokenManager};
use crate::client::{ClientConfig, DistributionClient, Endpoint};
use crate::config::Config;
use crate::destination::{Destination, ProjectRegistry, Visibility};
use crate::dialect::{Dialect, DialectKind};
use crate::error::Result;
use crate::job::{DeletionJob, DeletionTarget};
use crate::repository::RepositoryClient;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(test)]
#[path = "replicator_tests.rs"]
mod tests;

/// Entry point that builds clients, destinations and jobs from one configuration.
#[derive(Debug)]
pub struct Replicator {
    config: Config,
    client_config: ClientConfig,
    tokens: Option<Arc<TokenManager>>,
}

impl Replicator {
    /// Creates a replicator from a configuration.
    pub fn new(config: Config) -> Result<Self> {
        Self::builder().with_config(config).build()
    }

    /// Create a builder for advanced configuration.
    pub fn builder() -> ReplicatorBuilder {
        ReplicatorBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// HTTP settings used for every endpoint this replicator builds.
    pub fn client_config(&self) -> &ClientConfig {
        &self.client_config
    }

    /// The shared identity token manager, if one is configured.
    pub fn token_manager(&self) -> Option<&Arc<TokenManager>> {
        self.tokens.as_ref()
    }

    /// Dialect strategy for `kind`, as configured.
    pub fn dialect(&self, kind: DialectKind) -> Arc<dyn Dialect> {
        self.config.dialect(kind)
    }

    /// Builds a repository client for `repository` on the registry at `url`.
    pub fn repository(
        &self,
        kind: DialectKind,
        url: &str,
        repository: &str,
        credentials: Credentials,
    ) -> Result<Box<dyn RepositoryClient>> {
        let endpoint = Endpoint::new(url, url, credentials, &self.client_config)?;
        Ok(Box::new(DistributionClient::new(
            endpoint,
            repository,
            self.dialect(kind),
        )))
    }

    /// Builds a create-project adapter for the registry at `url`.
    pub fn destination(
        &self,
        kind: DialectKind,
        url: &str,
        credentials: Credentials,
    ) -> Result<Destination> {
        let endpoint = Endpoint::new("destination", url, credentials, &self.client_config)?;
        Destination::new(endpoint, self.dialect(kind), self.tokens.clone())
    }

    /// Builds a deletion job. The `network.insecure` setting applies on top
    /// of the target's own flag.
    pub fn deletion_job(&self, kind: DialectKind, target: DeletionTarget) -> Result<DeletionJob> {
        let target = DeletionTarget {
            insecure: self.client_config.insecure || target.insecure,
            ..target
        };
        DeletionJob::new(target, self.dialect(kind), &self.client_config)
    }

    /// Lists the tags of `repository` on the registry at `url`.
    pub async fn list_tags(
        &self,
        kind: DialectKind,
        url: &str,
        repository: &str,
        credentials: Credentials,
    ) -> Result<Vec<String>> {
        self.repository(kind, url, repository, credentials)?
            .list_tags()
            .await
    }

    /// Creates a project on the registry at `url`.
    pub async fn create_project(
        &self,
        kind: DialectKind,
        url: &str,
        credentials: Credentials,
        name: &str,
        visibility: Visibility,
    ) -> Result<()> {
        self.destination(kind, url, credentials)?
            .create_project(name, visibility)
            .await
    }
}

/// Builder for creating a [`Replicator`] with custom configuration.
///
/// # Examples
///
/// ```no_run
/// use libreplica::Replicator;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let replicator = Replicator::builder()
///     .with_config_file("/etc/replica/config.yaml")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ReplicatorBuilder {
    config: Option<Config>,
    config_path: Option<PathBuf>,
    tokens: Option<Arc<TokenManager>>,
}

impl ReplicatorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration directly. Takes precedence over a config file.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Load configuration from a YAML file at build time.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Share an existing token manager instead of building one from the
    /// `identity` section.
    pub fn with_token_manager(mut self, tokens: Arc<TokenManager>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Build the `Replicator` instance.
    pub fn build(self) -> Result<Replicator> {
        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, path) => Config::load(path.as_deref())?,
        };
        let client_config = config.client_config();

        let tokens = match (self.tokens, &config.identity) {
            (Some(tokens), _) => Some(tokens),
            (None, Some(identity)) => Some(Arc::new(TokenManager::new(
                identity.clone(),
                client_config.build_http_client()?,
            ))),
            (None, None) => None,
        };

        Ok(Replicator {
            config,
            client_config,
            tokens,
        })
    }
}
