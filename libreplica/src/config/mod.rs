//! Replication configuration.
//!
//! Settings are loaded from YAML with the `config` crate, layered over
//! serde defaults, so a partial file (or none at all) is always valid.
//!
//! ```yaml
//! network:
//!   timeout: 60
//!   insecure: false
//! namespace:
//!   prefix: "hw-"
//!   domain: acme
//!   retry_server_errors: true
//! identity:
//!   endpoint: https://iam.example.com/v3/auth/tokens
//!   user: replicator
//!   password: secret
//!   domain: acme
//!   project: cn-north-1
//! ```

use crate::auth::IdentityConfig;
use crate::client::ClientConfig;
use crate::dialect::{Dialect, DialectKind, NamespaceDialect, StandardDialect};
use crate::error::{Result, RegistryError, RetryPolicy};
use config::{Config as ConfigRs, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Root configuration structure.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub standard: Standard,
    #[serde(default)]
    pub namespace: Namespace,
    #[serde(default)]
    pub identity: Option<IdentityConfig>,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(Self::defaults()?)
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder, None)
    }

    /// Loads a `Config` from an optional file path.
    ///
    /// With no path the defaults are returned. A given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigRs::builder().add_source(Self::defaults()?);

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).format(FileFormat::Yaml).required(true));
        }

        Self::from_builder(builder, path)
    }

    fn defaults() -> Result<ConfigRs> {
        ConfigRs::try_from(&Config::default()).map_err(|e| {
            RegistryError::config_with_source("Failed to build default configuration", None, e)
        })
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                RegistryError::config_with_source(
                    "Failed to deserialize configuration".to_string(),
                    path.map(|p| p.display().to_string()),
                    e,
                )
            })
    }

    /// HTTP client settings derived from the `network` section.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_timeout(self.network.timeout)
            .with_max_idle_per_host(self.network.max_idle_per_host)
            .with_insecure(self.network.insecure)
    }

    /// Builds the dialect strategy for `kind` from its section.
    pub fn dialect(&self, kind: DialectKind) -> Arc<dyn Dialect> {
        match kind {
            DialectKind::Standard => Arc::new(StandardDialect {
                retry_policy: RetryPolicy {
                    retry_server_errors: self.standard.retry_server_errors,
                },
            }),
            DialectKind::Namespace => Arc::new(NamespaceDialect {
                prefix: self.namespace.prefix.clone(),
                domain: self.namespace.domain.clone(),
                api_prefix: self.namespace.api_prefix.clone(),
                token_header: self.namespace.token_header.clone(),
                retry_policy: RetryPolicy {
                    retry_server_errors: self.namespace.retry_server_errors,
                },
            }),
        }
    }
}

/// Network settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Request timeout in seconds.
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,

    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,

    #[serde(default)]
    pub insecure: bool,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
            max_idle_per_host: default_max_idle_per_host(),
            insecure: false,
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

fn default_max_idle_per_host() -> usize {
    10
}

/// Standard dialect settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Standard {
    #[serde(default)]
    pub retry_server_errors: bool,
}

/// Namespace dialect settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix added to repository and namespace names.
    #[serde(default)]
    pub prefix: String,

    /// Tenant domain used in deletion paths.
    #[serde(default)]
    pub domain: String,

    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    #[serde(default = "default_token_header")]
    pub token_header: String,

    #[serde(default)]
    pub retry_server_errors: bool,
}

impl Default for Namespace {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            domain: String::new(),
            api_prefix: default_api_prefix(),
            token_header: default_token_header(),
            retry_server_errors: false,
        }
    }
}

fn default_api_prefix() -> String {
    "dockyard/v2".to_string()
}

fn default_token_header() -> String {
    "X-Auth-Token".to_string()
}
