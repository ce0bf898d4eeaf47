//! Application context that holds resolved configuration
//!
//! The configuration file is resolved in this order:
//! 1. `--config` flag (or `REPLICA_CONFIG`, which clap folds into the flag)
//! 2. `<config dir>/replica/config.yaml`, when it exists
//! 3. Built-in defaults
//!
//! Once built, the context is passed as read-only throughout the application.

use libreplica::{Config, Replicator};
use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

/// How chatty the command should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl VerbosityLevel {
    /// Maps the number of `-v` flags to a level.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Default tracing filter for this level, used when `RUST_LOG` is unset.
    pub fn filter(self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Application context with resolved configuration and runtime state
#[derive(Debug)]
pub struct AppContext {
    pub replicator: Replicator,
    /// File the configuration was read from, if any
    pub config_path: Option<PathBuf>,
}

impl AppContext {
    /// Loads the configuration and builds the replicator.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn build(explicit: Option<PathBuf>) -> Result<Self, String> {
        let config_path = resolve_config_path(explicit, default_config_path().as_deref());
        let config = Config::load(config_path.as_deref())
            .map_err(|e| format!("Failed to load configuration: {}", e))?;
        tracing::debug!(path = ?config_path, "configuration loaded");

        let replicator = Replicator::new(config).map_err(|e| e.to_string())?;

        Ok(Self {
            replicator,
            config_path,
        })
    }

    #[cfg(test)]
    pub fn with_config(config: Config) -> Self {
        Self {
            replicator: Replicator::new(config).unwrap(),
            config_path: None,
        }
    }
}

/// Picks the configuration file to load.
pub fn resolve_config_path(explicit: Option<PathBuf>, default: Option<&Path>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    default.filter(|p| p.exists()).map(Path::to_path_buf)
}

/// `~/.config/replica/config.yaml` on Linux, the platform equivalent elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("replica").join("config.yaml"))
}
