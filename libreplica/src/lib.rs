//! Replica - Registry Replication Library
//!
//! Replica implements the registry side of image replication: a client for
//! the distribution HTTP API (tags, manifests, blobs and the three-phase blob
//! upload), adapters that create projects on a destination registry, and
//! jobs that delete replicated repositories or tags with retry-aware
//! failure handling.
//!
//! # Quick Start
//!
//! ```no_run
//! use libreplica::{Credentials, DialectKind, Replicator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let replicator = Replicator::builder().build()?;
//!
//!     let tags = replicator
//!         .list_tags(
//!             DialectKind::Standard,
//!             "http://localhost:5000",
//!             "team/app",
//!             Credentials::anonymous(),
//!         )
//!         .await?;
//!     for tag in tags {
//!         println!("{}", tag);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Main Types
//!
//! - [`Replicator`] - Main entry point, built from a [`Config`]
//! - [`RepositoryClient`] - Per-repository registry operations
//! - [`Destination`] - Create-project adapter
//! - [`DeletionJob`] - Enter/exit job deleting repositories or tags
//! - [`RegistryError`] - Structured error with a [`ErrorKind`] classifier
//!
//! # Dialects
//!
//! Registry flavours differ in URL layout, authentication of management
//! calls, and how an existing project is reported. These differences live in
//! [`Dialect`] implementations chosen with [`DialectKind`]; the HTTP plumbing
//! is shared.

#![warn(clippy::all)]

/// Returns the libreplica crate version.
///
/// # Examples
///
/// ```
/// let version = libreplica::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

mod replicator;
pub use replicator::{Replicator, ReplicatorBuilder};

pub use auth::{Credentials, TokenManager};
pub use client::{ClientConfig, DistributionClient, Endpoint};
pub use config::Config;
pub use destination::{Destination, ProjectRegistry, Visibility};
pub use dialect::{Dialect, DialectKind, NamespaceDialect, StandardDialect};
pub use digest::Digest;
pub use error::{ErrorKind, RegistryError, Result, RetryPolicy};
pub use job::{DeletionJob, DeletionReport, DeletionTarget, Job, JobState};
pub use repository::{RepositoryClient, RepositoryPath};

pub mod auth;
pub mod client;
pub mod config;
pub mod destination;
pub mod dialect;
pub mod digest;
pub mod error;
pub mod job;
pub mod oci;
pub mod repository;
