//! Replication jobs.
//!
//! A job is driven by an external runner through [`Job::enter`] and
//! [`Job::exit`]. `enter` does the work and reports a [`JobState`]: either
//! the job is done, or it hit a transient failure and wants to be entered
//! again later. Permanent failures come back as errors.
//!
//! Jobs never sleep or retry on their own; backoff belongs to the runner.

mod delete;

pub use delete::{DeletionJob, DeletionReport, DeletionTarget};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;


/// State reported back to the job runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Inside `enter`; never returned by it.
    Running,
    /// All work is done, including vacuous success on absent targets.
    Finished,
    /// A transient failure was swallowed; enter the job again later.
    Retrying,
}

impl JobState {
    /// True for the states `enter` hands back to the runner.
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Finished => f.write_str("finished"),
            Self::Retrying => f.write_str("retrying"),
        }
    }
}

/// Lifecycle hooks a job runner drives.
#[async_trait]
pub trait Job: Send {
    /// Runs the job once.
    ///
    /// Returns [`JobState::Finished`] or [`JobState::Retrying`]; an error
    /// means the job failed for good.
    async fn enter(&mut self) -> Result<JobState>;

    /// Called after the runner is done with the job.
    async fn exit(&mut self) -> Result<()>;
}
