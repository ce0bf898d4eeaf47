use super::RegistryArgs;
use crate::context::AppContext;
use crate::format::{self, Formattable, Mark, OutputFormat};
use libreplica::{DeletionTarget, Job, JobState};
use serde::Serialize;

/// Exit status asking the caller to try again later (EX_TEMPFAIL).
pub const EXIT_RETRY: i32 = 75;

/// Result of one deletion job run.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub repository: String,
    pub destination: String,
    pub state: JobState,
    pub deleted: Vec<String>,
    pub missing: Vec<String>,
}

impl Formattable for DeleteOutcome {
    fn format_pretty(&self) -> String {
        let mut lines = vec![format::status_line(
            Mark::from(self.state),
            &format!("{} on {}: {}", self.repository, self.destination, self.state),
        )];
        lines.extend(self.deleted.iter().map(|d| format!("  deleted: {}", d)));
        lines.extend(self.missing.iter().map(|m| format!("  already absent: {}", m)));
        lines.join("\n")
    }
}

/// Runs one deletion job to a settled state.
pub async fn run_delete(
    ctx: &AppContext,
    repository: &str,
    tags: Vec<String>,
    registry: &RegistryArgs,
) -> Result<DeleteOutcome, String> {
    let target = DeletionTarget {
        repository: repository.to_string(),
        tags,
        destination: registry.url.clone(),
        credentials: registry.credentials()?,
        insecure: registry.insecure,
    };
    let mut job = ctx
        .replicator
        .deletion_job(registry.dialect, target)
        .map_err(|e| e.to_string())?;

    let entered = job.enter().await;
    job.exit().await.map_err(|e| e.to_string())?;
    let state = entered.map_err(|e| e.to_string())?;

    let report = job.report();
    Ok(DeleteOutcome {
        repository: repository.to_string(),
        destination: registry.url.clone(),
        state,
        deleted: report.deleted.clone(),
        missing: report.missing.clone(),
    })
}

/// Handle the delete command
pub async fn handle_delete(
    ctx: &AppContext,
    repository: &str,
    tags: Vec<String>,
    registry: &RegistryArgs,
    format: OutputFormat,
) {
    let outcome = match run_delete(ctx, repository, tags, registry).await {
        Ok(outcome) => outcome,
        Err(e) => {
            format::error(&e);
            std::process::exit(1);
        }
    };

    format::emit(&outcome, format);

    if let Some(code) = exit_status(outcome.state) {
        if code == EXIT_RETRY {
            format::warning("Destination is temporarily unavailable; run the command again later");
        } else {
            format::error(&format!("Deletion job stopped while {}", outcome.state));
        }
        std::process::exit(code);
    }
}

/// Process exit status for a job state; `None` means success.
pub(crate) fn exit_status(state: JobState) -> Option<i32> {
    if !state.is_settled() {
        return Some(1);
    }
    (state == JobState::Retrying).then_some(EXIT_RETRY)
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
