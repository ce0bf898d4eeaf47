use super::RegistryArgs;
use crate::context::AppContext;
use crate::format;
use libreplica::{RegistryError, Visibility};

/// What happened to the requested project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOutcome {
    Created,
    AlreadyExists,
}

/// Creates a project, folding a conflict into [`ProjectOutcome::AlreadyExists`].
pub async fn create_project(
    ctx: &AppContext,
    name: &str,
    visibility: Visibility,
    registry: &RegistryArgs,
) -> Result<ProjectOutcome, RegistryError> {
    let credentials = registry.credentials().map_err(RegistryError::validation)?;
    let result = ctx
        .replicator
        .create_project(registry.dialect, &registry.url, credentials, name, visibility)
        .await;

    match result {
        Ok(()) => Ok(ProjectOutcome::Created),
        Err(e) if e.is_conflict() => Ok(ProjectOutcome::AlreadyExists),
        Err(e) => Err(e),
    }
}

/// Handle the create-project command
pub async fn handle_create_project(
    ctx: &AppContext,
    name: &str,
    public: bool,
    registry: &RegistryArgs,
) {
    let visibility = if public {
        Visibility::Public
    } else {
        Visibility::Private
    };

    match create_project(ctx, name, visibility, registry).await {
        Ok(ProjectOutcome::Created) => {
            format::success(&format!(
                "Project '{}' ({}) is ready on {}",
                name, visibility, registry.url
            ));
        }
        Ok(ProjectOutcome::AlreadyExists) => {
            format::warning(&format!("Project '{}' already exists on {}", name, registry.url));
        }
        Err(e) => {
            format::error(&format!("Failed to create project '{}': {}", name, e));
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
