use super::RegistryArgs;
use crate::context::AppContext;
use crate::format::{self, Formattable, OutputFormat};
use serde::Serialize;

/// Tags of one repository.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TagList {
    pub repository: String,
    pub tags: Vec<String>,
}

impl Formattable for TagList {
    fn format_pretty(&self) -> String {
        if self.tags.is_empty() {
            return format!("No tags found for '{}'.", self.repository);
        }
        self.tags.join("\n")
    }
}

/// Fetches the tag list.
pub async fn list_tags(
    ctx: &AppContext,
    repository: &str,
    registry: &RegistryArgs,
) -> Result<TagList, String> {
    let credentials = registry.credentials()?;
    let tags = ctx
        .replicator
        .list_tags(registry.dialect, &registry.url, repository, credentials)
        .await
        .map_err(|e| format!("Failed to list tags: {}", e))?;

    Ok(TagList {
        repository: repository.to_string(),
        tags,
    })
}

/// Handle the tags command
pub async fn handle_tags(
    ctx: &AppContext,
    repository: &str,
    registry: &RegistryArgs,
    format: OutputFormat,
    quiet: bool,
) {
    let list = match list_tags(ctx, repository, registry).await {
        Ok(list) => list,
        Err(e) => {
            format::error(&e);
            std::process::exit(1);
        }
    };

    if quiet {
        for tag in &list.tags {
            println!("{}", tag);
        }
        return;
    }

    format::emit(&list, format);
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tests;
