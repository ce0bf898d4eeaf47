use clap::Args;
use libreplica::{Credentials, DialectKind};

/// Delete command handlers
pub mod delete;

/// Create-project command handlers
pub mod project;

/// Tag listing command handlers
pub mod tags;

/// Version command handlers
pub mod version;

#[cfg(test)]
mod tests;

/// Registry connection flags shared by every remote command.
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Registry URL
    #[arg(long, env = "REPLICA_URL")]
    pub url: String,
    /// Registry dialect: standard, namespace
    #[arg(long, default_value = "standard")]
    pub dialect: DialectKind,
    /// Username (anonymous if omitted)
    #[arg(short, long, env = "REPLICA_USERNAME")]
    pub username: Option<String>,
    /// Password (will prompt if a username is given without one)
    #[arg(short, long, env = "REPLICA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,
}

impl RegistryArgs {
    /// Resolves credentials, prompting for a missing password.
    pub fn credentials(&self) -> Result<Credentials, String> {
        resolve_credentials(self.username.as_deref(), self.password.as_deref(), || {
            rpassword::prompt_password("Password: ")
                .map_err(|e| format!("Failed to read password: {}", e))
        })
    }
}

pub(crate) fn resolve_credentials<F>(
    username: Option<&str>,
    password: Option<&str>,
    prompt: F,
) -> Result<Credentials, String>
where
    F: FnOnce() -> Result<String, String>,
{
    match (username, password) {
        (None, None) => Ok(Credentials::anonymous()),
        (None, Some(_)) => Err("A password was given without a username".to_string()),
        (Some(user), Some(pass)) => Ok(Credentials::basic(user, pass)),
        (Some(user), None) => Ok(Credentials::basic(user, prompt()?)),
    }
}
