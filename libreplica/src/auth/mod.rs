//! Authentication handling for registries and destination adapters.
//!
//! Repository clients and deletion jobs authenticate with static
//! [`Credentials`]. Dialects whose management API sits behind an identity
//! service use a shared [`TokenManager`] instead.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::RequestBuilder;
use reqwest::header::AUTHORIZATION;
use std::fmt;

mod token;

pub use token::{AuthToken, IdentityConfig, TokenManager};


/// How a request identifies itself to a registry.
///
/// `Debug` never prints secrets, so credentials can sit inside job targets
/// that end up in log lines.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    #[default]
    Anonymous,
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer { .. } => f.write_str("Bearer(<redacted>)"),
        }
    }
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    /// ```
    /// use libreplica::auth::Credentials;
    ///
    /// let creds = Credentials::basic("admin", "Harbor12345");
    /// assert_eq!(creds.username(), Some("admin"));
    /// assert!(!format!("{:?}", creds).contains("Harbor12345"));
    /// ```
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// User name of Basic credentials.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Basic { username, .. } => Some(username),
            _ => None,
        }
    }

    /// Value for the `Authorization` header, `None` when anonymous.
    pub fn to_header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, password } => {
                let pair = STANDARD.encode(format!("{}:{}", username, password));
                Some(format!("Basic {}", pair))
            }
            Self::Bearer { token } => Some(format!("Bearer {}", token)),
        }
    }

    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.to_header_value() {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }
}
