//! Error types for replication operations.
//!
//! Every non-success HTTP response is turned into a [`RegistryError::Status`]
//! carrying the status code and the full response body. Callers branch on
//! [`RegistryError::kind`] instead of comparing against sentinel values, and
//! ask a [`RetryPolicy`] whether a failure is worth another attempt.

use thiserror::Error;


/// Main error type for replication operations
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Transport-level failures (connection, timeout, DNS, reset)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The registry answered with a status the operation does not accept
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// Validation errors (bad digest, malformed path, protocol violations)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, missing settings)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A deletion job failed on a specific target
    #[error("failed to delete {} on {destination}: {source}", target(.repository, .tag.as_deref()))]
    Deletion {
        repository: String,
        tag: Option<String>,
        destination: String,
        #[source]
        source: Box<RegistryError>,
    },
}

fn target(repository: &str, tag: Option<&str>) -> String {
    match tag {
        Some(tag) => format!("{}:{}", repository, tag),
        None => repository.to_string(),
    }
}

/// Result type alias for replication operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Coarse classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The target does not exist (404).
    NotFound,
    /// The target already exists (409).
    Conflict,
    /// The request never produced a response.
    Transient,
    /// Anything else.
    Fatal,
}

impl RegistryError {
    /// Creates a new network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreplica::error::RegistryError;
    ///
    /// let err = RegistryError::network("connection refused");
    /// assert!(matches!(err, RegistryError::Network { .. }));
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a structured HTTP status error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreplica::error::RegistryError;
    ///
    /// let err = RegistryError::status(404, "http://localhost:5000/v2/", "");
    /// assert!(err.is_not_found());
    /// ```
    pub fn status<U, B>(status: u16, url: U, body: B) -> Self
    where
        U: Into<String>,
        B: Into<String>,
    {
        Self::Status {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreplica::error::RegistryError;
    ///
    /// let err = RegistryError::validation("invalid repository path");
    /// assert!(matches!(err, RegistryError::Validation { .. }));
    /// ```
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps an error with the deletion target it occurred on.
    pub fn deletion(
        repository: impl Into<String>,
        tag: Option<&str>,
        destination: impl Into<String>,
        source: RegistryError,
    ) -> Self {
        Self::Deletion {
            repository: repository.into(),
            tag: tag.map(str::to_string),
            destination: destination.into(),
            source: Box::new(source),
        }
    }

    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Transient,
            Self::Status { status: 404, .. } => ErrorKind::NotFound,
            Self::Status { status: 409, .. } => ErrorKind::Conflict,
            Self::Deletion { source, .. } => source.kind(),
            _ => ErrorKind::Fatal,
        }
    }

    /// Returns the HTTP status carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Deletion { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// Returns the response body carried by this error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            Self::Deletion { source, .. } => source.body(),
            _ => None,
        }
    }

    /// True iff the registry answered 404.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// True iff the registry answered 409.
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

/// Decides whether a failed operation should be attempted again later.
///
/// Transport failures are always retryable. Errors carrying an HTTP status
/// are not, except 5xx responses when `retry_server_errors` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    /// Treat 5xx responses as transient.
    pub retry_server_errors: bool,
}

impl RetryPolicy {
    /// Policy that also retries 5xx responses.
    pub fn with_server_errors() -> Self {
        Self {
            retry_server_errors: true,
        }
    }

    /// Returns true when `err` is worth another attempt.
    pub fn is_retryable(&self, err: &RegistryError) -> bool {
        if err.kind() == ErrorKind::Transient {
            return true;
        }
        match err.status_code() {
            Some(status) if (500..600).contains(&status) => self.retry_server_errors,
            _ => false,
        }
    }
}

/// Classifies `err` with the default policy.
pub fn retryable(err: &RegistryError) -> bool {
    RetryPolicy::default().is_retryable(err)
}
