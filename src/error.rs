/// Centralized error types for repo-client using thiserror
///
/// Every failure of the repository-access layer is surfaced as a distinct
/// variant so that callers can decide whether to retry, skip the repository
/// or abort the analysis run.
use thiserror::Error;

/// Main error type for the repository-access layer
#[derive(Error, Debug)]
pub enum RepoError {
    /// The locator does not resolve to a readable repository
    #[error("Failed to bind repository '{locator}': {reason}")]
    Binding { locator: String, reason: String },

    /// The reference does not resolve within the bound repository
    #[error("Reference '{reference}' not found: {reason}")]
    Reference { reference: String, reason: String },

    #[error("Repository client is not initialized")]
    NotInitialized,

    #[error("Repository client is already bound to '{0}'")]
    AlreadyInitialized(String),

    /// Invalid search input (empty query, bad pattern, ...)
    #[error("Invalid search request: {0}")]
    Search(String),

    /// Content could not be read during search or checkout
    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation not supported by {backend} backend: {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RepoError>;

// Conversion from anyhow::Error to RepoError
impl From<anyhow::Error> for RepoError {
    fn from(err: anyhow::Error) -> Self {
        RepoError::Other(format!("{:#}", err))
    }
}

impl RepoError {
    pub fn binding(locator: impl Into<String>, reason: impl ToString) -> Self {
        RepoError::Binding {
            locator: locator.into(),
            reason: reason.to_string(),
        }
    }

    pub fn reference(reference: impl Into<String>, reason: impl ToString) -> Self {
        RepoError::Reference {
            reference: reference.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        RepoError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        RepoError::Other(msg.into())
    }

    /// Check if this is caused by caller input (bad locator, reference or query)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RepoError::Binding { .. }
                | RepoError::Reference { .. }
                | RepoError::Search(_)
                | RepoError::Config(ConfigError::InvalidValue { .. })
        )
    }

    /// Check if retrying the whole operation could succeed.
    ///
    /// The layer never retries on its own; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            RepoError::Io { .. } => true,
            RepoError::Git(e) => matches!(
                e.class(),
                git2::ErrorClass::Net | git2::ErrorClass::Http | git2::ErrorClass::Ssh
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_error_display() {
        let err = RepoError::binding("/missing", "path does not exist");
        assert_eq!(
            err.to_string(),
            "Failed to bind repository '/missing': path does not exist"
        );
    }

    #[test]
    fn test_reference_error_display() {
        let err = RepoError::reference("v9.9.9", "revspec not found");
        assert_eq!(
            err.to_string(),
            "Reference 'v9.9.9' not found: revspec not found"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = RepoError::io(
            "src/lib.rs",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("IO error on 'src/lib.rs'"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("test error");
        let err: RepoError = anyhow_err.into();
        assert!(matches!(err, RepoError::Other(_)));
    }

    #[test]
    fn test_is_user_error() {
        assert!(RepoError::Search("empty query".to_string()).is_user_error());
        assert!(RepoError::binding("x", "y").is_user_error());
        assert!(!RepoError::NotInitialized.is_user_error());
    }

    #[test]
    fn test_is_retryable() {
        let io = RepoError::io("f", std::io::Error::other("disk"));
        assert!(io.is_retryable());

        let net = RepoError::Git(git2::Error::new(
            git2::ErrorCode::GenericError,
            git2::ErrorClass::Net,
            "connection reset",
        ));
        assert!(net.is_retryable());

        assert!(!RepoError::Search("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_config_error_chain() {
        let err: RepoError = ConfigError::InvalidValue {
            key: "remote.clone_timeout_secs".to_string(),
            reason: "must be greater than 0".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration value for 'remote.clone_timeout_secs': must be greater than 0"
        );
    }

    #[test]
    fn test_unsupported_display() {
        let err = RepoError::Unsupported {
            backend: "directory",
            operation: "commit history",
        };
        assert_eq!(
            err.to_string(),
            "Operation not supported by directory backend: commit history"
        );
    }
}
