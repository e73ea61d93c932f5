//! Error types for fc-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for fc-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for fc-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file or pagination configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed resource identifier
    #[error("Invalid RID: {0}")]
    InvalidRid(String),

    /// Alias not found
    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    /// Alias already exists
    #[error("Alias already exists: {0}")]
    AliasExists(String),

    /// Alias name collides with a built-in command
    #[error("'{0}' is a reserved command name")]
    ReservedAlias(String),

    /// Alias chain loops back on itself
    #[error("Circular alias reference: {}", path.join(" -> "))]
    AliasCycle {
        /// Alias names in resolution order, ending with the repeated name
        path: Vec<String>,
    },

    /// Folder copy attempted without the recursive flag
    #[error("Source resource {0} is a folder. Pass --recursive to copy folder contents.")]
    RecursiveRequired(String),

    /// A remote call failed in the middle of a larger operation
    #[error("{operation} failed for {target}: {source}")]
    Upstream {
        /// Operation being performed, e.g. "list dataset files"
        operation: String,
        /// Identifier, page or file the operation was working on
        target: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A bulk operation finished but some items failed
    #[error("Completed with errors: {errors} item(s) failed")]
    PartialFailure {
        /// Number of failed files and folder children
        errors: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error (retryable)
    #[error("Network error: {0}")]
    Network(String),

    /// Conflict error
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Feature not supported by the platform or by this client
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Wrap a collaborator failure with the operation and target it belongs to
    pub fn upstream(operation: impl Into<String>, target: impl Into<String>, source: Error) -> Self {
        Error::Upstream {
            operation: operation.into(),
            target: target.into(),
            source: Box::new(source),
        }
    }

    /// Get the appropriate exit code for this error
    ///
    /// Wrapped upstream failures report the code of their root cause.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidRid(_) | Error::Config(_) => 2,               // UsageError
            Error::ReservedAlias(_) | Error::RecursiveRequired(_) => 2, // UsageError
            Error::AliasCycle { .. } => 2,                              // UsageError
            Error::Network(_) => 3,                                     // NetworkError
            Error::Auth(_) => 4,                                        // AuthError
            Error::NotFound(_) | Error::AliasNotFound(_) => 5,          // NotFound
            Error::Conflict(_) | Error::AliasExists(_) => 6,            // Conflict
            Error::UnsupportedFeature(_) => 7,                          // UnsupportedFeature
            Error::Upstream { source, .. } => source.exit_code(),
            _ => 1, // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidRid("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::RecursiveRequired("ri.x".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::AliasNotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::Conflict("test".into()).exit_code(), 6);
        assert_eq!(Error::AliasExists("test".into()).exit_code(), 6);
        assert_eq!(Error::UnsupportedFeature("test".into()).exit_code(), 7);
        assert_eq!(Error::PartialFailure { errors: 1 }.exit_code(), 1);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_upstream_uses_root_cause_exit_code() {
        let err = Error::upstream(
            "get resource",
            "ri.foundry.main.dataset.abc",
            Error::NotFound("ri.foundry.main.dataset.abc".into()),
        );
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_error_display() {
        let err = Error::AliasNotFound("ds".into());
        assert_eq!(err.to_string(), "Alias not found: ds");

        let err = Error::AliasCycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Circular alias reference: a -> b -> a");

        let err = Error::upstream("list spaces", "page 3", Error::Network("reset".into()));
        assert_eq!(
            err.to_string(),
            "list spaces failed for page 3: Network error: reset"
        );

        let err = Error::RecursiveRequired("ri.compass.main.folder.src".into());
        assert!(err.to_string().contains("--recursive"));
    }
}
