//! Exit code definitions for the fc CLI
//!
//! Scripts branch on these values. Changing a number is a breaking change.

/// Exit codes for the fc CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error, including copies that finished with errors
    GeneralError = 1,

    /// User input error: invalid arguments, malformed RID, alias problems
    UsageError = 2,

    /// Retryable network error: timeout, connection reset, 5xx
    NetworkError = 3,

    /// Authentication or permission failure, missing credentials
    AuthError = 4,

    /// Resource, alias or profile not found
    NotFound = 5,

    /// Conflict: name already taken, transaction state
    Conflict = 6,

    /// Operation not supported for this resource type
    UnsupportedFeature = 7,

    /// Operation was interrupted (e.g., Ctrl+C)
    Interrupted = 130,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            6 => Some(Self::Conflict),
            7 => Some(Self::UnsupportedFeature),
            130 => Some(Self::Interrupted),
            _ => None,
        }
    }

    /// Exit code matching a core error
    pub fn from_error(error: &fc_core::Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or resource identifier",
            Self::NetworkError => "Network error (retryable)",
            Self::AuthError => "Authentication or permission failure",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Conflict",
            Self::UnsupportedFeature => "Operation not supported",
            Self::Interrupted => "Operation interrupted",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::Error;

    #[test]
    fn test_exit_code_round_trip() {
        for code in [0, 1, 2, 3, 4, 5, 6, 7, 130] {
            assert_eq!(ExitCode::from_i32(code).map(ExitCode::as_i32), Some(code));
        }
        assert_eq!(ExitCode::from_i32(99), None);
    }

    #[test]
    fn test_exit_code_from_error() {
        assert_eq!(
            ExitCode::from_error(&Error::AliasCycle {
                path: vec!["a".into(), "a".into()]
            }),
            ExitCode::UsageError
        );
        assert_eq!(
            ExitCode::from_error(&Error::PartialFailure { errors: 2 }),
            ExitCode::GeneralError
        );
        assert_eq!(
            ExitCode::from_error(&Error::upstream(
                "list spaces",
                "page 2",
                Error::Auth("expired".into())
            )),
            ExitCode::AuthError
        );
    }

    #[test]
    fn test_exit_code_display() {
        let display = format!("{}", ExitCode::NotFound);
        assert!(display.contains("5"));
        assert!(display.contains("not found"));
    }
}
