use std::time::Duration;

use thiserror::Error;

/// Unified error type for monorel operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parse error: {reason} (entry: {raw:?})")]
    Parse { raw: String, reason: String },

    #[error("Version parsing error: tag '{tag}': {reason}")]
    VersionParse { tag: String, reason: String },

    #[error("External call failed ({collaborator}): {message}")]
    ExternalCall {
        collaborator: String,
        message: String,
    },

    #[error("External call timed out: {operation} did not finish within {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in monorel
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Configuration(msg.into())
    }

    /// Create a parse error naming the raw text that failed
    pub fn parse(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        ReleaseError::Parse {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Create a version parsing error for a release tag
    pub fn version(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        ReleaseError::VersionParse {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Create an error for a failed collaborator call
    pub fn external(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        ReleaseError::ExternalCall {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }

    /// Create an error for a collaborator call that exceeded its time bound
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        ReleaseError::Timeout {
            operation: operation.into(),
            seconds: after.as_secs(),
        }
    }

    /// True for configuration problems, which abort the whole run
    pub fn is_configuration(&self) -> bool {
        matches!(self, ReleaseError::Configuration(_))
    }

    /// True when the error came from a collaborator (VCS, registry, hosting)
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            ReleaseError::ExternalCall { .. } | ReleaseError::Timeout { .. } | ReleaseError::Git(_)
        )
    }
}
