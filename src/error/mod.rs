//! Error types for the assistant bridge.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all bridge operations.
///
/// Cancellation is not represented here; a cancelled wait is reported as
/// [`crate::run::Termination::Cancelled`].
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AssistantError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(e) if e.is_timeout() => ErrorCategory::Timeout,
            Self::Network(_) => ErrorCategory::Network,
            Self::Configuration(_) | Self::InvalidArgument(_) => ErrorCategory::Configuration,
            Self::Serialization(_) | Self::MalformedResponse(_) => ErrorCategory::MalformedResponse,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
        }
    }

    /// Whether the backend rejected (or never answered) a request.
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Authentication
                | ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
                | ErrorCategory::Api
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server => {
                RecoverySuggestion::RetryLater
            }
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_drives_category() {
        assert_eq!(AssistantError::api(401, "no").category(), ErrorCategory::Authentication);
        assert_eq!(AssistantError::api(429, "slow").category(), ErrorCategory::RateLimit);
        assert_eq!(AssistantError::api(503, "down").category(), ErrorCategory::Server);
        assert_eq!(AssistantError::api(400, "bad").category(), ErrorCategory::Api);
    }

    #[test]
    fn backend_family_excludes_local_failures() {
        assert!(AssistantError::api(400, "thread has active run").is_backend_error());
        assert!(AssistantError::RateLimited { retry_after_ms: None }.is_backend_error());
        assert!(!AssistantError::malformed("type `audio`").is_backend_error());
        assert!(!AssistantError::Configuration("missing key".into()).is_backend_error());
        assert!(!AssistantError::Storage("poisoned".into()).is_backend_error());
    }

    #[test]
    fn recovery_suggestion_follows_category() {
        assert_eq!(
            AssistantError::Authentication("bad key".into()).recovery_suggestion(),
            RecoverySuggestion::CheckCredentials
        );
        assert_eq!(
            AssistantError::api(500, "oops").recovery_suggestion(),
            RecoverySuggestion::RetryLater
        );
        assert_eq!(
            AssistantError::malformed("x").recovery_suggestion(),
            RecoverySuggestion::ContactSupport
        );
    }
}
