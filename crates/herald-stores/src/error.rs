//! Store error types

use herald_core::{AuthError, HeraldError, TransportError, ValidationError};
use thiserror::Error;

/// Errors from the remote content and social APIs
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credentials were refused
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API error from the service
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Response body was not what the API documents
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Message exceeds what the service accepts
    #[error("Message is {length} characters, limit is {limit}")]
    MessageTooLong { length: usize, limit: usize },

    /// Client could not be set up
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 error
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Build an error from a non-success response.
    ///
    /// 401 and 403 are authentication failures.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::AuthenticationFailed(format!("{} - {}", status, message)),
            _ => Self::ApiError { status, message },
        }
    }

    /// Whether the service rejected the credentials
    pub fn is_auth(&self) -> bool {
        match self {
            Self::AuthenticationFailed(_) => true,
            Self::ApiError { status, .. } => matches!(status, 401 | 403),
            Self::Http(e) => e
                .status()
                .is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403),
            _ => false,
        }
    }

    /// Classify into the crate-wide taxonomy, naming the service
    pub fn into_herald(self, service: &str) -> HeraldError {
        let service = service.to_string();

        if self.is_auth() {
            return AuthError::Rejected {
                service,
                reason: self.to_string(),
            }
            .into();
        }

        match self {
            Self::ApiError { status, message } => TransportError::Api {
                service,
                status,
                message,
            }
            .into(),
            Self::Http(e) => TransportError::Unreachable {
                service,
                reason: e.to_string(),
            }
            .into(),
            Self::MessageTooLong { length, limit } => ValidationError::InvalidMessage(format!(
                "{} characters, limit is {}",
                length, limit
            ))
            .into(),
            Self::ConfigurationError(message) => herald_core::ConfigError::InvalidValue {
                field: service,
                message,
            }
            .into(),
            other => TransportError::InvalidResponse {
                service,
                reason: other.to_string(),
            }
            .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_becomes_auth_error() {
        for status in [401, 403] {
            let err = StoreError::from_status(status, "Bad credentials");
            assert!(err.is_auth());
            assert!(matches!(
                err.into_herald("website"),
                HeraldError::Auth(AuthError::Rejected { .. })
            ));
        }
    }

    #[test]
    fn test_server_error_becomes_transport_error() {
        let err = StoreError::from_status(502, "Bad gateway");
        assert!(!err.is_auth());
        match err.into_herald("twitter") {
            HeraldError::Transport(TransportError::Api {
                service, status, ..
            }) => {
                assert_eq!(service, "twitter");
                assert_eq!(status, 502);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_body_becomes_transport_error() {
        let err = StoreError::InvalidResponse("missing sha".to_string());
        assert!(matches!(
            err.into_herald("website"),
            HeraldError::Transport(TransportError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_long_message_becomes_validation_error() {
        let err = StoreError::MessageTooLong {
            length: 300,
            limit: 280,
        };
        assert!(matches!(
            err.into_herald("twitter"),
            HeraldError::Validation(ValidationError::InvalidMessage(_))
        ));
    }
}
