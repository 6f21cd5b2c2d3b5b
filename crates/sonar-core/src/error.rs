//! Core error types for the Sonar query layer
//!
//! Every failure surfaces to the immediate caller as a typed error; nothing
//! in this layer logs-and-continues.

use thiserror::Error;

use crate::config::ConfigError;

/// Standard Result type for Sonar operations
pub type SonarResult<T> = Result<T, SonarError>;

/// Core error type for all query operations
#[derive(Error, Debug)]
pub enum SonarError {
    /// Malformed fluent call (unknown operator, empty values, type clash)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Transport error: {0}")]
    Transport(TransportError),

    /// The backend answered with a null/missing entity list where at least
    /// an empty sequence is required.
    #[error("Resource(s) not found: `{object}` returned no entities")]
    ResourceNotFound { object: String },

    #[error("Decoding error: {0}")]
    Decoding(#[from] DecodeError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// The remote call could not be completed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL errors: {}", .messages.join("; "))]
    Graphql { messages: Vec<String> },

    /// A successful response whose body is not a GraphQL envelope
    #[error("Malformed response: {0}")]
    Malformed(#[from] DecodeError),
}

/// Malformed responses are decoding failures; the rest stay transport errors
impl From<TransportError> for SonarError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Malformed(e) => SonarError::Decoding(e),
            other => SonarError::Transport(other),
        }
    }
}

/// The response did not match the expected envelope shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Response is missing the `{0}` object")]
    MissingObject(String),

    #[error("Missing field `{0}`")]
    MissingField(String),

    #[error("Field `{field}` has unexpected shape, expected {expected}")]
    UnexpectedShape {
        field: String,
        expected: &'static str,
    },

    #[error("Invalid entity: {0}")]
    Entity(String),

    #[error("Response body is not a GraphQL envelope: {0}")]
    InvalidBody(String),
}

impl DecodeError {
    pub fn unexpected(field: impl Into<String>, expected: &'static str) -> Self {
        Self::UnexpectedShape {
            field: field.into(),
            expected,
        }
    }
}

impl SonarError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SonarError::InvalidArgument(_) => "invalid_argument",
            SonarError::Transport(_) => "transport_error",
            SonarError::ResourceNotFound { .. } => "resource_not_found",
            SonarError::Decoding(_) => "decoding_error",
            SonarError::Encoding(_) => "encoding_error",
            SonarError::Config(_) => "configuration_error",
        }
    }

    /// Check whether the backend returned no entity list at all
    pub fn is_not_found(&self) -> bool {
        matches!(self, SonarError::ResourceNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SonarError::invalid_argument("bad").error_code(),
            "invalid_argument"
        );
        assert_eq!(
            SonarError::ResourceNotFound {
                object: "tickets".into()
            }
            .error_code(),
            "resource_not_found"
        );
        assert_eq!(
            SonarError::from(DecodeError::MissingObject("tickets".into())).error_code(),
            "decoding_error"
        );
    }

    #[test]
    fn test_graphql_error_message_joins_all_messages() {
        let err = TransportError::Graphql {
            messages: vec!["first".into(), "second".into()],
        };
        assert_eq!(err.to_string(), "GraphQL errors: first; second");
    }

    #[test]
    fn test_malformed_response_is_decoding_error() {
        let err = SonarError::from(TransportError::Malformed(DecodeError::InvalidBody(
            "expected value at line 1 column 1".into(),
        )));
        assert!(matches!(err, SonarError::Decoding(DecodeError::InvalidBody(_))));
        assert_eq!(err.error_code(), "decoding_error");

        let err = SonarError::from(TransportError::Request("timed out".into()));
        assert_eq!(err.error_code(), "transport_error");
    }

    #[test]
    fn test_is_not_found() {
        let err = SonarError::ResourceNotFound {
            object: "invoices".into(),
        };
        assert!(err.is_not_found());
        assert!(!SonarError::invalid_argument("x").is_not_found());
    }
}
