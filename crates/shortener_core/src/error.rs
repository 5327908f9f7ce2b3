use std::fmt;

use thiserror::Error;

/// Errors surfaced to the caller of a field operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field cannot run with the given options; the field is detached.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Unknown operation or option, or an operation on a field that is not attached.
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),
}

impl FieldError {
    pub(crate) fn missing_endpoint() -> Self {
        FieldError::Configuration("an endpoint is required".to_string())
    }

    pub(crate) fn not_attached(field: crate::FieldId) -> Self {
        FieldError::InvalidInvocation(format!("field {field} is not attached"))
    }
}

/// A failed shortening request. Reported through `on_error`, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidEndpoint,
    HttpStatus(u16),
    Timeout,
    Network,
    Body,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Body => write!(f, "unreadable response body"),
        }
    }
}
