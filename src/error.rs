//! Error types for the QRZ lookup client.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, QrzError>;

/// Broad classification of a [`QrzError`], for presentation layers that
/// render failures without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never produced a usable HTTP response
    Transport,
    /// The service answered with an `Error` in its session block
    Service,
    /// Valid credentials without an active subscription
    Authorization,
    /// The response did not have the expected shape
    Structural,
    /// The request is one this client refuses to issue
    UnsupportedOperation,
    /// The caller supplied something unusable
    InvalidInput,
}

/// Comprehensive error type for all QRZ operations
#[derive(Error, Debug)]
pub enum QrzError {
    /// Connection, timeout or body read failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status
    #[error("Unable to connect to QRZ (HTTP error {status})")]
    HttpStatus { status: u16 },

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    UrlParsing(#[from] url::ParseError),

    /// QRZ reported an error in the `Session` block
    #[error("QRZ service error: {message}")]
    Service { message: String },

    /// Login succeeded but the account cannot use the XML service
    #[error("Authorization failed: {reason}")]
    Authorization { reason: String },

    /// Missing element, unparseable XML or a field of the wrong type
    #[error("Malformed QRZ response: {message}")]
    Structural { message: String },

    /// Request rejected before it reached the network
    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    /// Invalid input provided
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl QrzError {
    /// Create a new service error
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Create a new authorization error
    pub fn authorization(reason: impl Into<String>) -> Self {
        Self::Authorization {
            reason: reason.into(),
        }
    }

    /// Create a new structural error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    /// Create a new unsupported operation error
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            QrzError::Network(_) | QrzError::HttpStatus { .. } => ErrorKind::Transport,
            QrzError::Service { .. } => ErrorKind::Service,
            QrzError::Authorization { .. } => ErrorKind::Authorization,
            QrzError::Structural { .. } => ErrorKind::Structural,
            QrzError::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            QrzError::UrlParsing(_) | QrzError::InvalidInput { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Check if this error came from the transport rather than the service
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            QrzError::HttpStatus { status } => Some(*status),
            QrzError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error should send the session back through login.
    ///
    /// Only a service-reported error qualifies. A transport failure says
    /// nothing about the token and never triggers a login.
    pub fn should_reauthenticate(&self) -> bool {
        matches!(self, QrzError::Service { .. }) && !self.is_not_found()
    }

    /// Check if the service reported that the requested record does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            QrzError::Service { message } => is_not_found_message(message),
            _ => false,
        }
    }

    /// Check if this error can be cleared by a fresh session.
    ///
    /// The core never retries transport failures, so only session errors are
    /// reported as retryable.
    pub fn is_retryable(&self) -> bool {
        self.should_reauthenticate()
    }
}

/// QRZ phrases missing records as `Not found: <query>`.
pub(crate) fn is_not_found_message(message: &str) -> bool {
    message
        .trim_start()
        .get(..9)
        .map_or(false, |head| head.eq_ignore_ascii_case("not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = QrzError::service("test message");
        assert!(error.to_string().contains("test message"));

        let error = QrzError::HttpStatus { status: 503 };
        assert!(error.to_string().contains("503"));
        assert_eq!(error.status(), Some(503));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(QrzError::HttpStatus { status: 500 }.kind(), ErrorKind::Transport);
        assert_eq!(QrzError::service("x").kind(), ErrorKind::Service);
        assert_eq!(QrzError::authorization("x").kind(), ErrorKind::Authorization);
        assert_eq!(QrzError::structural("x").kind(), ErrorKind::Structural);
        assert_eq!(
            QrzError::unsupported("dxcc=all").kind(),
            ErrorKind::UnsupportedOperation
        );
        assert_eq!(QrzError::invalid_input("x").kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_error_properties() {
        assert!(QrzError::service("Session Timeout").should_reauthenticate());
        assert!(QrzError::service("Invalid session key").is_retryable());
        assert!(!QrzError::service("Not found: XX1XX").should_reauthenticate());
        assert!(QrzError::service("Not found: XX1XX").is_not_found());
        assert!(!QrzError::HttpStatus { status: 503 }.should_reauthenticate());
        assert!(!QrzError::HttpStatus { status: 503 }.is_retryable());
        assert!(!QrzError::authorization("non-subscriber").is_retryable());
        assert!(QrzError::HttpStatus { status: 503 }.is_transport());
    }

    #[test]
    fn test_not_found_message_detection() {
        assert!(is_not_found_message("Not found: W1XYZ"));
        assert!(is_not_found_message("not found"));
        assert!(!is_not_found_message("Session Timeout"));
        assert!(!is_not_found_message("Not"));
    }
}
