//! Errors raised while talking to the Immich API

use thiserror::Error;

/// Errors that can occur during a single API call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, reset)
    #[error("Network error during {operation}: {message}")]
    Transport { operation: String, message: String },

    /// Request exceeded the client timeout
    #[error("{operation} timed out after {seconds} seconds")]
    Timeout { operation: String, seconds: u64 },

    /// The service answered with a status other than the documented success status
    #[error("{operation}: expected HTTP {expected}, got HTTP {actual}")]
    UnexpectedStatus {
        operation: String,
        expected: u16,
        actual: u16,
        body: String,
    },

    /// The response body could not be decoded
    #[error("Invalid response from {operation}: {message}")]
    Decode { operation: String, message: String },
}

impl ApiError {
    /// Name of the operation that failed
    pub fn operation(&self) -> &str {
        match self {
            ApiError::Transport { operation, .. }
            | ApiError::Timeout { operation, .. }
            | ApiError::UnexpectedStatus { operation, .. }
            | ApiError::Decode { operation, .. } => operation,
        }
    }

    /// HTTP status of the response, if one was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { actual, .. } => Some(*actual),
            _ => None,
        }
    }

    pub fn unexpected_status(operation: &str, expected: u16, actual: u16) -> Self {
        ApiError::UnexpectedStatus {
            operation: operation.to_string(),
            expected,
            actual,
            body: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_display() {
        let err = ApiError::unexpected_status("create stack", 201, 500);
        assert_eq!(
            err.to_string(),
            "create stack: expected HTTP 201, got HTTP 500"
        );
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.operation(), "create stack");
    }

    #[test]
    fn test_transport_has_no_status() {
        let err = ApiError::Transport {
            operation: "server version".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.status_code().is_none());
        assert!(err.to_string().contains("connection refused"));
    }
}
