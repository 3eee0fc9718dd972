//! Error types for cubby.

use thiserror::Error;

/// Result type alias using cubby's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cubby operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No user identity present in the request context.
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// Filename or identity failed strict validation (traversal, empty, bad chars).
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Create collision: a file already exists at the target location.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Read/write/delete against an absent file.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote semantic index could not be reached or rejected the call.
    /// Distinct from an empty result set, which is a normal response.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_auth_required() {
        let err = Error::AuthRequired("no identity header".to_string());
        assert_eq!(err.to_string(), "Authentication required: no identity header");
    }

    #[test]
    fn test_error_display_invalid_name() {
        let err = Error::InvalidName("filename contains '..'".to_string());
        assert_eq!(err.to_string(), "Invalid name: filename contains '..'");
    }

    #[test]
    fn test_error_display_already_exists() {
        let err = Error::AlreadyExists("report.txt".to_string());
        assert_eq!(err.to_string(), "Already exists: report.txt");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("report.txt".to_string());
        assert_eq!(err.to_string(), "Not found: report.txt");
    }

    #[test]
    fn test_error_display_index_unavailable() {
        let err = Error::IndexUnavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "Index unavailable: connection refused");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::NotFound("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("NotFound"));
    }
}
