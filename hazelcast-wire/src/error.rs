//! Error types shared by the wire format and the member-side client engine.

use std::io;
use thiserror::Error;

/// The main error type for envelope and request processing.
#[derive(Debug, Error)]
pub enum HazelcastError {
    /// Truncated or otherwise malformed bytes, unknown type ids, missing factories.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A request or response did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Configuration errors (unrecognized service names, invalid settings).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation was invoked on a value that is not ready for it.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The calling endpoint lacks the permission a request requires.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// I/O errors from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl HazelcastError {
    /// Returns `true` for errors caused by bytes that could not be decoded.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }
}

/// A specialized `Result` type for Hazelcast operations.
pub type Result<T> = std::result::Result<T, HazelcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error_display() {
        let err = HazelcastError::Serialization("insufficient data".to_string());
        assert_eq!(err.to_string(), "serialization error: insufficient data");
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_configuration_error_display() {
        let err = HazelcastError::Configuration("no service matched: foo".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: no service matched: foo"
        );
        assert!(!err.is_malformed_input());
    }

    #[test]
    fn test_illegal_state_display() {
        let err = HazelcastError::IllegalState("cannot hash an empty payload".to_string());
        assert_eq!(err.to_string(), "illegal state: cannot hash an empty payload");
    }

    #[test]
    fn test_authorization_error_display() {
        let err = HazelcastError::Authorization("missing listen permission".to_string());
        assert_eq!(
            err.to_string(),
            "authorization error: missing listen permission"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "early eof");
        let err: HazelcastError = io_err.into();
        assert!(matches!(err, HazelcastError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HazelcastError>();
    }
}
