//! Core error types and result handling.
//!
//! All fallible operations in this crate return [`MeterResult`]. Null-sentinel
//! readings are *not* errors; they surface as `None` values in a read result.

use thiserror::Error;

/// Result type used throughout the crate.
pub type MeterResult<T> = Result<T, MeterError>;

/// Error type for meter communication and decoding.
#[derive(Error, Debug)]
pub enum MeterError {
    /// Failed to establish or use a connection.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Underlying I/O failure (socket or serial delegate).
    #[error("I/O error: {message}")]
    Io { message: String },

    /// The device did not answer within the bounded poll loop.
    ///
    /// Only raised under [`TimeoutPolicy::FailFast`](crate::transport::TimeoutPolicy);
    /// the default degrade policy synthesizes zero-filled data instead.
    #[error("Timeout: no complete response after {attempts} polls ({expected} bytes expected, {received} received)")]
    Timeout {
        attempts: u32,
        expected: usize,
        received: usize,
    },

    /// A register name was not present in the catalog.
    ///
    /// Distinct from a null-sentinel reading: the register does not exist at
    /// all, so there is nothing to read.
    #[error("Register '{name}' not found in catalog")]
    RegisterNotFound { name: String },

    /// Catalog construction rejected the register table.
    #[error("Invalid catalog: {message}")]
    InvalidCatalog { message: String },

    /// Raw data could not be decoded (short buffer, unsupported width).
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Malformed protocol exchange.
    #[error("Protocol error: {message}")]
    Protocol { message: String },
}

impl MeterError {
    /// Create a connection error.
    pub fn connection<S: Into<String>>(message: S) -> Self {
        MeterError::Connection {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io<S: Into<String>>(message: S) -> Self {
        MeterError::Io {
            message: message.into(),
        }
    }

    /// Create a register-not-found error.
    pub fn register_not_found<S: Into<String>>(name: S) -> Self {
        MeterError::RegisterNotFound { name: name.into() }
    }

    /// Create an invalid-catalog error.
    pub fn invalid_catalog<S: Into<String>>(message: S) -> Self {
        MeterError::InvalidCatalog {
            message: message.into(),
        }
    }

    /// Create an invalid-data error.
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        MeterError::InvalidData {
            message: message.into(),
        }
    }

    /// Create a protocol error.
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        MeterError::Protocol {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for MeterError {
    fn from(err: std::io::Error) -> Self {
        MeterError::Io {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeterError::register_not_found("frequency");
        assert_eq!(
            err.to_string(),
            "Register 'frequency' not found in catalog"
        );

        let err = MeterError::Timeout {
            attempts: 10,
            expected: 29,
            received: 4,
        };
        assert!(err.to_string().contains("10 polls"));
        assert!(err.to_string().contains("29 bytes"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: MeterError = io.into();
        assert!(matches!(err, MeterError::Io { .. }));
    }
}
