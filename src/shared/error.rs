//! Shared Error Types
//!
//! This module defines the error type used across the sync engine. Errors in
//! this crate are never fatal to the surrounding application: every failure
//! path ends in a retry, a skipped record, or an explicit cache reset.
//!
//! # Error Categories
//!
//! - `DecodeError` - a transport message failed to decode
//! - `TransportError` - the push channel could not be opened or broke
//! - `HttpError` - the liveness probe or server clock request failed
//! - `UnknownCollection` - an envelope named a collection nobody registered
//! - `ConfigError` - invalid connection configuration
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread
//! boundaries.
use thiserror::Error;

/// Errors produced by the sync engine
#[derive(Debug, Error, Clone)]
pub enum SyncError {
    /// A transport message could not be decoded
    #[error("Decode error: {message}")]
    DecodeError {
        /// Human-readable error message
        message: String,
    },

    /// The push channel could not be opened or failed mid-stream
    #[error("Transport error: {message}")]
    TransportError {
        /// Human-readable error message
        message: String,
    },

    /// An out-of-band HTTP request failed
    #[error("HTTP error: {message}")]
    HttpError {
        /// Human-readable error message
        message: String,
    },

    /// An envelope referenced a collection that was never registered
    #[error("Unknown collection: {collection}")]
    UnknownCollection {
        /// The collection name carried by the envelope
        collection: String,
    },

    /// Invalid connection configuration
    #[error("Config error: {message}")]
    ConfigError {
        /// Human-readable error message
        message: String,
    },
}

impl SyncError {
    /// Create a new decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeError {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
        }
    }

    /// Create a new HTTP error
    pub fn http(message: impl Into<String>) -> Self {
        Self::HttpError {
            message: message.into(),
        }
    }

    /// Create a new unknown-collection error
    pub fn unknown_collection(collection: impl Into<String>) -> Self {
        Self::UnknownCollection {
            collection: collection.into(),
        }
    }

    /// Create a new config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error() {
        let error = SyncError::decode("Invalid JSON");
        match error {
            SyncError::DecodeError { message } => {
                assert_eq!(message, "Invalid JSON");
            }
            _ => panic!("Expected DecodeError"),
        }
    }

    #[test]
    fn test_unknown_collection_error() {
        let error = SyncError::unknown_collection("core/unknown");
        match error {
            SyncError::UnknownCollection { collection } => {
                assert_eq!(collection, "core/unknown");
            }
            _ => panic!("Expected UnknownCollection"),
        }
    }

    #[test]
    fn test_error_display() {
        let error = SyncError::transport("socket closed");
        let display = format!("{}", error);
        assert!(display.contains("Transport error"));
        assert!(display.contains("socket closed"));
    }

    #[test]
    fn test_from_serde_error() {
        let invalid_json = "{ invalid json }";
        let result: Result<serde_json::Value, _> = serde_json::from_str(invalid_json);
        let serde_error = result.unwrap_err();
        let sync_error: SyncError = serde_error.into();

        match sync_error {
            SyncError::DecodeError { .. } => {}
            _ => panic!("Expected DecodeError from serde error"),
        }
    }

    #[test]
    fn test_error_clone() {
        let error = SyncError::http("timeout");
        let cloned = error.clone();
        assert_eq!(format!("{}", error), format!("{}", cloned));
    }
}
