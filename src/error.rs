//! Error types and handling for SDAC Elia
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for SDAC Elia operations
pub type Result<T> = std::result::Result<T, SdacError>;

/// Main error type for SDAC Elia
#[derive(Debug, Error)]
pub enum SdacError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An enabled tariff formula without its coefficients
    #[error("Configuration inconsistency: {field} - {message}")]
    Inconsistent { field: String, message: String },

    /// Upstream feed errors (transport, status, payload)
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// HTTP/Web server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl SdacError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        SdacError::Config {
            message: message.into(),
        }
    }

    /// Create a new configuration inconsistency error
    pub fn inconsistent<S: Into<String>>(field: S, message: S) -> Self {
        SdacError::Inconsistent {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new fetch error
    pub fn fetch<S: Into<String>>(message: S) -> Self {
        SdacError::Fetch {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        SdacError::Web {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        SdacError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        SdacError::Io {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        SdacError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        SdacError::Generic {
            message: message.into(),
        }
    }

    /// Whether the next poll may succeed where this one failed
    pub fn is_transient(&self) -> bool {
        matches!(self, SdacError::Fetch { .. } | SdacError::Timeout { .. })
    }
}

impl From<std::io::Error> for SdacError {
    fn from(err: std::io::Error) -> Self {
        SdacError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for SdacError {
    fn from(err: serde_yaml::Error) -> Self {
        SdacError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SdacError {
    fn from(err: serde_json::Error) -> Self {
        SdacError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for SdacError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SdacError::timeout(err.to_string())
        } else {
            SdacError::fetch(err.to_string())
        }
    }
}
