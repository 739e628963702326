//! Error types for eqbleu
//!
//! This module defines the error types used throughout the library.
//! Every failure is deterministic: the same input always fails the same way,
//! so none of these errors are worth retrying.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, EqBleuError>;

/// Main error type for eqbleu
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EqBleuError {
    /// The caller violated a documented precondition (wrong annotator count,
    /// non-positive locations in trusted mode, an empty reference position)
    #[error("Precondition violated: {message}")]
    Precondition { message: String },

    /// A block identifier has no entry in the translation lookup
    #[error("Translation not found for block {key}")]
    NotFound { key: String },

    /// Configuration validation failed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl EqBleuError {
    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create a not-found error for a lookup key
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error reports caller misuse
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }

    /// Check if this error reports a missing lookup entry
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for EqBleuError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
