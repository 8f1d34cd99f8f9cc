//! Error taxonomy shared by every Courier crate.
//!
//! - [`ValidationError`]: an envelope or event is missing a required attribute or carries
//!   an unsupported spec version. Raised synchronously, before any I/O.
//! - [`ArgumentError`]: a caller handed an invalid value to a constructor or setter.
//! - [`TransportError`]: a transport could not be created or used. Delivery failures that
//!   happen inside a background worker are never surfaced as this type.

use thiserror::Error;

// =============================================================================
// Validation Errors
// =============================================================================

/// A required attribute is missing or invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Creates a validation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

// =============================================================================
// Argument Errors
// =============================================================================

/// An invalid value was passed to a constructor or setter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid argument '{name}': {reason}")]
pub struct ArgumentError {
    /// Name of the offending argument.
    pub name: &'static str,
    /// Why the value was rejected.
    pub reason: String,
}

impl ArgumentError {
    /// Creates an argument error.
    pub fn new(name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            name,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur when creating or using a transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The sender no longer accepts messages.
    #[error("sender '{name}' is closed")]
    Closed {
        /// Name of the closed sender.
        name: String,
    },

    /// No async runtime is available to host the transport.
    #[error("no async runtime available: {0}")]
    NoRuntime(String),

    /// Failed to encode or decode a transport record.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Aggregate
// =============================================================================

/// Any error a Courier operation can return to its caller.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Validation failed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid argument.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for Courier operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
