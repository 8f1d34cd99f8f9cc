//! Runtime error types.

use courier_cloudevents::CloudEventError;
use courier_core::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while starting or running configured senders.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configured default binding could not be installed.
    #[error(transparent)]
    CloudEvent(#[from] CloudEventError),

    /// A sender could not be started.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Sender not found.
    #[error("Sender not found: {0}")]
    SenderNotFound(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
