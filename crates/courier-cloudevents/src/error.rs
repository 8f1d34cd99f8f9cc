//! Cloud event error types.

use courier_core::{ArgumentError, CoreError, ValidationError};
use thiserror::Error;

/// Errors raised while building, parsing or materializing a cloud event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudEventError {
    /// The event or envelope violates a cloud event rule.
    #[error("cloud event validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An attribute was given an invalid value.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The process default binding was already resolved or replaced.
    #[error("the default protocol binding has already been resolved")]
    DefaultBindingLocked,
}

impl CloudEventError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(message))
    }
}

impl From<CloudEventError> for CoreError {
    fn from(err: CloudEventError) -> Self {
        match err {
            CloudEventError::Validation(e) => Self::Validation(e),
            CloudEventError::Argument(e) => Self::Argument(e),
            CloudEventError::DefaultBindingLocked => Self::Argument(ArgumentError::new(
                "protocol_binding",
                "the default protocol binding has already been resolved",
            )),
        }
    }
}

/// Result type for cloud event operations.
pub type CloudEventResult<T> = Result<T, CloudEventError>;
