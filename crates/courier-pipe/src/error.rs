//! Pipe transport error types.

use courier_core::TransportError;
use thiserror::Error;

/// Errors raised while encoding or decoding wire records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializerError {
    /// The record is not a well-formed frame.
    #[error("malformed pipe record: {0}")]
    Parse(String),

    /// The frame could not be encoded.
    #[error("failed to encode pipe record: {0}")]
    Encode(String),

    /// The payload could not be compressed or decompressed.
    #[error("compression error: {0}")]
    Compression(String),

    /// A binary payload is not valid base64.
    #[error("invalid binary payload: {0}")]
    Binary(String),
}

impl From<SerializerError> for TransportError {
    fn from(err: SerializerError) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for serializer operations.
pub type SerializerResult<T> = Result<T, SerializerError>;
