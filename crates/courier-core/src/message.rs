//! Outbound and inbound envelope types.
//!
//! A [`SenderMessage`] is what callers hand to a [`Sender`](crate::Sender); a
//! [`ReceiverMessage`] is what a receiver produces. Both carry a [`Payload`] and an
//! ordered [`Headers`] map.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ArgumentError;
use crate::header::Headers;

// ============================================================================
// Payload
// ============================================================================

/// Message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Binary(Vec<u8>),
}

impl Payload {
    /// Returns the text representation: the text itself, or base64 of binary data.
    pub fn string_value(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Binary(b) => Cow::Owned(STANDARD.encode(b)),
        }
    }

    /// Returns the payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    /// Returns the format discriminator.
    pub fn format(&self) -> MessageFormat {
        match self {
            Self::Text(_) => MessageFormat::Text,
            Self::Binary(_) => MessageFormat::Binary,
        }
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<&[u8]> for Payload {
    fn from(value: &[u8]) -> Self {
        Self::Binary(value.to_vec())
    }
}

/// Whether a payload carries text or binary semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageFormat {
    /// Text payload.
    Text,
    /// Binary payload, base64 encoded when rendered as text.
    Binary,
}

impl MessageFormat {
    /// Returns the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Binary => "Binary",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageFormat {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Text" => Ok(Self::Text),
            "Binary" => Ok(Self::Binary),
            other => Err(ArgumentError::new(
                "message_format",
                format!("unknown message format '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Sender Message
// ============================================================================

/// An outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderMessage {
    payload: Payload,
    /// Message headers.
    pub headers: Headers,
    /// Ordering hint for transports that support one.
    pub priority: Option<u8>,
    /// Per-message compression override; `None` defers to the sender.
    pub compressed: Option<bool>,
}

impl SenderMessage {
    /// Creates a message with the given payload and no headers.
    pub fn new(payload: impl Into<Payload>) -> Self {
        Self {
            payload: payload.into(),
            headers: Headers::new(),
            priority: None,
            compressed: None,
        }
    }

    /// Adds a header.
    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<crate::HeaderValue>,
    ) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the priority hint.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the compression override.
    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = Some(compressed);
        self
    }

    /// Returns the payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns true if the payload is binary.
    pub fn is_binary(&self) -> bool {
        matches!(self.payload, Payload::Binary(_))
    }

    /// Returns the payload as text (base64 for binary payloads).
    pub fn string_value(&self) -> Cow<'_, str> {
        self.payload.string_value()
    }

    /// Returns the payload format.
    pub fn message_format(&self) -> MessageFormat {
        self.payload.format()
    }

    /// Resolves whether this message should be compressed, given the sender's default.
    pub fn should_compress(&self, sender_default: bool) -> bool {
        self.compressed.unwrap_or(sender_default)
    }
}

// ============================================================================
// Receiver Message
// ============================================================================

/// An inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverMessage {
    payload: Payload,
    /// Message headers.
    pub headers: Headers,
}

impl ReceiverMessage {
    /// Creates an inbound message.
    pub fn new(payload: impl Into<Payload>, headers: Headers) -> Self {
        Self {
            payload: payload.into(),
            headers,
        }
    }

    /// Returns the payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns true if the payload is binary.
    pub fn is_binary(&self) -> bool {
        matches!(self.payload, Payload::Binary(_))
    }

    /// Returns the payload as text (base64 for binary payloads).
    pub fn string_payload(&self) -> Cow<'_, str> {
        self.payload.string_value()
    }

    /// Returns the payload bytes.
    pub fn binary_payload(&self) -> &[u8] {
        self.payload.as_bytes()
    }

    /// Consumes the message, returning its parts.
    pub fn into_parts(self) -> (Payload, Headers) {
        (self.payload, self.headers)
    }
}
