//! The wire frame written per channel connection.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use courier_core::{Headers, MessageFormat, Payload, ReceiverMessage, names};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::compression;
use crate::error::{SerializerError, SerializerResult};

/// One discrete unit delivered over a named channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PipeMessage {
    /// Payload text; base64 for binary payloads, base64 gzip when compressed.
    pub string_value: String,
    /// Text vs binary semantics of the payload.
    pub message_format: MessageFormat,
    /// Ordering hint; not enforced by the transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    /// Headers, in order.
    #[serde(default)]
    pub headers: IndexMap<String, String>,
}

impl PipeMessage {
    /// Returns whether the sender marked the payload as compressed.
    pub fn is_compressed(&self) -> bool {
        self.headers
            .get(names::COMPRESSED_PAYLOAD)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Restores the original payload and headers.
    ///
    /// The message-format and compression markers are transport bookkeeping and are not
    /// carried into the inbound headers.
    pub fn into_receiver_message(self) -> SerializerResult<ReceiverMessage> {
        let value = if self.is_compressed() {
            compression::decompress(&self.string_value)?
        } else {
            self.string_value
        };

        let payload = match self.message_format {
            MessageFormat::Text => Payload::Text(value),
            MessageFormat::Binary => Payload::Binary(
                STANDARD
                    .decode(&value)
                    .map_err(|e| SerializerError::Binary(e.to_string()))?,
            ),
        };

        let headers: Headers = self
            .headers
            .into_iter()
            .filter(|(k, _)| k != names::MESSAGE_FORMAT && k != names::COMPRESSED_PAYLOAD)
            .collect();

        Ok(ReceiverMessage::new(payload, headers))
    }
}
