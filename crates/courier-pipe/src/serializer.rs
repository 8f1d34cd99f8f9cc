//! Encoding frames to single-line records and back.
//!
//! Records are compact JSON, which never contains a raw newline, so a record can be
//! written as one newline-terminated line.

use crate::error::{SerializerError, SerializerResult};
use crate::message::PipeMessage;

/// Encodes a frame to a single-line record.
pub fn serialize(message: &PipeMessage) -> SerializerResult<String> {
    serde_json::to_string(message).map_err(|e| SerializerError::Encode(e.to_string()))
}

/// Decodes a record, rejecting anything that is not exactly one well-formed frame.
pub fn deserialize(record: &str) -> SerializerResult<PipeMessage> {
    serde_json::from_str(record).map_err(|e| SerializerError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::MessageFormat;
    use indexmap::IndexMap;

    fn frame() -> PipeMessage {
        let mut headers = IndexMap::new();
        headers.insert("z".to_string(), "last?".to_string());
        headers.insert("a".to_string(), "line\nbreak".to_string());
        PipeMessage {
            string_value: "hello".into(),
            message_format: MessageFormat::Text,
            priority: Some(3),
            headers,
        }
    }

    #[test]
    fn test_record_is_single_line() {
        let record = serialize(&frame()).unwrap();
        assert!(!record.contains('\n'));
        assert_eq!(deserialize(&record).unwrap(), frame());
    }

    #[test]
    fn test_record_is_canonical() {
        let record = r#"{"stringValue":"x","messageFormat":"Binary","headers":{"b":"1","a":"2"}}"#;
        let decoded = deserialize(record).unwrap();
        assert_eq!(decoded.message_format, MessageFormat::Binary);
        assert_eq!(decoded.priority, None);
        let keys: Vec<_> = decoded.headers.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(serialize(&decoded).unwrap(), record);
    }

    #[test]
    fn test_rejects_malformed_records() {
        for record in [
            "",
            "not json",
            r#"{"stringValue":"x"}"#,
            r#"{"stringValue":"x","messageFormat":"Json"}"#,
            r#"{"stringValue":"x","messageFormat":"Text","extra":1}"#,
            r#"{"stringValue":"x","messageFormat":"Text"} trailing"#,
        ] {
            assert!(
                matches!(deserialize(record), Err(SerializerError::Parse(_))),
                "accepted {record:?}"
            );
        }
    }
}
