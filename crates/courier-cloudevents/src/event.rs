//! The [`CloudEvent`] entity.
//!
//! An event goes through an open-ended building phase, mutated through its setters, and
//! can then be materialized into a [`SenderMessage`] any number of times. `id` and `time`
//! are generated lazily on first read and stay fixed afterwards, so repeated
//! materializations of an unchanged event produce identical headers.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use courier_core::{ArgumentError, Headers, Payload, ReceiverMessage, SenderMessage, ValidationError};
use serde_json::Value;
use tracing::trace;
use url::Url;
use uuid::Uuid;

use crate::binding::{ProtocolBinding, resolve};
use crate::content_type::ContentType;
use crate::error::{CloudEventError, CloudEventResult};

/// The only supported CloudEvents spec version.
pub const SPEC_VERSION: &str = "1.0";

/// Canonical attribute names.
pub mod attributes {
    /// Event identifier.
    pub const ID: &str = "id";
    /// Event source URI.
    pub const SOURCE: &str = "source";
    /// Spec version.
    pub const SPEC_VERSION: &str = "specversion";
    /// Event type.
    pub const TYPE: &str = "type";
    /// Media type of the data.
    pub const DATA_CONTENT_TYPE: &str = "datacontenttype";
    /// Schema URI of the data.
    pub const DATA_SCHEMA: &str = "dataschema";
    /// Subject within the source.
    pub const SUBJECT: &str = "subject";
    /// Occurrence timestamp.
    pub const TIME: &str = "time";

    /// All canonical attribute names.
    pub const ALL: [&str; 8] = [
        ID,
        SOURCE,
        SPEC_VERSION,
        TYPE,
        DATA_CONTENT_TYPE,
        DATA_SCHEMA,
        SUBJECT,
        TIME,
    ];
}

/// Generates a fresh event identifier.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Event payload: text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data {
    /// Text data.
    Text(String),
    /// Binary data.
    Binary(Vec<u8>),
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Data {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<&[u8]> for Data {
    fn from(value: &[u8]) -> Self {
        Self::Binary(value.to_vec())
    }
}

impl From<Payload> for Data {
    fn from(value: Payload) -> Self {
        match value {
            Payload::Text(s) => Self::Text(s),
            Payload::Binary(b) => Self::Binary(b),
        }
    }
}

/// A CloudEvents v1.0 event.
#[derive(Debug, Default)]
pub struct CloudEvent {
    id: OnceLock<String>,
    source: Option<Url>,
    event_type: Option<String>,
    data_content_type: Option<ContentType>,
    data_schema: Option<Url>,
    subject: Option<String>,
    time: OnceLock<DateTime<Utc>>,
    data: Option<Data>,
    additional_attributes: Headers,
}

impl CloudEvent {
    /// Creates an empty event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an event carrying the descriptive attributes of `template`.
    ///
    /// Copies `source`, `type`, `datacontenttype`, `dataschema` and `subject`. The new
    /// event gets its own `id` and `time`, and neither data nor additional attributes.
    pub fn copy_from(template: &CloudEvent) -> Self {
        Self {
            source: template.source.clone(),
            event_type: template.event_type.clone(),
            data_content_type: template.data_content_type.clone(),
            data_schema: template.data_schema.clone(),
            subject: template.subject.clone(),
            ..Self::default()
        }
    }

    /// Parses an event from an inbound message.
    ///
    /// Every inbound header first lands in the additional attributes; each recognized
    /// attribute is then lifted out of its bound header. A `specversion` header other than
    /// `"1.0"` is rejected; a missing one is tolerated.
    pub fn from_receiver_message(
        message: &ReceiverMessage,
        binding: Option<&dyn ProtocolBinding>,
    ) -> CloudEventResult<Self> {
        let binding = resolve(binding);
        let headers = &message.headers;

        let mut event = Self {
            additional_attributes: headers.clone(),
            data: Some(message.payload().clone().into()),
            ..Self::default()
        };

        let header = binding.header_name(attributes::SPEC_VERSION);
        if let Some(spec_version) = headers.get_str(&header) {
            if spec_version != SPEC_VERSION {
                return Err(CloudEventError::validation(format!(
                    "Invalid value found in '{header}' header. Expected '{SPEC_VERSION}', but was '{spec_version}'."
                )));
            }
            event.additional_attributes.remove(&header);
        }

        let header = binding.header_name(attributes::ID);
        if let Some(id) = headers.get_str(&header) {
            event.set_id(id.into_owned())?;
            event.additional_attributes.remove(&header);
        }

        let header = binding.header_name(attributes::SOURCE);
        if let Some(source) = headers.get_uri(&header) {
            event.source = Some(source);
            event.additional_attributes.remove(&header);
        }

        let header = binding.header_name(attributes::TYPE);
        if let Some(event_type) = headers.get_str(&header) {
            event.event_type = Some(event_type.into_owned());
            event.additional_attributes.remove(&header);
        }

        let header = binding.header_name(attributes::DATA_CONTENT_TYPE);
        if let Some(content_type) = headers.get_str(&header) {
            event.data_content_type = Some(content_type.parse()?);
            event.additional_attributes.remove(&header);
        }

        let header = binding.header_name(attributes::DATA_SCHEMA);
        if let Some(schema) = headers.get_uri(&header) {
            event.data_schema = Some(schema);
            event.additional_attributes.remove(&header);
        }

        let header = binding.header_name(attributes::SUBJECT);
        if let Some(subject) = headers.get_str(&header) {
            event.subject = Some(subject.into_owned());
            event.additional_attributes.remove(&header);
        }

        let header = binding.header_name(attributes::TIME);
        if let Some(time) = headers.get_timestamp(&header) {
            event.set_time(time);
            event.additional_attributes.remove(&header);
        }

        Ok(event)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Returns the event id, generating one on first read if none was set.
    pub fn id(&self) -> &str {
        self.id.get_or_init(new_id)
    }

    /// Sets the event id. Empty ids are rejected.
    pub fn set_id(&mut self, id: impl Into<String>) -> Result<(), ArgumentError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ArgumentError::new("id", "cannot be empty"));
        }
        self.id = OnceLock::from(id);
        Ok(())
    }

    /// Returns the source URI.
    pub fn source(&self) -> Option<&Url> {
        self.source.as_ref()
    }

    /// Sets or clears the source URI.
    pub fn set_source(&mut self, source: impl Into<Option<Url>>) {
        self.source = source.into();
    }

    /// Builder form of [`set_source`](Self::set_source).
    pub fn with_source(mut self, source: Url) -> Self {
        self.source = Some(source);
        self
    }

    /// Returns the spec version, always `"1.0"`.
    pub fn spec_version(&self) -> &'static str {
        SPEC_VERSION
    }

    /// Returns the event type.
    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    /// Sets the event type.
    pub fn set_type(&mut self, event_type: impl Into<String>) {
        self.event_type = Some(event_type.into());
    }

    /// Clears the event type.
    pub fn clear_type(&mut self) {
        self.event_type = None;
    }

    /// Builder form of [`set_type`](Self::set_type).
    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.set_type(event_type);
        self
    }

    /// Returns the data content type.
    pub fn data_content_type(&self) -> Option<&ContentType> {
        self.data_content_type.as_ref()
    }

    /// Sets or clears the data content type.
    pub fn set_data_content_type(&mut self, content_type: impl Into<Option<ContentType>>) {
        self.data_content_type = content_type.into();
    }

    /// Returns the data schema URI.
    pub fn data_schema(&self) -> Option<&Url> {
        self.data_schema.as_ref()
    }

    /// Sets or clears the data schema URI.
    pub fn set_data_schema(&mut self, schema: impl Into<Option<Url>>) {
        self.data_schema = schema.into();
    }

    /// Returns the subject.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Sets the subject.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = Some(subject.into());
    }

    /// Clears the subject.
    pub fn clear_subject(&mut self) {
        self.subject = None;
    }

    /// Returns the occurrence time, defaulting to the current instant on first read.
    pub fn time(&self) -> DateTime<Utc> {
        *self.time.get_or_init(Utc::now)
    }

    /// Sets the occurrence time.
    pub fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = OnceLock::from(time);
    }

    /// Returns the data.
    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Sets the data.
    pub fn set_data(&mut self, data: impl Into<Data>) {
        self.data = Some(data.into());
    }

    /// Clears the data.
    pub fn clear_data(&mut self) {
        self.data = None;
    }

    /// Sets the data from an untyped value.
    ///
    /// Strings become text data and `null` clears the data. Any other shape is rejected;
    /// nothing is coerced.
    pub fn set_data_json(&mut self, value: Value) -> Result<(), ArgumentError> {
        match value {
            Value::String(s) => self.data = Some(Data::Text(s)),
            Value::Null => self.data = None,
            other => {
                return Err(ArgumentError::new(
                    "data",
                    format!("must be a string, byte array, or null, got {}", json_kind(&other)),
                ));
            }
        }
        Ok(())
    }

    /// Returns the extra attributes.
    pub fn additional_attributes(&self) -> &Headers {
        &self.additional_attributes
    }

    /// Returns the extra attributes for mutation.
    pub fn additional_attributes_mut(&mut self) -> &mut Headers {
        &mut self.additional_attributes
    }

    // =========================================================================
    // Validation & Materialization
    // =========================================================================

    /// Checks that the required attributes are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source.is_none() {
            return Err(ValidationError::new("Source cannot be null."));
        }
        if self.event_type.as_deref().is_none_or(str::is_empty) {
            return Err(ValidationError::new("Type cannot be null or empty."));
        }
        Ok(())
    }

    /// Builds an outbound message whose headers carry this event's attributes.
    ///
    /// Additional attributes are written after the named attributes, so on a key
    /// collision the additional attribute wins.
    pub fn to_sender_message(
        &self,
        binding: Option<&dyn ProtocolBinding>,
    ) -> CloudEventResult<SenderMessage> {
        self.validate()?;
        let binding = resolve(binding);

        let payload = match &self.data {
            Some(Data::Text(s)) => Payload::Text(s.clone()),
            Some(Data::Binary(b)) => Payload::Binary(b.clone()),
            None => Payload::Text(String::new()),
        };
        let mut message = SenderMessage::new(payload);
        let headers = &mut message.headers;

        headers.insert(binding.header_name(attributes::ID), self.id());
        if let Some(source) = &self.source {
            headers.insert(binding.header_name(attributes::SOURCE), source.clone());
        }
        headers.insert(binding.header_name(attributes::SPEC_VERSION), SPEC_VERSION);
        if let Some(event_type) = &self.event_type {
            headers.insert(binding.header_name(attributes::TYPE), event_type.as_str());
        }
        if let Some(content_type) = &self.data_content_type {
            headers.insert(
                binding.header_name(attributes::DATA_CONTENT_TYPE),
                content_type.to_string(),
            );
        }
        if let Some(schema) = &self.data_schema {
            headers.insert(binding.header_name(attributes::DATA_SCHEMA), schema.clone());
        }
        if let Some(subject) = &self.subject {
            headers.insert(binding.header_name(attributes::SUBJECT), subject.as_str());
        }
        headers.insert(binding.header_name(attributes::TIME), self.time());

        for (name, value) in &self.additional_attributes {
            headers.insert(name.as_str(), value.clone());
        }

        trace!(id = %self.id(), headers = message.headers.len(), "Materialized cloud event");
        Ok(message)
    }

    /// Converts an optional event with the default binding; `None` maps to `None`.
    pub fn materialize(event: Option<&CloudEvent>) -> CloudEventResult<Option<SenderMessage>> {
        event.map(|e| e.to_sender_message(None)).transpose()
    }
}

impl TryFrom<&CloudEvent> for SenderMessage {
    type Error = CloudEventError;

    fn try_from(event: &CloudEvent) -> Result<Self, Self::Error> {
        event.to_sender_message(None)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parses cloud events out of inbound messages.
pub trait ReceiverMessageExt {
    /// Parses this message into a [`CloudEvent`].
    fn to_cloud_event(&self, binding: Option<&dyn ProtocolBinding>) -> CloudEventResult<CloudEvent>;
}

impl ReceiverMessageExt for ReceiverMessage {
    fn to_cloud_event(&self, binding: Option<&dyn ProtocolBinding>) -> CloudEventResult<CloudEvent> {
        CloudEvent::from_receiver_message(self, binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::PrefixedBinding;
    use chrono::TimeZone;
    use courier_core::HeaderValue;

    fn valid_event() -> CloudEvent {
        CloudEvent::new()
            .with_source(Url::parse("https://example.com").unwrap())
            .with_type("order.created")
    }

    #[test]
    fn test_materialize_required_headers() {
        let message = valid_event().to_sender_message(None).unwrap();
        let headers = &message.headers;

        assert_eq!(headers.get_str("type").as_deref(), Some("order.created"));
        assert_eq!(headers.get_str("source").as_deref(), Some("https://example.com/"));
        assert_eq!(headers.get_str("specversion").as_deref(), Some("1.0"));
        assert!(Uuid::parse_str(&headers.get_str("id").unwrap()).is_ok());
        let time = headers.get_str("time").unwrap();
        assert!(DateTime::parse_from_rfc3339(&time).is_ok());
        assert!(!headers.contains("subject"));
        assert!(!headers.contains("datacontenttype"));
        assert_eq!(message.string_value(), "");
    }

    #[test]
    fn test_header_order() {
        let mut event = valid_event();
        event.set_subject("order-1");
        event.additional_attributes_mut().insert("tenant", "acme");

        let message = event.to_sender_message(None).unwrap();
        let keys: Vec<_> = message.headers.keys().collect();
        assert_eq!(keys, ["id", "source", "specversion", "type", "subject", "time", "tenant"]);
    }

    #[test]
    fn test_validation_failures() {
        let event = CloudEvent::new().with_type("t");
        let err = event.to_sender_message(None).unwrap_err();
        assert_eq!(err, CloudEventError::validation("Source cannot be null."));

        let event = CloudEvent::new().with_source(Url::parse("https://example.com").unwrap());
        assert!(matches!(
            event.to_sender_message(None),
            Err(CloudEventError::Validation(_))
        ));

        let event = valid_event().with_type("");
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_materialize_is_stable() {
        let event = valid_event();
        let first = event.to_sender_message(None).unwrap();
        let second = event.to_sender_message(None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_additional_attributes_win_on_collision() {
        let mut event = valid_event();
        event
            .additional_attributes_mut()
            .insert("type", "overridden");

        let message = event.to_sender_message(None).unwrap();
        assert_eq!(message.headers.get_str("type").as_deref(), Some("overridden"));
        assert_eq!(event.event_type(), Some("order.created"));
    }

    #[test]
    fn test_data_payloads() {
        let mut event = valid_event();
        event.set_data("hello");
        assert_eq!(event.to_sender_message(None).unwrap().string_value(), "hello");

        event.set_data(vec![0xde_u8, 0xad]);
        let message = event.to_sender_message(None).unwrap();
        assert!(message.is_binary());
        assert_eq!(message.payload(), &Payload::Binary(vec![0xde, 0xad]));

        event.clear_data();
        let message = event.to_sender_message(None).unwrap();
        assert_eq!(message.payload(), &Payload::Text(String::new()));
    }

    #[test]
    fn test_set_data_json() {
        let mut event = valid_event();
        event.set_data_json(Value::from("text")).unwrap();
        assert_eq!(event.data(), Some(&Data::Text("text".into())));

        let err = event.set_data_json(Value::from(42)).unwrap_err();
        assert_eq!(err.name, "data");
        assert_eq!(event.data(), Some(&Data::Text("text".into())));

        assert!(event.set_data_json(serde_json::json!([1, 2])).is_err());

        event.set_data_json(Value::Null).unwrap();
        assert!(event.data().is_none());
    }

    #[test]
    fn test_id_rules() {
        let mut event = valid_event();
        let generated = event.id().to_string();
        assert_eq!(event.id(), generated);

        assert!(event.set_id("").is_err());
        assert_eq!(event.id(), generated);

        event.set_id("custom").unwrap();
        assert_eq!(event.id(), "custom");
    }

    #[test]
    fn test_copy_from() {
        let mut original = valid_event();
        original.set_subject("s");
        original.set_data_schema(Url::parse("https://example.com/schema").unwrap());
        original.set_data_content_type(ContentType::new("text/plain").unwrap());
        original.set_data("payload");
        original.additional_attributes_mut().insert("extra", "1");
        original.set_time(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());

        let copy = CloudEvent::copy_from(&original);

        assert_eq!(copy.source(), original.source());
        assert_eq!(copy.event_type(), original.event_type());
        assert_eq!(copy.subject(), original.subject());
        assert_eq!(copy.data_schema(), original.data_schema());
        assert_eq!(copy.data_content_type(), original.data_content_type());
        assert_ne!(copy.id(), original.id());
        assert_ne!(copy.time(), original.time());
        assert!(copy.data().is_none());
        assert!(copy.additional_attributes().is_empty());
    }

    #[test]
    fn test_from_receiver_message() {
        let mut headers = Headers::new();
        headers.insert("ce_id", "evt-1");
        headers.insert("ce_source", "https://example.com/orders");
        headers.insert("ce_specversion", "1.0");
        headers.insert("ce_type", "order.created");
        headers.insert("ce_datacontenttype", "application/json");
        headers.insert("ce_subject", "order-1");
        headers.insert("ce_time", "2024-05-01T12:30:00Z");
        headers.insert("tenant", "acme");
        let message = ReceiverMessage::new("{}", headers);

        let event = message
            .to_cloud_event(Some(&PrefixedBinding::kafka()))
            .unwrap();

        assert_eq!(event.id(), "evt-1");
        assert_eq!(event.source().unwrap().as_str(), "https://example.com/orders");
        assert_eq!(event.event_type(), Some("order.created"));
        assert_eq!(event.data_content_type().unwrap().media_type(), "application/json");
        assert_eq!(event.subject(), Some("order-1"));
        assert_eq!(event.time(), Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
        assert_eq!(event.data(), Some(&Data::Text("{}".into())));

        let extra: Vec<_> = event.additional_attributes().keys().collect();
        assert_eq!(extra, ["tenant"]);
    }

    #[test]
    fn test_from_receiver_message_spec_version() {
        let mut headers = Headers::new();
        headers.insert("specversion", "0.3");
        let message = ReceiverMessage::new("", headers);
        assert!(matches!(
            CloudEvent::from_receiver_message(&message, None),
            Err(CloudEventError::Validation(_))
        ));

        let message = ReceiverMessage::new(vec![1u8], Headers::new());
        let event = CloudEvent::from_receiver_message(&message, None).unwrap();
        assert_eq!(event.spec_version(), "1.0");
        assert_eq!(event.data(), Some(&Data::Binary(vec![1])));
    }

    #[test]
    fn test_unconvertible_source_stays_additional() {
        let mut headers = Headers::new();
        headers.insert("source", "not a uri");
        let event = CloudEvent::from_receiver_message(&ReceiverMessage::new("", headers), None)
            .unwrap();

        assert!(event.source().is_none());
        assert_eq!(
            event.additional_attributes().get("source"),
            Some(&HeaderValue::Text("not a uri".into()))
        );
    }

    #[test]
    fn test_materialize_optional_event() {
        assert!(CloudEvent::materialize(None).unwrap().is_none());

        let event = valid_event();
        let message = CloudEvent::materialize(Some(&event)).unwrap().unwrap();
        assert_eq!(message, SenderMessage::try_from(&event).unwrap());
    }
}
