//! Adapting cloud events to HTTP requests.
//!
//! Headers are split the way HTTP clients model them: content headers travel with the
//! body, everything else is a request header. The body's `Content-Type` comes from the
//! event's `datacontenttype` (media type and charset only).

use courier_core::{ArgumentError, Payload};
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::{Method, Request, Uri};

use crate::binding::{ProtocolBinding, resolve};
use crate::error::CloudEventResult;
use crate::event::{CloudEvent, attributes};

/// Header names that belong to the request content rather than the request itself.
const CONTENT_HEADERS: [&str; 11] = [
    "allow",
    "content-disposition",
    "content-encoding",
    "content-language",
    "content-length",
    "content-location",
    "content-md5",
    "content-range",
    "content-type",
    "expires",
    "last-modified",
];

/// Returns whether a header belongs to the request content.
pub fn is_content_header(name: &str) -> bool {
    CONTENT_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

/// Request body and its headers.
#[derive(Debug, Clone, Default)]
pub struct HttpContent {
    /// Body bytes.
    pub body: Vec<u8>,
    /// Content headers.
    pub headers: HeaderMap,
}

/// An HTTP request built from a cloud event.
#[derive(Debug, Clone)]
pub struct HttpRequestMessage {
    /// Request method.
    pub method: Method,
    /// Request URI, if one was given.
    pub uri: Option<Uri>,
    /// General request headers.
    pub headers: HeaderMap,
    /// Body and content headers.
    pub content: HttpContent,
}

impl HttpRequestMessage {
    /// Flattens into an [`http::Request`], merging content headers into the header map.
    pub fn into_request(self) -> Request<Vec<u8>> {
        let mut request = Request::new(self.content.body);
        *request.method_mut() = self.method;
        if let Some(uri) = self.uri {
            *request.uri_mut() = uri;
        }
        let headers = request.headers_mut();
        headers.extend(self.headers);
        headers.extend(self.content.headers);
        request
    }
}

impl CloudEvent {
    /// Builds an HTTP request carrying this event.
    ///
    /// `method` defaults to `GET`.
    pub fn to_http_request(
        &self,
        method: Option<Method>,
        uri: Option<&str>,
        binding: Option<&dyn ProtocolBinding>,
    ) -> CloudEventResult<HttpRequestMessage> {
        let message = self.to_sender_message(binding)?;

        let uri = uri
            .map(|u| {
                u.parse::<Uri>()
                    .map_err(|e| ArgumentError::new("request_uri", e.to_string()))
            })
            .transpose()?;

        let body = match message.payload() {
            Payload::Text(s) => s.as_bytes().to_vec(),
            Payload::Binary(b) => b.clone(),
        };
        let mut content = HttpContent {
            body,
            headers: HeaderMap::new(),
        };

        if let Some(content_type) = self.data_content_type() {
            let value = match content_type.charset() {
                Some(charset) => format!("{}; charset={}", content_type.media_type(), charset),
                None => content_type.media_type().to_string(),
            };
            content
                .headers
                .insert(CONTENT_TYPE, header_value("datacontenttype", &value)?);
        }

        // The bound datacontenttype header is already carried by the body's Content-Type.
        let content_type_header = resolve(binding).header_name(attributes::DATA_CONTENT_TYPE);

        let mut headers = HeaderMap::new();
        for (name, value) in &message.headers {
            if *name == content_type_header {
                continue;
            }
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ArgumentError::new("header", format!("'{name}' is not a valid HTTP header name: {e}"))
            })?;
            let value = header_value("header", &value.to_wire_string())?;

            if is_content_header(name) {
                content.headers.insert(header_name, value);
            } else {
                headers.append(header_name, value);
            }
        }

        Ok(HttpRequestMessage {
            method: method.unwrap_or(Method::GET),
            uri,
            headers,
            content,
        })
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ArgumentError> {
    HeaderValue::from_str(value)
        .map_err(|e| ArgumentError::new(name, format!("'{value}' is not a valid HTTP header value: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::PrefixedBinding;
    use crate::content_type::ContentType;
    use url::Url;

    fn event() -> CloudEvent {
        CloudEvent::new()
            .with_source(Url::parse("https://example.com/orders").unwrap())
            .with_type("order.created")
    }

    #[test]
    fn test_content_header_classification() {
        assert!(is_content_header("Content-Type"));
        assert!(is_content_header("expires"));
        assert!(!is_content_header("ce-id"));
        assert!(!is_content_header("accept"));
    }

    #[test]
    fn test_http_request_defaults_to_get() {
        let mut event = event();
        event.set_data("{\"n\":1}");

        let request = event
            .to_http_request(None, Some("http://localhost/events"), Some(&PrefixedBinding::http()))
            .unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.uri.as_ref().unwrap().path(), "/events");
        assert_eq!(request.content.body, b"{\"n\":1}");
        assert_eq!(request.headers.get("ce-type").unwrap(), "order.created");
        assert_eq!(request.headers.get("ce-specversion").unwrap(), "1.0");
        assert!(request.headers.contains_key("ce-id"));
    }

    #[test]
    fn test_content_type_goes_to_content_headers() {
        let mut event = event();
        event.set_data_content_type(
            ContentType::new("application/json")
                .unwrap()
                .with_charset("utf-8"),
        );

        let request = event
            .to_http_request(Some(Method::POST), None, Some(&PrefixedBinding::http()))
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.content.headers.get(CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
        assert!(request.headers.get(CONTENT_TYPE).is_none());
        assert!(!request.headers.contains_key("ce-datacontenttype"));
    }

    #[test]
    fn test_datacontenttype_is_never_a_request_header() {
        let mut event = event();
        event.set_data_content_type(ContentType::new("text/plain").unwrap());

        let request = event.to_http_request(None, None, None).unwrap();

        assert!(!request.headers.contains_key("datacontenttype"));
        assert_eq!(request.content.headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(request.headers.len(), 5);
        for name in ["id", "source", "specversion", "type", "time"] {
            assert!(request.headers.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn test_content_type_attribute_replaces_body_content_type() {
        let mut event = event();
        event.set_data_content_type(ContentType::new("application/json").unwrap());
        event
            .additional_attributes_mut()
            .insert("Content-Type", "text/plain");

        let request = event.to_http_request(None, None, None).unwrap();

        let values: Vec<_> = request.content.headers.get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, ["text/plain"]);
    }

    #[test]
    fn test_into_request_merges_headers() {
        let mut event = event();
        event
            .additional_attributes_mut()
            .insert("Content-Language", "en");

        let request = event
            .to_http_request(Some(Method::PUT), Some("/events"), None)
            .unwrap()
            .into_request();

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.headers().get("content-language").unwrap(), "en");
        assert_eq!(request.headers().get("source").unwrap(), "https://example.com/orders");
    }

    #[test]
    fn test_invalid_header_name_is_argument_error() {
        let request = event().to_http_request(None, None, Some(&PrefixedBinding::amqp()));
        assert!(matches!(request, Err(crate::CloudEventError::Argument(_))));
    }
}
