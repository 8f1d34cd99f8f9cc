//! Typed, insertion-ordered message headers.
//!
//! Header values form a small closed set ([`HeaderValue`]). Consumers read them back through
//! three typed accessors whose conversion rules are fixed:
//!
//! | Accessor | Accepts |
//! |----------|---------|
//! | [`Headers::get_str`] | any value, rendered to its wire form |
//! | [`Headers::get_uri`] | `Uri`, or `Text` that parses as an absolute URI |
//! | [`Headers::get_timestamp`] | `Timestamp`, or `Text` in RFC 3339 round-trip form |
//!
//! A value that fails conversion is reported as absent.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use indexmap::map::Iter;
use url::Url;

/// Reserved header names stamped by transports.
pub mod names {
    /// Text vs binary discriminator of the payload.
    pub const MESSAGE_FORMAT: &str = "courier_messageFormat";
    /// Identifies the system that originated the message.
    pub const ORIGINATING_SYSTEM: &str = "courier_originatingSystem";
    /// Set to `"true"` when the payload was compressed by the transport.
    pub const COMPRESSED_PAYLOAD: &str = "courier_isCompressedPayload";

    /// All reserved names.
    pub const RESERVED: [&str; 3] = [MESSAGE_FORMAT, ORIGINATING_SYSTEM, COMPRESSED_PAYLOAD];
}

// ============================================================================
// Header Value
// ============================================================================

/// A single header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// Free-form text.
    Text(String),
    /// An absolute URI.
    Uri(Url),
    /// A UTC instant.
    Timestamp(DateTime<Utc>),
    /// A signed integer.
    Integer(i64),
    /// A boolean flag.
    Boolean(bool),
}

impl HeaderValue {
    /// Renders the value the way it travels on the wire.
    pub fn to_wire_string(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Uri(u) => Cow::Borrowed(u.as_str()),
            Self::Timestamp(t) => Cow::Owned(format_timestamp(t)),
            Self::Integer(i) => Cow::Owned(i.to_string()),
            Self::Boolean(b) => Cow::Owned(b.to_string()),
        }
    }

    /// Converts the value to a URI, if it is one or parses as one.
    pub fn as_uri(&self) -> Option<Url> {
        match self {
            Self::Uri(u) => Some(u.clone()),
            Self::Text(s) => Url::parse(s).ok(),
            _ => None,
        }
    }

    /// Converts the value to a timestamp, if it is one or parses as one.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            Self::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            _ => None,
        }
    }
}

/// Formats an instant as RFC 3339 in UTC with a `Z` suffix.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire_string())
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Url> for HeaderValue {
    fn from(value: Url) -> Self {
        Self::Uri(value)
    }
}

impl From<DateTime<Utc>> for HeaderValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

// ============================================================================
// Headers
// ============================================================================

/// Insertion-ordered header map.
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: IndexMap<String, HeaderValue>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, returning the previous value for the key.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<HeaderValue>,
    ) -> Option<HeaderValue> {
        self.inner.insert(name.into(), value.into())
    }

    /// Removes a header, preserving the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        self.inner.shift_remove(name)
    }

    /// Returns the raw value of a header.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.inner.get(name)
    }

    /// Returns whether a header with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Returns a header rendered as a string.
    pub fn get_str(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(HeaderValue::to_wire_string)
    }

    /// Returns a header as a URI, or `None` if absent or not convertible.
    pub fn get_uri(&self, name: &str) -> Option<Url> {
        self.get(name).and_then(HeaderValue::as_uri)
    }

    /// Returns a header as a timestamp, or `None` if absent or not convertible.
    pub fn get_timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name).and_then(HeaderValue::as_timestamp)
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates headers in insertion order.
    pub fn iter(&self) -> Iter<'_, String, HeaderValue> {
        self.inner.iter()
    }

    /// Iterates header names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a String, &'a HeaderValue);
    type IntoIter = Iter<'a, String, HeaderValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl IntoIterator for Headers {
    type Item = (String, HeaderValue);
    type IntoIter = indexmap::map::IntoIter<String, HeaderValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<HeaderValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<K, V> Extend<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<HeaderValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
