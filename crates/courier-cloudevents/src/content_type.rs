//! Media type of an event's data.

use std::fmt;
use std::str::FromStr;

use courier_core::ArgumentError;

/// A parsed `type/subtype; key=value` media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    media_type: String,
    parameters: Vec<(String, String)>,
}

impl ContentType {
    /// Creates a content type without parameters.
    pub fn new(media_type: &str) -> Result<Self, ArgumentError> {
        media_type.parse()
    }

    /// Adds or replaces the `charset` parameter.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.parameters
            .retain(|(k, _)| !k.eq_ignore_ascii_case("charset"));
        self.parameters.push(("charset".to_string(), charset.into()));
        self
    }

    /// Returns the `type/subtype` part.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Returns the `charset` parameter, if any.
    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset")
    }

    /// Returns a parameter by case-insensitive name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';');
        let media_type = parts.next().unwrap_or_default().trim();

        let valid = media_type
            .split_once('/')
            .is_some_and(|(t, sub)| is_token(t) && is_token(sub));
        if !valid {
            return Err(ArgumentError::new(
                "content_type",
                format!("'{s}' is not a valid media type"),
            ));
        }

        let mut parameters = Vec::new();
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let Some((key, value)) = param.split_once('=') else {
                return Err(ArgumentError::new(
                    "content_type",
                    format!("malformed parameter '{param}' in '{s}'"),
                ));
            };
            let value = value.trim().trim_matches('"');
            parameters.push((key.trim().to_string(), value.to_string()));
        }

        Ok(Self {
            media_type: media_type.to_ascii_lowercase(),
            parameters,
        })
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$&-^_.+".contains(&b))
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)?;
        for (k, v) in &self.parameters {
            write!(f, "; {k}={v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_charset() {
        let ct: ContentType = "Application/JSON; charset=\"utf-8\"".parse().unwrap();
        assert_eq!(ct.media_type(), "application/json");
        assert_eq!(ct.charset(), Some("utf-8"));
        assert_eq!(ct.to_string(), "application/json; charset=utf-8");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("json".parse::<ContentType>().is_err());
        assert!("text/".parse::<ContentType>().is_err());
        assert!("text/plain; charset".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_with_charset_replaces() {
        let ct = ContentType::new("text/plain")
            .unwrap()
            .with_charset("ascii")
            .with_charset("utf-8");
        assert_eq!(ct.to_string(), "text/plain; charset=utf-8");
    }
}
