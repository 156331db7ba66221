//! HTTP Header types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single HTTP header with name and value.
///
/// The name keeps the caller's casing (`User-Agent`, `X-Custom-Header`);
/// lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Content-Type")
    pub name: String,
    /// The header value (e.g., "application/json")
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Checks the name is an RFC 9110 token and the value holds no control
    /// bytes other than horizontal tab.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeaderName` or `InvalidHeaderValue`.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.is_empty() || !self.name.bytes().all(is_token_byte) {
            return Err(DomainError::InvalidHeaderName(self.name.clone()));
        }
        if let Some(b) = self.value.bytes().find(|&b| is_control_byte(b)) {
            return Err(DomainError::InvalidHeaderValue {
                name: self.name.clone(),
                reason: format!("contains control byte {b:#04x}"),
            });
        }
        Ok(())
    }
}

const fn is_control_byte(b: u8) -> bool {
    (b < 0x20 && b != b'\t') || b == 0x7f
}

const fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// An ordered collection of HTTP headers.
///
/// Serializes as a name → value mapping so case files can write
/// `headers: { User-Agent: probe/1.0 }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, String>", into = "IndexMap<String, String>")]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Sets a header, replacing any existing header with the same name
    /// (compared case-insensitively).
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let header = Header::new(name, value);
        match self
            .items
            .iter_mut()
            .find(|h| h.name.eq_ignore_ascii_case(&header.name))
        {
            Some(existing) => *existing = header,
            None => self.items.push(header),
        }
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns true if a header with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns an iterator over the headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Returns `self` layered over `defaults`: every header here overrides a
    /// default of the same name, the remaining defaults are kept.
    #[must_use]
    pub fn merged_over(&self, defaults: &Self) -> Self {
        let mut merged = defaults.clone();
        for header in &self.items {
            merged.set(header.name.clone(), header.value.clone());
        }
        merged
    }

    /// Validates every header.
    ///
    /// # Errors
    ///
    /// Returns the first invalid header's error.
    pub fn validate(&self) -> DomainResult<()> {
        self.items.iter().try_for_each(Header::validate)
    }

    /// Returns the number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len is not const in stable
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty is not const in stable
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        let mut headers = Self::new();
        for header in iter {
            headers.set(header.name, header.value);
        }
        headers
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter().map(|(k, v)| Header::new(k, v)).collect()
    }
}

impl From<IndexMap<String, String>> for Headers {
    fn from(map: IndexMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Headers> for IndexMap<String, String> {
    fn from(headers: Headers) -> Self {
        headers
            .items
            .into_iter()
            .map(|h| (h.name, h.value))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_creation() {
        let header = Header::new("Content-Type", "application/json");
        assert_eq!(header.name, "Content-Type");
        assert_eq!(header.value, "application/json");
    }

    #[test]
    fn test_set_replaces_case_insensitively() {
        let mut headers = Headers::new();
        headers.set("User-Agent", "httpcheck/0.1.0");
        headers.set("user-agent", "MyCustomUserAgent/1.0");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("USER-AGENT"), Some("MyCustomUserAgent/1.0"));
    }

    #[test]
    fn test_merged_over_defaults() {
        let defaults: Headers = [("User-Agent", "httpcheck/0.1.0"), ("Accept", "*/*")]
            .into_iter()
            .collect();
        let custom: Headers = [("User-Agent", "MyCustomUserAgent/1.0")].into_iter().collect();

        let merged = custom.merged_over(&defaults);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("user-agent"), Some("MyCustomUserAgent/1.0"));
        assert_eq!(merged.get("accept"), Some("*/*"));
    }

    #[test]
    fn test_validate_rejects_bad_names_and_values() {
        assert!(Header::new("X-Custom-Header", "CustomValue").validate().is_ok());
        assert_eq!(
            Header::new("Bad Name", "v").validate(),
            Err(DomainError::InvalidHeaderName("Bad Name".to_string()))
        );
        assert!(matches!(
            Header::new("X-Split", "a\r\nInjected: yes").validate(),
            Err(DomainError::InvalidHeaderValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_every_control_byte_but_tab() {
        for bad in ["a\u{1}b", "a\u{8}b", "a\u{b}b", "a\u{1f}b", "a\u{7f}b"] {
            assert!(
                matches!(
                    Header::new("X-Ctl", bad).validate(),
                    Err(DomainError::InvalidHeaderValue { .. })
                ),
                "expected {bad:?} to be rejected"
            );
        }
        assert!(Header::new("X-Tab", "a\tb").validate().is_ok());
        assert!(Header::new("X-Utf8", "żółw").validate().is_ok());
    }

    #[test]
    fn test_serializes_as_mapping() {
        let headers: Headers = [("X-Custom-Header", "CustomValue"), ("Another-Header", "AnotherValue")]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&headers).unwrap();
        assert_eq!(
            json,
            r#"{"X-Custom-Header":"CustomValue","Another-Header":"AnotherValue"}"#
        );

        let back: Headers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, headers);
    }
}
