//! Fully resolved request, ready for a transport.

use std::time::Duration;

use url::Url;

use super::{Headers, HttpMethod};

/// Harness-wide values a `RequestSpec` is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDefaults {
    /// Base for relative request URLs.
    pub base_url: Option<Url>,
    /// Headers sent unless the request supplies the same name.
    pub headers: Headers,
    /// Timeout used when the request does not set its own.
    pub timeout: Duration,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            base_url: None,
            headers: Headers::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// The exact request a transport sends: absolute URL with query string,
/// merged headers, and serialized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL including the query string.
    pub url: Url,
    /// Final header set.
    pub headers: Headers,
    /// Body bytes, if any.
    pub body: Option<Vec<u8>>,
    /// Upper bound on the whole exchange.
    pub timeout: Duration,
}

impl PreparedRequest {
    /// Timeout in whole milliseconds, for error reporting.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}
