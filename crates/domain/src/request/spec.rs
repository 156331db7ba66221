//! Request specification type

use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::{Headers, HttpMethod, PreparedRequest, QueryParam, QueryParams, RequestBody, RequestDefaults};
use crate::error::{DomainError, DomainResult};

/// Complete specification for one HTTP call.
///
/// Built once per test case and never mutated after it is handed to the
/// harness; the builder methods consume and return `Self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    #[serde(default)]
    pub method: HttpMethod,
    /// Absolute URL, or a path starting with `/` resolved against the
    /// configured base URL
    pub url: String,
    /// Request headers; these override harness defaults of the same name
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,
    /// Query parameters appended to any query already in `url`
    #[serde(default, alias = "qs", skip_serializing_if = "QueryParams::is_empty")]
    pub query: QueryParams,
    /// Request body
    #[serde(default, skip_serializing_if = "RequestBody::is_none")]
    pub body: RequestBody,
    /// Whether the response body must parse as JSON
    #[serde(default = "default_expect_json")]
    pub expect_json: bool,
    /// Per-request timeout overriding the harness default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

const fn default_expect_json() -> bool {
    true
}

impl RequestSpec {
    /// Creates a request with the given method and URL.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            query: QueryParams::new(),
            body: RequestBody::none(),
            expect_json: true,
            timeout_ms: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Adds or replaces a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Adds a query parameter using the value's display form.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.add(QueryParam::new(key, value.to_string()));
        self
    }

    /// Adds every entry of a JSON object as query parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQueryValue` if `params` is not an object or one of
    /// its values has no string form.
    pub fn with_query_json(mut self, params: &Value) -> DomainResult<Self> {
        let Value::Object(map) = params else {
            return Err(DomainError::InvalidQueryValue {
                key: String::new(),
                reason: "query parameters must be a JSON object".to_string(),
            });
        };
        for (key, value) in map {
            self.query.add_json(key.clone(), value)?;
        }
        Ok(self)
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::json(body);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Accepts a non-JSON response body.
    #[must_use]
    pub const fn expecting_text(mut self) -> Self {
        self.expect_json = false;
        self
    }

    /// Overrides the harness timeout for this request.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Resolves the target URL against `base` and appends the query
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the URL is empty, malformed, relative without
    /// a base, or not http(s).
    pub fn full_url(&self, base: Option<&Url>) -> DomainResult<Url> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(DomainError::InvalidUrl("URL is required".to_string()));
        }

        let candidate = if raw.starts_with('/') {
            let base = base.ok_or_else(|| {
                DomainError::InvalidUrl(format!("relative URL '{raw}' needs a base URL"))
            })?;
            format!("{}{raw}", base.as_str().trim_end_matches('/'))
        } else {
            raw.to_string()
        };

        let mut url =
            Url::parse(&candidate).map_err(|e| DomainError::InvalidUrl(format!("{e}: {candidate}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "URL must start with http:// or https://: {candidate}"
            )));
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for param in self.query.iter() {
                pairs.append_pair(&param.key, &param.value);
            }
        }

        Ok(url)
    }

    /// Validates the specification and resolves it into the exact request
    /// to put on the wire.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure: URL, header, or body.
    pub fn prepare(&self, defaults: &RequestDefaults) -> DomainResult<PreparedRequest> {
        let url = self.full_url(defaults.base_url.as_ref())?;

        let mut headers = self.headers.merged_over(&defaults.headers);
        headers.validate()?;
        if let Some(content_type) = self.body.content_type() {
            if !headers.contains("content-type") {
                headers.set("Content-Type", content_type);
            }
        }

        let timeout = self
            .timeout_ms
            .map_or(defaults.timeout, Duration::from_millis);

        Ok(PreparedRequest {
            method: self.method,
            url,
            headers,
            body: self.body.to_bytes()?,
            timeout,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn httpbin() -> Url {
        Url::parse("https://httpbin.org").unwrap()
    }

    #[test]
    fn test_get_request() {
        let req = RequestSpec::get("https://httpbin.org/get");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://httpbin.org/get");
        assert!(req.expect_json);
    }

    #[test]
    fn test_full_url_without_query_is_unchanged() {
        let req = RequestSpec::get("https://httpbin.org/get");
        assert_eq!(req.full_url(None).unwrap().as_str(), "https://httpbin.org/get");
    }

    #[test]
    fn test_relative_url_uses_base() {
        let req = RequestSpec::delete("/delete");
        assert_eq!(
            req.full_url(Some(&httpbin())).unwrap().as_str(),
            "https://httpbin.org/delete"
        );
        assert!(matches!(req.full_url(None), Err(DomainError::InvalidUrl(_))));
    }

    #[test]
    fn test_query_values_are_stringified() {
        let req = RequestSpec::get("/get")
            .with_query_json(&json!({"name": "John Doe", "age": 30}))
            .unwrap();

        assert_eq!(req.query.get("age"), Some("30"));
        assert_eq!(
            req.full_url(Some(&httpbin())).unwrap().as_str(),
            "https://httpbin.org/get?name=John+Doe&age=30"
        );
    }

    #[test]
    fn test_query_appends_to_existing_query() {
        let req = RequestSpec::get("https://httpbin.org/get?param1=abc").with_query("param2", "xyz");
        assert_eq!(
            req.full_url(None).unwrap().as_str(),
            "https://httpbin.org/get?param1=abc&param2=xyz"
        );
    }

    #[test]
    fn test_rejects_malformed_and_non_http_urls() {
        assert!(RequestSpec::get("").full_url(None).is_err());
        assert!(RequestSpec::get("not a url").full_url(None).is_err());
        assert!(RequestSpec::get("ftp://example.com/file").full_url(None).is_err());
    }

    #[test]
    fn test_prepare_merges_default_headers() {
        let defaults = RequestDefaults {
            base_url: Some(httpbin()),
            headers: [("User-Agent", "httpcheck/0.1.0"), ("Accept", "application/json")]
                .into_iter()
                .collect(),
            timeout: Duration::from_secs(10),
        };
        let req = RequestSpec::get("/get").with_header("User-Agent", "MyCustomUserAgent/1.0");

        let prepared = req.prepare(&defaults).unwrap();

        assert_eq!(prepared.headers.get("user-agent"), Some("MyCustomUserAgent/1.0"));
        assert_eq!(prepared.headers.get("accept"), Some("application/json"));
        assert_eq!(prepared.timeout, Duration::from_secs(10));
        assert_eq!(prepared.body, None);
    }

    #[test]
    fn test_prepare_sets_json_content_type_and_body() {
        let req = RequestSpec::post("https://httpbin.org/post")
            .with_json(json!({"key": "value"}))
            .with_timeout(Duration::from_millis(250));

        let prepared = req.prepare(&RequestDefaults::default()).unwrap();

        assert_eq!(prepared.headers.get("content-type"), Some("application/json"));
        assert_eq!(prepared.body, Some(br#"{"key":"value"}"#.to_vec()));
        assert_eq!(prepared.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_prepare_keeps_caller_content_type() {
        let req = RequestSpec::put("https://httpbin.org/put")
            .with_header("content-type", "application/vnd.api+json")
            .with_json(json!({}));

        let prepared = req.prepare(&RequestDefaults::default()).unwrap();
        assert_eq!(
            prepared.headers.get("Content-Type"),
            Some("application/vnd.api+json")
        );
    }

    #[test]
    fn test_prepare_rejects_invalid_header() {
        let req = RequestSpec::get("https://httpbin.org/get").with_header("Bad Header", "x");
        assert!(matches!(
            req.prepare(&RequestDefaults::default()),
            Err(DomainError::InvalidHeaderName(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_invalid_default_header() {
        let defaults = RequestDefaults {
            headers: [("User-Agent", "agent\u{7f}")].into_iter().collect(),
            ..RequestDefaults::default()
        };
        let req = RequestSpec::get("https://httpbin.org/get");

        assert!(matches!(
            req.prepare(&defaults),
            Err(DomainError::InvalidHeaderValue { name, .. }) if name == "User-Agent"
        ));

        let overridden = req.with_header("User-Agent", "MyCustomUserAgent/1.0");
        assert!(overridden.prepare(&defaults).is_ok());
    }

    #[test]
    fn test_deserialize_with_qs_alias() {
        let req: RequestSpec = serde_json::from_value(json!({
            "method": "GET",
            "url": "/get",
            "qs": {"name": "John Doe", "age": 30}
        }))
        .unwrap();

        assert_eq!(req.query.get("age"), Some("30"));
        assert!(req.expect_json);
    }
}
