//! Execute Request Use Case
//!
//! Resolves a `RequestSpec` against the harness defaults, sends it through
//! the `HttpClient` port under a deadline, and parses the body as JSON when
//! the request asks for it.

use std::sync::Arc;

use httpcheck_domain::{RequestDefaults, RequestSpec, ResponseSpec};

use crate::error::{HarnessError, HarnessResult};
use crate::ports::{HttpClient, HttpClientError};

/// Characters of body kept in a parse error.
const PARSE_PREVIEW_CHARS: usize = 200;

/// Use case for executing HTTP requests.
///
/// This struct encapsulates the logic for sending requests and handling
/// responses. It uses the `HttpClient` port for actual HTTP communication.
///
/// # Example
///
/// ```ignore
/// let client = ReqwestHttpClient::new(&config)?;
/// let use_case = ExecuteRequest::new(Arc::new(client), config.request_defaults()?);
///
/// let request = RequestSpec::get("/get");
/// let response = use_case.execute(&request).await?;
/// ```
pub struct ExecuteRequest<C: HttpClient> {
    client: Arc<C>,
    defaults: RequestDefaults,
}

impl<C: HttpClient> ExecuteRequest<C> {
    /// Creates a new `ExecuteRequest` use case with the given HTTP client.
    #[must_use]
    pub const fn new(client: Arc<C>, defaults: RequestDefaults) -> Self {
        Self { client, defaults }
    }

    /// The defaults requests are resolved against.
    #[must_use]
    pub const fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    /// Executes the request and returns the observed response.
    ///
    /// The whole exchange, including reading the body, is bounded by the
    /// request's timeout. Nothing is retried.
    ///
    /// # Errors
    ///
    /// - `InvalidSpec` if the request cannot be resolved to a valid URL,
    ///   header set, or body
    /// - `Transport` on connection failures or when the timeout elapses
    /// - `Parse` if `expect_json` is set and the body is not JSON
    pub async fn execute(&self, request: &RequestSpec) -> HarnessResult<ResponseSpec> {
        let prepared = request.prepare(&self.defaults)?;
        if prepared.body.is_some() && !prepared.method.has_body() {
            tracing::warn!(method = %prepared.method, url = %prepared.url, "sending a body with a method that defines none");
        }
        tracing::debug!(method = %prepared.method, url = %prepared.url, "sending request");

        let mut response =
            match tokio::time::timeout(prepared.timeout, self.client.execute(&prepared)).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(url = %prepared.url, timeout_ms = prepared.timeout_ms(), "request timed out");
                    return Err(HttpClientError::Timeout {
                        timeout_ms: prepared.timeout_ms(),
                    }
                    .into());
                }
            };

        tracing::debug!(
            status = response.status,
            duration_ms = response.duration_ms(),
            size = response.size,
            "response received"
        );

        if request.expect_json {
            match response.parse_json() {
                Ok(value) => response.json = Some(value),
                Err(e) => {
                    tracing::warn!(url = %response.url, error = %e, "response body is not JSON");
                    return Err(HarnessError::Parse {
                        message: e.to_string(),
                        preview: response.body_preview(PARSE_PREVIEW_CHARS),
                    });
                }
            }
        }

        Ok(response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use httpcheck_domain::{DomainError, PreparedRequest, RequestBody};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock HTTP client for testing.
    struct MockHttpClient {
        response: Result<(u16, &'static str), HttpClientError>,
        delay: Option<Duration>,
        seen: Mutex<Vec<PreparedRequest>>,
    }

    impl MockHttpClient {
        fn success(body: &'static str) -> Self {
            Self {
                response: Ok((200, body)),
                delay: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn error(err: HttpClientError) -> Self {
            Self {
                response: Err(err),
                delay: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::success("{}")
            }
        }

        fn last_request(&self) -> PreparedRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl HttpClient for MockHttpClient {
        fn execute(
            &self,
            request: &PreparedRequest,
        ) -> impl Future<Output = Result<ResponseSpec, HttpClientError>> + Send {
            self.seen.lock().unwrap().push(request.clone());
            let url = request.url.to_string();
            let result = self.response.clone();
            let delay = self.delay;
            async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                result.map(|(status, body)| {
                    let headers = HashMap::from([(
                        "Content-Type".to_string(),
                        "application/json".to_string(),
                    )]);
                    ResponseSpec::new(status, url, headers, body.as_bytes(), Duration::from_millis(5))
                })
            }
        }
    }

    fn defaults() -> RequestDefaults {
        RequestDefaults {
            base_url: Some("https://httpbin.org".parse().unwrap()),
            ..RequestDefaults::default()
        }
    }

    #[tokio::test]
    async fn test_execute_success_parses_json() {
        let client = Arc::new(MockHttpClient::success(r#"{"url":"https://httpbin.org/get"}"#));
        let use_case = ExecuteRequest::new(client, defaults());

        let response = use_case.execute(&RequestSpec::get("/get")).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.url, "https://httpbin.org/get");
        assert_eq!(response.json, Some(json!({"url": "https://httpbin.org/get"})));
    }

    #[tokio::test]
    async fn test_execute_resolves_against_base_url() {
        let client = Arc::new(MockHttpClient::success("{}"));
        let use_case = ExecuteRequest::new(Arc::clone(&client), defaults());

        let request = RequestSpec::get("/get").with_query("name", "John Doe");
        use_case.execute(&request).await.unwrap();

        assert_eq!(
            client.last_request().url.as_str(),
            "https://httpbin.org/get?name=John+Doe"
        );
    }

    #[tokio::test]
    async fn test_execute_sends_body_with_bodyless_method() {
        let client = Arc::new(MockHttpClient::success("{}"));
        let use_case = ExecuteRequest::new(Arc::clone(&client), defaults());

        let request = RequestSpec::delete("/delete").with_body(RequestBody::text("gone"));
        use_case.execute(&request).await.unwrap();

        let sent = client.last_request();
        assert!(!sent.method.has_body());
        assert_eq!(sent.body.as_deref(), Some(b"gone".as_slice()));
    }

    #[tokio::test]
    async fn test_execute_invalid_url() {
        let client = Arc::new(MockHttpClient::success("{}"));
        let use_case = ExecuteRequest::new(client, RequestDefaults::default());

        let result = use_case.execute(&RequestSpec::get("not-a-valid-url")).await;

        assert!(matches!(
            result,
            Err(HarnessError::InvalidSpec(DomainError::InvalidUrl(_)))
        ));
    }

    #[tokio::test]
    async fn test_execute_http_error() {
        let client = Arc::new(MockHttpClient::error(HttpClientError::ConnectionRefused {
            host: "localhost".to_string(),
            port: 1,
        }));
        let use_case = ExecuteRequest::new(client, defaults());

        let result = use_case.execute(&RequestSpec::get("/get")).await;

        assert!(matches!(
            result,
            Err(HarnessError::Transport(HttpClientError::ConnectionRefused { .. }))
        ));
    }

    #[tokio::test]
    async fn test_execute_times_out() {
        let client = Arc::new(MockHttpClient::slow(Duration::from_millis(500)));
        let use_case = ExecuteRequest::new(client, defaults());

        let request = RequestSpec::get("/delay").with_timeout(Duration::from_millis(20));
        let result = use_case.execute(&request).await;

        assert_eq!(
            result.unwrap_err(),
            HarnessError::Transport(HttpClientError::Timeout { timeout_ms: 20 })
        );
    }

    #[tokio::test]
    async fn test_execute_non_json_body() {
        let client = Arc::new(MockHttpClient::success("<html>hello</html>"));
        let use_case = ExecuteRequest::new(client, defaults());

        let result = use_case.execute(&RequestSpec::get("/html")).await;

        match result {
            Err(HarnessError::Parse { preview, .. }) => assert_eq!(preview, "<html>hello</html>"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_text_skips_parsing() {
        let client = Arc::new(MockHttpClient::success("plain text"));
        let use_case = ExecuteRequest::new(client, defaults());

        let response = use_case
            .execute(&RequestSpec::get("/html").expecting_text())
            .await
            .unwrap();

        assert_eq!(response.body, "plain text");
        assert!(response.json.is_none());
    }
}
