//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It handles all HTTP communication for the harness.

use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;

use httpcheck_application::ports::{HttpClient, HttpClientError};
use httpcheck_domain::{HarnessConfig, HttpMethod, PreparedRequest, ResponseSpec};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};

/// HTTP client implementation using reqwest.
///
/// Wraps a `reqwest::Client` and implements the `HttpClient` port from the
/// application layer. Default headers such as `User-Agent` arrive already
/// merged into each `PreparedRequest`, so the client itself carries none.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    max_redirects: usize,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client from the harness configuration.
    ///
    /// TLS verification stays enabled; redirects are followed up to
    /// `config.max_redirects`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: &HarnessConfig) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            client,
            max_redirects: config.max_redirects,
        })
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Flattens response headers: names lower-cased, repeated values joined
    /// by ", ". Non-UTF-8 values are replaced lossily.
    fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
        let mut collected: HashMap<String, String> = HashMap::with_capacity(headers.keys_len());
        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes());
            collected
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }
        collected
    }

    /// Maps reqwest errors to the port's `HttpClientError`.
    fn map_error(&self, error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string())
        };
        let message = full_message(error);
        let lower = message.to_lowercase();

        if error.is_connect() {
            if lower.contains("certificate") || lower.contains("tls") || lower.contains("handshake")
            {
                return HttpClientError::Tls(message);
            }
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(url::Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects {
                max: self.max_redirects,
            };
        }

        if error.is_body() || error.is_decode() {
            return HttpClientError::Body(message);
        }

        HttpClientError::Other(message)
    }
}

/// Renders an error with its source chain; reqwest's top-level message alone
/// rarely says what went wrong.
fn full_message(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: &PreparedRequest,
    ) -> impl Future<Output = Result<ResponseSpec, HttpClientError>> + Send {
        let timeout_ms = request.timeout_ms();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), request.url.clone())
            .timeout(request.timeout);
        for header in request.headers.iter() {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        async move {
            let start = Instant::now();

            let response = builder
                .send()
                .await
                .map_err(|e| self.map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();
            let url = response.url().to_string();
            let headers = Self::collect_headers(response.headers());

            let body = response
                .bytes()
                .await
                .map_err(|e| self.map_error(&e, timeout_ms))?;

            // Timing covers the full body, not just the status line.
            let duration = start.elapsed();

            tracing::trace!(status, %url, bytes = body.len(), ?duration, "reqwest exchange complete");

            Ok(ResponseSpec::new(status, url, headers, &body, duration))
        }
    }
}
