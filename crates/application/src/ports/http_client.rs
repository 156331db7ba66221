//! HTTP Client port

use std::future::Future;

use httpcheck_domain::{PreparedRequest, ResponseSpec};
use thiserror::Error;

/// Transport-level failures.
///
/// None of these are retried: each case models a single real interaction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// No complete response within the timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// Host name could not be resolved.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying message.
        message: String,
    },

    /// Nothing listening at the target.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// Connection could not be established for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS handshake or certificate problem.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Redirect limit exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Configured limit.
        max: usize,
    },

    /// The response body could not be read to the end.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Anything else the transport reports.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
pub trait HttpClient: Send + Sync {
    /// Sends a prepared request and returns the response once its body has
    /// been fully received.
    ///
    /// Implementations record `ResponseSpec::duration` from just before
    /// dispatch to just after the last body byte.
    ///
    /// # Errors
    ///
    /// Returns an `HttpClientError` for any transport failure.
    fn execute(
        &self,
        request: &PreparedRequest,
    ) -> impl Future<Output = Result<ResponseSpec, HttpClientError>> + Send;
}
