//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name is not a valid HTTP token.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A header value contains forbidden characters.
    #[error("invalid header value for '{name}': {reason}")]
    InvalidHeaderValue {
        /// Header the value belongs to.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A query parameter value cannot be coerced to string form.
    #[error("invalid query value for '{key}': {reason}")]
    InvalidQueryValue {
        /// Parameter name.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The request body cannot be serialized.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A JSON path expression could not be parsed.
    #[error("invalid JSON path '{path}': {reason}")]
    InvalidJsonPath {
        /// The offending expression.
        path: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A configuration value is out of range or malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
