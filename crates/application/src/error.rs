//! Harness error taxonomy

use httpcheck_domain::{AssertionFailure, DomainError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::HttpClientError;

/// Everything that can end a test case.
///
/// Each error terminates the current case only; nothing is retried or
/// recovered locally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HarnessError {
    /// The request specification was malformed.
    #[error("invalid request specification: {0}")]
    InvalidSpec(#[from] DomainError),

    /// The network exchange failed.
    #[error("transport error: {0}")]
    Transport(#[from] HttpClientError),

    /// The body was not valid JSON though JSON was expected.
    #[error("response body is not valid JSON ({message}); body starts with: {preview}")]
    Parse {
        /// The parser's message.
        message: String,
        /// Start of the offending body.
        preview: String,
    },

    /// An expectation did not hold.
    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),
}

impl HarnessError {
    /// The category of this error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidSpec(_) => FailureKind::InvalidSpec,
            Self::Transport(_) => FailureKind::Transport,
            Self::Parse { .. } => FailureKind::Parse,
            Self::Assertion(_) => FailureKind::Assertion,
        }
    }
}

/// Error categories, for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Caller misuse.
    InvalidSpec,
    /// Network or timeout.
    Transport,
    /// Non-JSON body.
    Parse,
    /// Expectation mismatch.
    Assertion,
}

impl FailureKind {
    /// Returns a human-readable title for this category.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::InvalidSpec => "Invalid Request",
            Self::Transport => "Transport Error",
            Self::Parse => "Parse Error",
            Self::Assertion => "Assertion Failed",
        }
    }
}

/// Result type alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;
