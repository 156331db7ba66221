//! Expectations over responses.
//!
//! An `Expectation` is a side-effect-free predicate over a `ResponseSpec`.
//! A `TestCase` pairs one request with an ordered list of expectations;
//! evaluation stops at the first one that does not hold.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::request::RequestSpec;

/// A single expectation to check against a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expectation {
    /// Check response status code.
    StatusCode {
        /// Expected status code or range.
        expected: StatusExpectation,
    },
    /// Check response time is strictly below a limit.
    ResponseTime {
        /// Exclusive upper bound in milliseconds.
        max_ms: u64,
    },
    /// Check a response header exists and optionally its value.
    HeaderExists {
        /// Header name (case-insensitive).
        name: String,
        /// Optional expected value.
        #[serde(default)]
        value: Option<String>,
    },
    /// Check a response header value contains a substring.
    HeaderContains {
        /// Header name (case-insensitive).
        name: String,
        /// Substring to look for.
        text: String,
    },
    /// Check a response header value matches a regex.
    HeaderMatches {
        /// Header name.
        name: String,
        /// Regex pattern to match.
        pattern: String,
    },
    /// Check a JSON path exists and optionally deep-equals a value.
    JsonPath {
        /// Path expression (e.g., "$.json.key").
        path: String,
        /// Expected value.
        #[serde(default)]
        expected: Option<Value>,
    },
    /// Compare the value at a JSON path with an operator.
    JsonPathMatches {
        /// Path expression.
        path: String,
        /// Comparison operator.
        operator: ComparisonOperator,
        /// Value to compare against.
        value: Value,
    },
    /// Check the value at a JSON path equals the URL the request was sent
    /// to (query string included).
    EchoesUrl {
        /// Path expression, usually `$.url`.
        #[serde(default = "default_url_path")]
        path: String,
    },
    /// Check body contains text.
    BodyContains {
        /// Text to search for.
        text: String,
        /// Case-insensitive search.
        #[serde(default)]
        ignore_case: bool,
    },
    /// Check body is valid JSON.
    IsJson,
}

fn default_url_path() -> String {
    "$.url".to_string()
}

impl Expectation {
    /// Status equals `code`.
    #[must_use]
    pub const fn status(code: u16) -> Self {
        Self::StatusCode {
            expected: StatusExpectation::Exact(code),
        }
    }

    /// Response arrived in less than `max_ms`.
    #[must_use]
    pub const fn response_time_within(max_ms: u64) -> Self {
        Self::ResponseTime { max_ms }
    }

    /// Response header is present.
    #[must_use]
    pub fn header(name: impl Into<String>) -> Self {
        Self::HeaderExists {
            name: name.into(),
            value: None,
        }
    }

    /// Response header value contains `text`.
    #[must_use]
    pub fn header_contains(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::HeaderContains {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Property at `path` is present.
    #[must_use]
    pub fn has(path: impl Into<String>) -> Self {
        Self::JsonPath {
            path: path.into(),
            expected: None,
        }
    }

    /// Property at `path` deep-equals `expected`.
    #[must_use]
    pub fn json_eq(path: impl Into<String>, expected: Value) -> Self {
        Self::JsonPath {
            path: path.into(),
            expected: Some(expected),
        }
    }

    /// Property at `path` compares with `value` under `operator`.
    #[must_use]
    pub fn json_compare(path: impl Into<String>, operator: ComparisonOperator, value: Value) -> Self {
        Self::JsonPathMatches {
            path: path.into(),
            operator,
            value,
        }
    }

    /// `$.url` equals the request URL.
    #[must_use]
    pub fn echoes_url() -> Self {
        Self::EchoesUrl {
            path: default_url_path(),
        }
    }

    /// Get a human-readable description of this expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusCode { expected } => format!("Status code {}", expected.description()),
            Self::ResponseTime { max_ms } => format!("Response time < {max_ms}ms"),
            Self::HeaderExists {
                name,
                value: Some(v),
            } => format!("Header '{name}' equals '{v}'"),
            Self::HeaderExists { name, value: None } => format!("Header '{name}' exists"),
            Self::HeaderContains { name, text } => format!("Header '{name}' contains '{text}'"),
            Self::HeaderMatches { name, pattern } => {
                format!("Header '{name}' matches /{pattern}/")
            }
            Self::JsonPath {
                path,
                expected: Some(v),
            } => format!("JSON {path} equals {v}"),
            Self::JsonPath {
                path,
                expected: None,
            } => format!("JSON {path} exists"),
            Self::JsonPathMatches {
                path,
                operator,
                value,
            } => format!("JSON {path} {} {value}", operator.symbol()),
            Self::EchoesUrl { path } => format!("JSON {path} equals the request URL"),
            Self::BodyContains { text, .. } => format!("Body contains '{text}'"),
            Self::IsJson => "Body is valid JSON".to_string(),
        }
    }

    /// The response field or path this expectation inspects.
    #[must_use]
    pub fn subject(&self) -> String {
        match self {
            Self::StatusCode { .. } => "status".to_string(),
            Self::ResponseTime { .. } => "duration".to_string(),
            Self::HeaderExists { name, .. }
            | Self::HeaderContains { name, .. }
            | Self::HeaderMatches { name, .. } => format!("header '{name}'"),
            Self::JsonPath { path, .. }
            | Self::JsonPathMatches { path, .. }
            | Self::EchoesUrl { path } => path.clone(),
            Self::BodyContains { .. } | Self::IsJson => "body".to_string(),
        }
    }

    /// The expected side of the comparison, for failure messages.
    #[must_use]
    pub fn expected_display(&self) -> Option<String> {
        match self {
            Self::StatusCode { expected } => Some(expected.description()),
            Self::ResponseTime { max_ms } => Some(format!("< {max_ms}ms")),
            Self::HeaderExists { value, .. } => value.clone(),
            Self::HeaderContains { text, .. } | Self::BodyContains { text, .. } => {
                Some(format!("contains '{text}'"))
            }
            Self::HeaderMatches { pattern, .. } => Some(format!("/{pattern}/")),
            Self::JsonPath { expected, .. } => expected.as_ref().map(ToString::to_string),
            Self::JsonPathMatches {
                operator, value, ..
            } => Some(format!("{} {value}", operator.symbol())),
            Self::EchoesUrl { .. } => Some("request URL".to_string()),
            Self::IsJson => None,
        }
    }
}

/// Expected status code value or range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Range of status codes (e.g., 200-299).
    Range {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
    /// One of multiple status codes.
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    /// Check if a status code matches this expectation.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => (*min..=*max).contains(&status),
            Self::OneOf(codes) => codes.contains(&status),
        }
    }

    /// Get description of the expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => format!("= {code}"),
            Self::Range { min, max } => format!("in {min}-{max}"),
            Self::OneOf(codes) => {
                let codes_str: Vec<_> = codes.iter().map(ToString::to_string).collect();
                format!("in [{}]", codes_str.join(", "))
            }
        }
    }

    /// Create a "success" expectation (200-299).
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }

    /// Create an exact status expectation.
    #[must_use]
    pub const fn exact(code: u16) -> Self {
        Self::Exact(code)
    }
}

impl Default for StatusExpectation {
    fn default() -> Self {
        Self::success()
    }
}

/// Comparison operators for value expectations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// Equal to.
    Equals,
    /// Not equal to.
    NotEquals,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal to.
    GreaterThanOrEqual,
    /// Less than.
    LessThan,
    /// Less than or equal to.
    LessThanOrEqual,
    /// Contains (for strings/arrays).
    Contains,
    /// Matches regex pattern.
    Matches,
}

impl ComparisonOperator {
    /// Get the symbol for this operator.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Contains => "contains",
            Self::Matches => "matches",
        }
    }
}

/// Result of checking a single expectation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// The expectation that was checked.
    pub expectation: Expectation,
    /// Whether it held.
    pub passed: bool,
    /// Actual value found (for display).
    pub actual: Option<String>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl AssertionResult {
    /// Create a passed result.
    #[must_use]
    pub const fn pass(expectation: Expectation) -> Self {
        Self {
            expectation,
            passed: true,
            actual: None,
            error: None,
        }
    }

    /// Create a passed result with actual value.
    #[must_use]
    pub fn pass_with_value(expectation: Expectation, actual: impl Into<String>) -> Self {
        Self {
            expectation,
            passed: true,
            actual: Some(actual.into()),
            error: None,
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn fail(expectation: Expectation, error: impl Into<String>) -> Self {
        Self {
            expectation,
            passed: false,
            actual: None,
            error: Some(error.into()),
        }
    }

    /// Create a failed result with actual value.
    #[must_use]
    pub fn fail_with_value(
        expectation: Expectation,
        actual: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            expectation,
            passed: false,
            actual: Some(actual.into()),
            error: Some(error.into()),
        }
    }

    /// Describes this result as a failure, or `None` if it passed.
    #[must_use]
    pub fn to_failure(&self) -> Option<AssertionFailure> {
        if self.passed {
            return None;
        }
        Some(AssertionFailure {
            description: self.expectation.description(),
            subject: self.expectation.subject(),
            expected: self.expectation.expected_display(),
            actual: self.actual.clone(),
            message: self
                .error
                .clone()
                .unwrap_or_else(|| "expectation did not hold".to_string()),
        })
    }
}

/// Why an expectation did not hold: which field, what was expected, what
/// was found.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{description} failed on {subject}: {message}")]
pub struct AssertionFailure {
    /// Human-readable expectation.
    pub description: String,
    /// Field or path inspected.
    pub subject: String,
    /// Expected value, when the expectation has one.
    pub expected: Option<String>,
    /// Actual value, when one was found.
    pub actual: Option<String>,
    /// Detailed message.
    pub message: String,
}

/// Results of evaluating a list of expectations against one response.
///
/// `results` holds every evaluated expectation in order; after the first
/// failure the rest are counted in `skipped`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResults {
    /// Individual results, in evaluation order.
    pub results: Vec<AssertionResult>,
    /// Number of expectations supplied.
    pub total: usize,
    /// Number that held.
    pub passed: usize,
    /// Number that did not hold (0 or 1 under short-circuit evaluation).
    pub failed: usize,
    /// Number never evaluated because an earlier one failed.
    pub skipped: usize,
    /// Evaluation time in milliseconds.
    pub duration_ms: u64,
}

impl TestResults {
    /// Create new test results from evaluated results and the number of
    /// expectations supplied.
    #[must_use]
    pub fn new(results: Vec<AssertionResult>, total: usize, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = results.len() - passed;

        Self {
            skipped: total.saturating_sub(results.len()),
            results,
            total,
            passed,
            failed,
            duration_ms,
        }
    }

    /// Check if all expectations held.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    /// The first result that did not hold.
    #[must_use]
    pub fn first_failure(&self) -> Option<&AssertionResult> {
        self.results.iter().find(|r| !r.passed)
    }

    /// Converts to `Ok(())` or the first failure.
    ///
    /// # Errors
    ///
    /// Returns the `AssertionFailure` of the first failing expectation.
    pub fn into_result(self) -> Result<(), AssertionFailure> {
        match self.first_failure().and_then(AssertionResult::to_failure) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

/// One request plus the expectations its response must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    /// Case name, used in reports and logs.
    pub name: String,
    /// The request to send.
    pub request: RequestSpec,
    /// Expectations, checked in order.
    #[serde(default, alias = "expect")]
    pub expectations: Vec<Expectation>,
}

impl TestCase {
    /// Create a case with no expectations.
    #[must_use]
    pub fn new(name: impl Into<String>, request: RequestSpec) -> Self {
        Self {
            name: name.into(),
            request,
            expectations: Vec::new(),
        }
    }

    /// Add an expectation (builder pattern).
    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    /// Add several expectations (builder pattern).
    #[must_use]
    pub fn expect_all(mut self, expectations: impl IntoIterator<Item = Expectation>) -> Self {
        self.expectations.extend(expectations);
        self
    }
}
