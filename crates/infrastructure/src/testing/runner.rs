//! Test runner implementation.
//!
//! Checks expectations against HTTP responses and produces test results.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use httpcheck_application::ports::ResponseEvaluator;
use httpcheck_domain::testing::{
    AssertionResult, ComparisonOperator, Expectation, StatusExpectation, TestResults,
};
use httpcheck_domain::{JsonPath, ResponseSpec};
use regex::Regex;
use serde_json::Value;

/// Characters of body shown when a body expectation fails.
const BODY_PREVIEW_CHARS: usize = 100;

/// Evaluates expectations in order, stopping at the first that does not
/// hold.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestRunner;

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Run expectations against a response, short-circuiting on the first
    /// failure.
    #[must_use]
    pub fn run(&self, expectations: &[Expectation], response: &ResponseSpec) -> TestResults {
        let start = Instant::now();
        let mut results = Vec::with_capacity(expectations.len());

        for expectation in expectations {
            let result = self.run_expectation(expectation, response);
            let failed = !result.passed;
            if failed {
                tracing::debug!(
                    expectation = %expectation.description(),
                    error = result.error.as_deref().unwrap_or_default(),
                    "expectation failed"
                );
            }
            results.push(result);

            if failed {
                break;
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        TestResults::new(results, expectations.len(), duration_ms)
    }

    /// Check a single expectation against a response.
    #[must_use]
    pub fn run_expectation(&self, expectation: &Expectation, response: &ResponseSpec) -> AssertionResult {
        match expectation {
            Expectation::StatusCode { expected } => {
                Self::check_status_code(expectation, response, expected)
            }
            Expectation::ResponseTime { max_ms } => {
                Self::check_response_time(expectation, response, *max_ms)
            }
            Expectation::HeaderExists { name, value } => {
                Self::check_header_exists(expectation, response, name, value.as_deref())
            }
            Expectation::HeaderContains { name, text } => {
                Self::check_header_contains(expectation, response, name, text)
            }
            Expectation::HeaderMatches { name, pattern } => {
                Self::check_header_matches(expectation, response, name, pattern)
            }
            Expectation::JsonPath { path, expected } => {
                Self::check_json_path(expectation, response, path, expected.as_ref())
            }
            Expectation::JsonPathMatches {
                path,
                operator,
                value,
            } => Self::check_json_path_matches(expectation, response, path, *operator, value),
            Expectation::EchoesUrl { path } => Self::check_echoes_url(expectation, response, path),
            Expectation::BodyContains { text, ignore_case } => {
                Self::check_body_contains(expectation, response, text, *ignore_case)
            }
            Expectation::IsJson => Self::check_is_json(expectation, response),
        }
    }

    fn check_status_code(
        expectation: &Expectation,
        response: &ResponseSpec,
        expected: &StatusExpectation,
    ) -> AssertionResult {
        let actual = response.status;
        if expected.matches(actual) {
            AssertionResult::pass_with_value(expectation.clone(), actual.to_string())
        } else {
            AssertionResult::fail_with_value(
                expectation.clone(),
                actual.to_string(),
                format!("Expected status {}, got {actual}", expected.description()),
            )
        }
    }

    fn check_response_time(
        expectation: &Expectation,
        response: &ResponseSpec,
        max_ms: u64,
    ) -> AssertionResult {
        let actual = format!("{:.1}ms", response.duration.as_secs_f64() * 1000.0);
        if response.duration < Duration::from_millis(max_ms) {
            AssertionResult::pass_with_value(expectation.clone(), actual)
        } else {
            AssertionResult::fail_with_value(
                expectation.clone(),
                actual.clone(),
                format!("Response took {actual}, expected < {max_ms}ms"),
            )
        }
    }

    fn check_header_exists(
        expectation: &Expectation,
        response: &ResponseSpec,
        name: &str,
        expected_value: Option<&str>,
    ) -> AssertionResult {
        let Some(actual) = response.get_header(name) else {
            return AssertionResult::fail(expectation.clone(), format!("Header '{name}' not found"));
        };
        match expected_value {
            Some(expected) if actual != expected => AssertionResult::fail_with_value(
                expectation.clone(),
                actual.clone(),
                format!("Header '{name}' value mismatch: expected '{expected}', got '{actual}'"),
            ),
            _ => AssertionResult::pass_with_value(expectation.clone(), actual.clone()),
        }
    }

    fn check_header_contains(
        expectation: &Expectation,
        response: &ResponseSpec,
        name: &str,
        text: &str,
    ) -> AssertionResult {
        match response.get_header(name) {
            Some(actual) if actual.contains(text) => {
                AssertionResult::pass_with_value(expectation.clone(), actual.clone())
            }
            Some(actual) => AssertionResult::fail_with_value(
                expectation.clone(),
                actual.clone(),
                format!("Header '{name}' value '{actual}' does not contain '{text}'"),
            ),
            None => AssertionResult::fail(expectation.clone(), format!("Header '{name}' not found")),
        }
    }

    fn check_header_matches(
        expectation: &Expectation,
        response: &ResponseSpec,
        name: &str,
        pattern: &str,
    ) -> AssertionResult {
        let Some(actual) = response.get_header(name) else {
            return AssertionResult::fail(expectation.clone(), format!("Header '{name}' not found"));
        };
        match Regex::new(pattern) {
            Ok(regex) if regex.is_match(actual) => {
                AssertionResult::pass_with_value(expectation.clone(), actual.clone())
            }
            Ok(_) => AssertionResult::fail_with_value(
                expectation.clone(),
                actual.clone(),
                format!("Header '{name}' value '{actual}' does not match pattern '{pattern}'"),
            ),
            Err(e) => AssertionResult::fail(
                expectation.clone(),
                format!("Invalid regex pattern '{pattern}': {e}"),
            ),
        }
    }

    fn check_json_path(
        expectation: &Expectation,
        response: &ResponseSpec,
        path: &str,
        expected: Option<&Value>,
    ) -> AssertionResult {
        let value = match query_json_path(response, path) {
            Ok(value) => value,
            Err(message) => return AssertionResult::fail(expectation.clone(), message),
        };

        match expected {
            Some(expected) if value.as_ref() != expected => AssertionResult::fail_with_value(
                expectation.clone(),
                value.to_string(),
                format!("JSON path '{path}' value mismatch: expected {expected}, got {value}"),
            ),
            _ => AssertionResult::pass_with_value(expectation.clone(), value.to_string()),
        }
    }

    fn check_json_path_matches(
        expectation: &Expectation,
        response: &ResponseSpec,
        path: &str,
        operator: ComparisonOperator,
        expected: &Value,
    ) -> AssertionResult {
        let value = match query_json_path(response, path) {
            Ok(value) => value,
            Err(message) => return AssertionResult::fail(expectation.clone(), message),
        };

        if compare_json_values(&value, operator, expected) {
            AssertionResult::pass_with_value(expectation.clone(), value.to_string())
        } else {
            AssertionResult::fail_with_value(
                expectation.clone(),
                value.to_string(),
                format!(
                    "JSON path '{path}' comparison failed: {value} {} {expected}",
                    operator.symbol()
                ),
            )
        }
    }

    fn check_echoes_url(
        expectation: &Expectation,
        response: &ResponseSpec,
        path: &str,
    ) -> AssertionResult {
        let value = match query_json_path(response, path) {
            Ok(value) => value,
            Err(message) => return AssertionResult::fail(expectation.clone(), message),
        };

        match value.as_str() {
            Some(echoed) if echoed == response.url => {
                AssertionResult::pass_with_value(expectation.clone(), echoed)
            }
            _ => AssertionResult::fail_with_value(
                expectation.clone(),
                value.to_string(),
                format!("JSON path '{path}' is {value}, expected \"{}\"", response.url),
            ),
        }
    }

    fn check_body_contains(
        expectation: &Expectation,
        response: &ResponseSpec,
        text: &str,
        ignore_case: bool,
    ) -> AssertionResult {
        let body = &response.body;
        let contains = if ignore_case {
            body.to_lowercase().contains(&text.to_lowercase())
        } else {
            body.contains(text)
        };

        if contains {
            AssertionResult::pass(expectation.clone())
        } else {
            AssertionResult::fail_with_value(
                expectation.clone(),
                response.body_preview(BODY_PREVIEW_CHARS),
                format!("Body does not contain '{text}'"),
            )
        }
    }

    fn check_is_json(expectation: &Expectation, response: &ResponseSpec) -> AssertionResult {
        if response.json.is_some() {
            return AssertionResult::pass(expectation.clone());
        }
        match response.parse_json() {
            Ok(_) => AssertionResult::pass(expectation.clone()),
            Err(e) => AssertionResult::fail_with_value(
                expectation.clone(),
                response.body_preview(BODY_PREVIEW_CHARS),
                format!("Body is not valid JSON: {e}"),
            ),
        }
    }
}

impl ResponseEvaluator for TestRunner {
    fn evaluate(&self, expectations: &[Expectation], response: &ResponseSpec) -> TestResults {
        self.run(expectations, response)
    }
}

/// Resolves `path` in the response's JSON body.
///
/// Uses the body parsed at execution time when present, otherwise parses on
/// demand. Every way of not finding a value is reported as a message.
fn query_json_path<'a>(response: &'a ResponseSpec, path: &str) -> Result<Cow<'a, Value>, String> {
    let path = JsonPath::parse(path).map_err(|e| e.to_string())?;

    match response.json_body() {
        Some(Cow::Borrowed(json)) => path
            .lookup(json)
            .map(Cow::Borrowed)
            .ok_or_else(|| format!("JSON path '{path}' not found")),
        Some(Cow::Owned(json)) => path
            .lookup(&json)
            .cloned()
            .map(Cow::Owned)
            .ok_or_else(|| format!("JSON path '{path}' not found")),
        None => Err(match response.parse_json() {
            Err(e) => format!("Failed to parse body as JSON: {e}"),
            Ok(_) => format!("JSON path '{path}' not found"),
        }),
    }
}

/// Compare two JSON values using the given operator.
fn compare_json_values(actual: &Value, operator: ComparisonOperator, expected: &Value) -> bool {
    match operator {
        ComparisonOperator::Equals => actual == expected,
        ComparisonOperator::NotEquals => actual != expected,
        ComparisonOperator::GreaterThan => compare_numeric(actual, expected, |a, b| a > b),
        ComparisonOperator::GreaterThanOrEqual => compare_numeric(actual, expected, |a, b| a >= b),
        ComparisonOperator::LessThan => compare_numeric(actual, expected, |a, b| a < b),
        ComparisonOperator::LessThanOrEqual => compare_numeric(actual, expected, |a, b| a <= b),
        ComparisonOperator::Contains => match (actual, expected) {
            (Value::String(s), Value::String(needle)) => s.contains(needle.as_str()),
            (Value::Array(arr), _) => arr.contains(expected),
            (Value::Object(map), Value::String(key)) => map.contains_key(key),
            _ => false,
        },
        ComparisonOperator::Matches => {
            if let (Value::String(s), Value::String(pattern)) = (actual, expected) {
                Regex::new(pattern).is_ok_and(|re| re.is_match(s))
            } else {
                false
            }
        }
    }
}

/// Compare numeric values.
fn compare_numeric<F>(actual: &Value, expected: &Value, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}
