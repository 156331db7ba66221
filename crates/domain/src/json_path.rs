//! A small JSONPath subset for addressing fields of a response body.
//!
//! Supported forms: `$`, `$.field`, `$.a.b`, `$.items[0]`, and bracketed
//! keys (`$['X-Custom-Header']`, `$.headers["User-Agent"]`). Dotted segments
//! run until the next `.` or `[`, so `$.headers.User-Agent` works as written.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns `InvalidJsonPath` describing the first syntax problem.
    pub fn parse(path: &str) -> DomainResult<Self> {
        let trimmed = path.trim();
        let invalid = |reason: String| DomainError::InvalidJsonPath {
            path: trimmed.to_string(),
            reason,
        };

        let rest = trimmed
            .strip_prefix('$')
            .ok_or_else(|| invalid("must start with '$'".to_string()))?;

        let mut segments = Vec::new();
        let mut chars = rest.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    let mut key = String::new();
                    while let Some(&c) = chars.peek() {
                        if c == '.' || c == '[' {
                            break;
                        }
                        key.push(c);
                        chars.next();
                    }
                    if key.is_empty() {
                        return Err(invalid("empty segment after '.'".to_string()));
                    }
                    segments.push(Segment::Key(key));
                }
                '[' => match chars.peek().copied() {
                    Some(quote @ ('\'' | '"')) => {
                        chars.next();
                        let mut key = String::new();
                        loop {
                            match chars.next() {
                                Some(c) if c == quote => break,
                                Some(c) => key.push(c),
                                None => return Err(invalid("unterminated quoted key".to_string())),
                            }
                        }
                        if chars.next() != Some(']') {
                            return Err(invalid("expected ']' after quoted key".to_string()));
                        }
                        segments.push(Segment::Key(key));
                    }
                    _ => {
                        let mut index = String::new();
                        loop {
                            match chars.next() {
                                Some(']') => break,
                                Some(c) => index.push(c),
                                None => return Err(invalid("unterminated '['".to_string())),
                            }
                        }
                        let index = index
                            .trim()
                            .parse::<usize>()
                            .map_err(|_| invalid(format!("invalid array index '{index}'")))?;
                        segments.push(Segment::Index(index));
                    }
                },
                other => return Err(invalid(format!("unexpected character '{other}'"))),
            }
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Returns the value at this path, or `None` if any step is missing.
    #[must_use]
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| match segment {
                Segment::Key(key) => current.as_object()?.get(key),
                Segment::Index(index) => current.as_array()?.get(*index),
            })
    }

    /// The expression as written (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for JsonPath {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn echo() -> Value {
        json!({
            "args": {"name": "John Doe", "age": "30"},
            "headers": {"User-Agent": "MyCustomUserAgent/1.0", "X-Custom-Header": "CustomValue"},
            "items": [{"id": 1}, {"id": 2}],
            "url": "https://httpbin.org/get"
        })
    }

    #[test]
    fn test_root_path() {
        let path = JsonPath::parse("$").unwrap();
        assert_eq!(path.lookup(&echo()), Some(&echo()));
        assert_eq!(path.lookup(&json!(null)), Some(&json!(null)));
    }

    #[test]
    fn test_dotted_lookup() {
        let body = echo();
        let path: JsonPath = "$.args.age".parse().unwrap();
        assert_eq!(path.lookup(&body), Some(&json!("30")));
    }

    #[test]
    fn test_hyphenated_segment() {
        let body = echo();
        let path = JsonPath::parse("$.headers.User-Agent").unwrap();
        assert_eq!(path.lookup(&body), Some(&json!("MyCustomUserAgent/1.0")));
    }

    #[test]
    fn test_bracketed_keys() {
        let body = echo();
        let single = JsonPath::parse("$.headers['X-Custom-Header']").unwrap();
        let double = JsonPath::parse(r#"$["headers"]["X-Custom-Header"]"#).unwrap();
        assert_eq!(single.lookup(&body), Some(&json!("CustomValue")));
        assert_eq!(double.lookup(&body), Some(&json!("CustomValue")));
    }

    #[test]
    fn test_array_index() {
        let body = echo();
        let path = JsonPath::parse("$.items[1].id").unwrap();
        assert_eq!(path.lookup(&body), Some(&json!(2)));
        assert_eq!(JsonPath::parse("$.items[5]").unwrap().lookup(&body), None);
    }

    #[test]
    fn test_missing_and_type_mismatch() {
        let body = echo();
        assert_eq!(JsonPath::parse("$.json").unwrap().lookup(&body), None);
        assert_eq!(JsonPath::parse("$.url.host").unwrap().lookup(&body), None);
        assert_eq!(JsonPath::parse("$.args[0]").unwrap().lookup(&body), None);
    }

    #[test]
    fn test_syntax_errors() {
        for bad in ["args", "$.", "$..a", "$.a[", "$.a[x]", "$['a'", "$x"] {
            assert!(
                matches!(JsonPath::parse(bad), Err(DomainError::InvalidJsonPath { .. })),
                "expected {bad} to be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trips_text() {
        let path = JsonPath::parse("  $.json.key ").unwrap();
        assert_eq!(path.to_string(), "$.json.key");
    }
}
