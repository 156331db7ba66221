//! Declarative YAML test suites.
//!
//! ```yaml
//! name: httpbin
//! cases:
//!   - name: post echoes json
//!     request:
//!       method: POST
//!       url: /post
//!       body: { type: json, content: { key: value } }
//!     expect:
//!       - { type: status_code, expected: 200 }
//!       - { type: json_path, path: $.json, expected: { key: value } }
//! ```

use std::path::{Path, PathBuf};

use httpcheck_domain::TestCase;
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Error type for suite loading.
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    /// IO error reading a file or directory.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A document does not describe a suite, e.g. an unknown expectation type.
    #[error("invalid suite {origin}: {source}")]
    Yaml {
        /// File name or other label for the document.
        origin: String,
        /// Underlying error.
        source: serde_yaml::Error,
    },

    /// Two cases in one suite share a name.
    #[error("suite {origin} has duplicate case name '{name}'")]
    DuplicateCase {
        /// File name or other label for the document.
        origin: String,
        /// The repeated name.
        name: String,
    },
}

/// A named list of test cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Suite name; defaults to the file stem when loaded from disk.
    #[serde(default)]
    pub name: String,
    /// Cases, in file order.
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    /// Cases whose name contains `pattern`.
    pub fn matching<'a>(&'a self, pattern: &'a str) -> impl Iterator<Item = &'a TestCase> + 'a {
        self.cases.iter().filter(move |case| case.name.contains(pattern))
    }
}

/// Parses a suite from a YAML string.
///
/// # Errors
///
/// Returns `Yaml` if the document is malformed and `DuplicateCase` if two
/// cases share a name.
pub fn parse_suite(yaml: &str, origin: &str) -> Result<TestSuite, SuiteError> {
    let suite: TestSuite = serde_yaml::from_str(yaml).map_err(|source| SuiteError::Yaml {
        origin: origin.to_string(),
        source,
    })?;

    for (i, case) in suite.cases.iter().enumerate() {
        if suite.cases[..i].iter().any(|other| other.name == case.name) {
            return Err(SuiteError::DuplicateCase {
                origin: origin.to_string(),
                name: case.name.clone(),
            });
        }
    }

    Ok(suite)
}

/// Loads a suite from a YAML file.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, otherwise as `parse_suite`.
pub async fn load_suite_file(path: impl AsRef<Path>) -> Result<TestSuite, SuiteError> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let content = fs::read_to_string(path).await.map_err(|source| SuiteError::Io {
        path: origin.clone(),
        source,
    })?;

    let mut suite = parse_suite(&content, &origin)?;
    if suite.name.is_empty() {
        suite.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    tracing::debug!(path = %origin, cases = suite.cases.len(), "loaded suite");
    Ok(suite)
}

/// Loads every `.yaml` / `.yml` file directly inside `dir`, sorted by file
/// name.
///
/// # Errors
///
/// Returns the first IO or parse failure.
pub async fn load_suite_dir(dir: impl AsRef<Path>) -> Result<Vec<TestSuite>, SuiteError> {
    let dir = dir.as_ref();
    let io_err = |source| SuiteError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut entries = fs::read_dir(dir).await.map_err(io_err)?;
    let mut paths: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        if path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
        {
            paths.push(path);
        }
    }
    paths.sort();

    let mut suites = Vec::with_capacity(paths.len());
    for path in paths {
        suites.push(load_suite_file(&path).await?);
    }
    Ok(suites)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use httpcheck_domain::{Expectation, HttpMethod};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SUITE: &str = r#"
name: echo
cases:
  - name: query parameters
    request:
      url: /get
      qs: { name: John Doe, age: 30 }
    expect:
      - { type: status_code, expected: 200 }
      - { type: json_path, path: $.args.age, expected: "30" }
  - name: put json
    request:
      method: PUT
      url: /put
      body: { type: json, content: { name: John Doe, age: 30 } }
    expect:
      - { type: json_path, path: $.json, expected: { name: John Doe, age: 30 } }
"#;

    #[test]
    fn test_parse_suite() {
        let suite = parse_suite(SUITE, "inline").unwrap();

        assert_eq!(suite.name, "echo");
        assert_eq!(suite.cases.len(), 2);

        let first = &suite.cases[0];
        assert_eq!(first.request.method, HttpMethod::Get);
        assert_eq!(first.request.query.get("age"), Some("30"));
        assert_eq!(first.expectations[0], Expectation::status(200));

        let second = &suite.cases[1];
        assert_eq!(second.request.method, HttpMethod::Put);
        assert_eq!(
            second.expectations[0],
            Expectation::json_eq("$.json", json!({"name": "John Doe", "age": 30}))
        );
    }

    #[test]
    fn test_unknown_expectation_type_names_origin() {
        let yaml = "cases:\n  - name: x\n    request: { url: /get }\n    expect:\n      - { type: telepathy }\n";
        let err = parse_suite(yaml, "broken.yaml").unwrap_err();

        assert!(matches!(err, SuiteError::Yaml { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_duplicate_case_names() {
        let yaml = "cases:\n  - { name: a, request: { url: /get } }\n  - { name: a, request: { url: /get } }\n";
        let err = parse_suite(yaml, "dup.yaml").unwrap_err();
        assert!(matches!(err, SuiteError::DuplicateCase { name, .. } if name == "a"));
    }

    #[test]
    fn test_matching() {
        let suite = parse_suite(SUITE, "inline").unwrap();
        let names: Vec<_> = suite.matching("put").map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["put json"]);
    }

    #[tokio::test]
    async fn test_load_suite_file_defaults_name_to_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoke.yaml");
        std::fs::write(&path, "cases:\n  - { name: get, request: { url: /get } }\n").unwrap();

        let suite = load_suite_file(&path).await.unwrap();

        assert_eq!(suite.name, "smoke");
        assert_eq!(suite.cases[0].request.url, "/get");
    }

    #[tokio::test]
    async fn test_load_suite_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yml"), "cases: []\n").unwrap();
        std::fs::write(dir.path().join("a.yaml"), SUITE).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let suites = load_suite_dir(dir.path()).await.unwrap();

        let names: Vec<_> = suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["echo", "b"]);
    }
}
