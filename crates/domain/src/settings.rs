//! Harness configuration
//!
//! The echo endpoint is configuration, not a constant: the same cases run
//! against the live service or a local stub by changing `base_url`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};
use crate::request::{Headers, RequestDefaults};

/// Settings a harness is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Base URL that relative request paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// `User-Agent` sent unless a request supplies its own.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Extra headers sent with every request unless overridden.
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub default_headers: Headers,

    /// Maximum redirects followed before failing.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_base_url() -> String {
    "https://httpbin.org".to_string()
}

const fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    concat!("httpcheck/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_max_redirects() -> usize {
    10
}

impl HarnessConfig {
    /// Config targeting `base_url` with every other field defaulted.
    #[must_use]
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the timeout (builder pattern).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parses and checks the base URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the URL is malformed or not http(s).
    pub fn parsed_base_url(&self) -> DomainResult<Url> {
        let url = Url::parse(self.base_url.trim()).map_err(|e| {
            DomainError::InvalidConfig(format!("base_url '{}': {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidConfig(format!(
                "base_url '{}' must use http or https",
                self.base_url
            )));
        }
        Ok(url)
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a bad base URL or a zero timeout, and the
    /// header error for an invalid user agent or default header.
    pub fn validate(&self) -> DomainResult<()> {
        self.parsed_base_url()?;
        if self.timeout_ms == 0 {
            return Err(DomainError::InvalidConfig(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.headers().validate()
    }

    /// `User-Agent` with `default_headers` layered on top.
    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.set("User-Agent", self.user_agent.clone());
        self.default_headers.merged_over(&headers)
    }

    /// The values every request is resolved against.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the base URL is invalid.
    pub fn request_defaults(&self) -> DomainResult<RequestDefaults> {
        Ok(RequestDefaults {
            base_url: Some(self.parsed_base_url()?),
            headers: self.headers(),
            timeout: self.timeout(),
        })
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            default_headers: Headers::new(),
            max_redirects: default_max_redirects(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.base_url, "https://httpbin.org");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.user_agent.starts_with("httpcheck/"));
        assert_eq!(config.max_redirects, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config: HarnessConfig =
            serde_yaml::from_str("base_url: http://127.0.0.1:8080\ntimeout_ms: 500\n").unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn rejects_bad_base_url_and_zero_timeout() {
        assert!(HarnessConfig::for_base_url("ftp://example.com").validate().is_err());
        assert!(HarnessConfig::for_base_url("::nope").validate().is_err());

        let config = HarnessConfig {
            timeout_ms: 0,
            ..HarnessConfig::default()
        };
        assert!(matches!(config.validate(), Err(DomainError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_user_agent_with_control_bytes() {
        let config = HarnessConfig {
            user_agent: "httpcheck\u{1}".to_string(),
            ..HarnessConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DomainError::InvalidHeaderValue { name, .. }) if name == "User-Agent"
        ));
    }

    #[test]
    fn request_defaults_carry_user_agent_and_headers() {
        let mut config = HarnessConfig::for_base_url("http://localhost:9000");
        config.default_headers.set("Accept", "application/json");
        config.default_headers.set("User-Agent", "suite/2.0");

        let defaults = config.request_defaults().unwrap();

        assert_eq!(defaults.base_url.unwrap().as_str(), "http://localhost:9000/");
        assert_eq!(defaults.headers.get("user-agent"), Some("suite/2.0"));
        assert_eq!(defaults.headers.get("accept"), Some("application/json"));
        assert_eq!(defaults.timeout, Duration::from_secs(10));
    }
}
