//! Harness configuration loading.
//!
//! Configuration comes from three layers, later ones winning:
//! built-in defaults, an optional YAML file, and `HTTPCHECK_*` environment
//! variables.

use std::path::Path;

use httpcheck_application::HttpClientError;
use httpcheck_domain::{DomainError, HarnessConfig};
use tokio::fs;

/// Overrides `base_url`.
pub const ENV_BASE_URL: &str = "HTTPCHECK_BASE_URL";
/// Overrides `timeout_ms`.
pub const ENV_TIMEOUT_MS: &str = "HTTPCHECK_TIMEOUT_MS";
/// Overrides `user_agent`.
pub const ENV_USER_AGENT: &str = "HTTPCHECK_USER_AGENT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that could not be read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid YAML for `HarnessConfig`.
    #[error("invalid config file {path}: {source}")]
    Yaml {
        /// Offending file.
        path: String,
        /// Underlying error.
        source: serde_yaml::Error,
    },

    /// An environment variable holds an unusable value.
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },

    /// The resulting configuration failed validation.
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// The HTTP client could not be built from the configuration.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] HttpClientError),
}

/// Parses a YAML document into a validated `HarnessConfig`.
///
/// Missing fields take their defaults.
///
/// # Errors
///
/// Returns `Yaml` for malformed input and `Invalid` if validation fails.
pub fn parse_config(yaml: &str, origin: &str) -> Result<HarnessConfig, ConfigError> {
    let config: HarnessConfig = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Yaml {
        path: origin.to_string(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads a `HarnessConfig` from a YAML file.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, otherwise as `parse_config`.
pub async fn load_config_file(path: impl AsRef<Path>) -> Result<HarnessConfig, ConfigError> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let content = fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
        path: origin.clone(),
        source,
    })?;
    tracing::debug!(path = %origin, "loaded harness config");
    parse_config(&content, &origin)
}

/// Applies `HTTPCHECK_*` overrides read through `lookup`.
///
/// # Errors
///
/// Returns `InvalidEnv` if the timeout is not a positive integer, and
/// `Invalid` if the result fails validation.
pub fn apply_env_overrides(
    mut config: HarnessConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<HarnessConfig, ConfigError> {
    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.base_url = base_url;
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
        config.timeout_ms = raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or(ConfigError::InvalidEnv {
                name: ENV_TIMEOUT_MS,
                value: raw,
            })?;
    }
    if let Some(user_agent) = lookup(ENV_USER_AGENT) {
        config.user_agent = user_agent;
    }
    config.validate()?;
    Ok(config)
}

/// Defaults, then the optional file, then the process environment.
///
/// # Errors
///
/// Returns the first loading, parsing, or validation failure.
pub async fn load_config(path: Option<&Path>) -> Result<HarnessConfig, ConfigError> {
    let config = match path {
        Some(path) => load_config_file(path).await?,
        None => HarnessConfig::default(),
    };
    apply_env_overrides(config, |name| std::env::var(name).ok())
}
