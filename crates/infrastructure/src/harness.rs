//! Harness composition root.
//!
//! Wires the reqwest adapter, the test runner, and the system clock into the
//! application use cases.

use std::path::Path;
use std::sync::Arc;

use httpcheck_application::{CaseReport, ExecuteRequest, HarnessResult, RunTestCase};
use httpcheck_domain::{HarnessConfig, RequestSpec, ResponseSpec, TestCase};
use serde::Serialize;
use url::Url;

use crate::adapters::{ReqwestHttpClient, SystemClock};
use crate::config::{ConfigError, load_config};
use crate::suite::TestSuite;
use crate::testing::TestRunner;

/// Sends requests and checks responses against one configured endpoint.
///
/// Holds only immutable configuration and a pooled client, so a single
/// harness can be shared by concurrently running tests.
pub struct Harness {
    config: HarnessConfig,
    runner: RunTestCase<ReqwestHttpClient>,
}

impl Harness {
    /// Builds a harness for `config`.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if the configuration does not validate and
    /// `Client` if the HTTP client cannot be built.
    pub fn new(config: HarnessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let defaults = config.request_defaults()?;
        let client = Arc::new(ReqwestHttpClient::new(&config)?);

        let runner = RunTestCase::new(
            ExecuteRequest::new(client, defaults),
            Arc::new(TestRunner::new()),
            Arc::new(SystemClock::new()),
        );

        tracing::debug!(base_url = %config.base_url, timeout_ms = config.timeout_ms, "harness ready");
        Ok(Self { config, runner })
    }

    /// Builds a harness targeting `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// As `new`.
    pub fn for_base_url(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(HarnessConfig::for_base_url(base_url))
    }

    /// Builds a harness from defaults, the optional YAML file, and the
    /// `HTTPCHECK_*` environment.
    ///
    /// # Errors
    ///
    /// Returns the first loading, validation, or client failure.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::new(load_config(path).await?)
    }

    /// The configuration this harness was built with.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The URL `request` would be sent to, query string included.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpec` if the URL cannot be resolved.
    pub fn resolve_url(&self, request: &RequestSpec) -> HarnessResult<Url> {
        Ok(request.full_url(self.runner.executor().defaults().base_url.as_ref())?)
    }

    /// Sends one request and returns the observed response.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpec`, `Transport`, or `Parse`.
    pub async fn execute(&self, request: &RequestSpec) -> HarnessResult<ResponseSpec> {
        self.runner.executor().execute(request).await
    }

    /// Runs a case and returns the response if every expectation held.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the case.
    pub async fn check(&self, case: &TestCase) -> HarnessResult<ResponseSpec> {
        self.runner.check(case).await
    }

    /// Runs a case and reports its outcome.
    pub async fn run(&self, case: &TestCase) -> CaseReport {
        self.runner.run(case).await
    }

    /// Runs every case of a suite in order.
    pub async fn run_suite(&self, suite: &TestSuite) -> SuiteReport {
        tracing::info!(suite = %suite.name, cases = suite.cases.len(), "running suite");
        let cases = self.runner.run_all(&suite.cases).await;
        SuiteReport::new(suite.name.clone(), cases)
    }
}

/// Outcome of a whole suite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub name: String,
    /// Number of passing cases.
    pub passed: usize,
    /// Number of failing cases.
    pub failed: usize,
    /// Per-case reports, in suite order.
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Tallies `cases`.
    #[must_use]
    pub fn new(name: String, cases: Vec<CaseReport>) -> Self {
        let passed = cases.iter().filter(|c| c.passed()).count();
        Self {
            name,
            failed: cases.len() - passed,
            passed,
            cases,
        }
    }

    /// Returns true if every case passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// The failing cases.
    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| !c.passed())
    }
}
