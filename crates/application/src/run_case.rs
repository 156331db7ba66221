//! Run Test Case Use Case
//!
//! Executes a case's request, then evaluates its expectations against the
//! response, stopping at the first one that does not hold.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use httpcheck_domain::{ResponseSpec, TestCase, TestResults};
use serde::Serialize;
use tracing::Instrument;

use crate::error::{FailureKind, HarnessError, HarnessResult};
use crate::execute_request::ExecuteRequest;
use crate::ports::{Clock, HttpClient, ResponseEvaluator};

/// How a case ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Every expectation held.
    Passed,
    /// The case ended with an error.
    Failed {
        /// Error category.
        kind: FailureKind,
        /// Rendered error.
        message: String,
    },
}

/// Report for one executed case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    /// Case name.
    pub name: String,
    /// When the case started.
    pub started_at: DateTime<Utc>,
    /// Final outcome.
    #[serde(flatten)]
    pub outcome: CaseOutcome,
    /// Expectation results, when a response was obtained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<TestResults>,
    /// Wall time for the whole case, request included.
    pub duration_ms: u64,
}

impl CaseReport {
    /// Returns true if the case passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Passed)
    }
}

/// Use case for running a `TestCase` end to end.
pub struct RunTestCase<C: HttpClient> {
    executor: ExecuteRequest<C>,
    evaluator: Arc<dyn ResponseEvaluator>,
    clock: Arc<dyn Clock>,
}

impl<C: HttpClient> RunTestCase<C> {
    /// Creates the use case from its collaborators.
    #[must_use]
    pub fn new(
        executor: ExecuteRequest<C>,
        evaluator: Arc<dyn ResponseEvaluator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            executor,
            evaluator,
            clock,
        }
    }

    /// The request executor this use case drives.
    #[must_use]
    pub const fn executor(&self) -> &ExecuteRequest<C> {
        &self.executor
    }

    /// Executes the case and returns the response if every expectation
    /// held.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the case; for assertion failures, the
    /// first expectation that did not hold.
    pub async fn check(&self, case: &TestCase) -> HarnessResult<ResponseSpec> {
        let response = self.executor.execute(&case.request).await?;
        let results = self.evaluator.evaluate(&case.expectations, &response);
        results.into_result()?;
        Ok(response)
    }

    /// Executes the case and reports the outcome instead of returning an
    /// error.
    pub async fn run(&self, case: &TestCase) -> CaseReport {
        let span = tracing::info_span!("case", name = %case.name);
        self.run_in_span(case).instrument(span).await
    }

    async fn run_in_span(&self, case: &TestCase) -> CaseReport {
        let started_at = self.clock.now();
        let start = Instant::now();

        let (outcome, results) = match self.executor.execute(&case.request).await {
            Ok(response) => {
                let results = self.evaluator.evaluate(&case.expectations, &response);
                let outcome = match results.clone().into_result() {
                    Ok(()) => CaseOutcome::Passed,
                    Err(failure) => failed(&HarnessError::from(failure)),
                };
                (outcome, Some(results))
            }
            Err(e) => (failed(&e), None),
        };

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            CaseOutcome::Passed => tracing::info!(duration_ms, "case passed"),
            CaseOutcome::Failed { kind, message } => {
                tracing::warn!(duration_ms, kind = kind.title(), %message, "case failed");
            }
        }

        CaseReport {
            name: case.name.clone(),
            started_at,
            outcome,
            results,
            duration_ms,
        }
    }

    /// Runs every case in order; one failure does not stop the rest.
    pub async fn run_all(&self, cases: &[TestCase]) -> Vec<CaseReport> {
        let mut reports = Vec::with_capacity(cases.len());
        for case in cases {
            reports.push(self.run(case).await);
        }
        reports
    }
}

fn failed(error: &HarnessError) -> CaseOutcome {
    CaseOutcome::Failed {
        kind: error.kind(),
        message: error.to_string(),
    }
}
