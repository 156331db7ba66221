//! Response evaluation port

use httpcheck_domain::{Expectation, ResponseSpec, TestResults};

/// Checks expectations against a response.
///
/// Implementations evaluate in order and stop at the first expectation that
/// does not hold. They must not mutate the response.
pub trait ResponseEvaluator: Send + Sync {
    /// Evaluates `expectations` against `response`.
    fn evaluate(&self, expectations: &[Expectation], response: &ResponseSpec) -> TestResults;
}
