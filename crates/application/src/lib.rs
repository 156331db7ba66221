//! httpcheck Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for the transport, evaluator, and clock)
//! - Use case orchestration (execute a request, run a test case)
//! - The harness error taxonomy

pub mod error;
pub mod execute_request;
pub mod ports;
pub mod run_case;

pub use error::{FailureKind, HarnessError, HarnessResult};
pub use execute_request::ExecuteRequest;
pub use ports::{Clock, HttpClient, HttpClientError, ResponseEvaluator};
pub use run_case::{CaseOutcome, CaseReport, RunTestCase};
