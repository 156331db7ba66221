//! httpcheck Domain - Core types
//!
//! This crate defines the domain model of the HTTP assertion harness:
//! request specifications, response observations, expectations, and the
//! harness configuration. All types here are pure Rust with no I/O.

pub mod error;
pub mod json_path;
pub mod request;
pub mod response;
pub mod settings;
pub mod testing;

pub use error::{DomainError, DomainResult};
pub use json_path::JsonPath;
pub use request::{HttpMethod, PreparedRequest, RequestBody, RequestDefaults, RequestSpec};
pub use response::{ResponseSpec, StatusCode};
pub use settings::HarnessConfig;
pub use testing::{
    AssertionFailure, AssertionResult, ComparisonOperator, Expectation, StatusExpectation,
    TestCase, TestResults,
};
