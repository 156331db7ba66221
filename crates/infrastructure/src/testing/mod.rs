//! Response testing infrastructure.
//!
//! This module provides the test runner that checks expectations against HTTP responses.

mod runner;

pub use runner::TestRunner;
