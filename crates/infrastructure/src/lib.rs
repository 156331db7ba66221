//! httpcheck Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration and suite loading
//! and the `Harness` that wires them together.

pub mod adapters;
pub mod config;
pub mod harness;
pub mod logging;
pub mod suite;
pub mod testing;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use config::{ConfigError, load_config, load_config_file, parse_config};
pub use harness::{Harness, SuiteReport};
pub use logging::init_tracing;
pub use suite::{SuiteError, TestSuite, load_suite_dir, load_suite_file, parse_suite};
pub use testing::TestRunner;
