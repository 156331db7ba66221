//! httpcheck Echo - a local echo endpoint
//!
//! Reproduces the echo contract the harness relies on (`/get`, `/post`,
//! `/put`, `/delete`, and friends) so suites can run without network access.
//!
//! ```ignore
//! let server = EchoServer::spawn().await?;
//! let harness = Harness::for_base_url(server.base_url())?;
//! ```

pub mod routes;
pub mod server;

pub use routes::router;
pub use server::{EchoError, EchoServer};
