//! HTTP Request domain types

mod body;
mod header;
mod method;
mod prepared;
mod query;
mod spec;

pub use body::RequestBody;
pub use header::{Header, Headers};
pub use method::HttpMethod;
pub use prepared::{PreparedRequest, RequestDefaults};
pub use query::{QueryParam, QueryParams, coerce_scalar};
pub use spec::RequestSpec;
