//! httpcheck Suite - echo-endpoint scenarios
//!
//! Each function builds one `TestCase` against an echo service. URLs are
//! relative, so the same scenarios run against the live service or the
//! local echo stub depending on the harness base URL.

use httpcheck_domain::{Expectation, RequestSpec, TestCase};
use rand::Rng;
use serde_json::json;

/// User agent sent by `custom_user_agent`.
pub const CUSTOM_USER_AGENT: &str = "MyCustomUserAgent/1.0";

/// Exclusive threshold for `response_time`, in milliseconds.
pub const RESPONSE_TIME_LIMIT_MS: u64 = 500;

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// GET `/get` answers 200 with `args`, `headers`, `origin`, and `url`.
#[must_use]
pub fn get_echo_shape() -> TestCase {
    TestCase::new("get returns echo fields", RequestSpec::get("/get")).expect_all([
        Expectation::status(200),
        Expectation::has("$.args"),
        Expectation::has("$.headers"),
        Expectation::has("$.origin"),
        Expectation::has("$.url"),
    ])
}

/// POST `/post` with a JSON body; the echoed `json.key` is `"value"`.
#[must_use]
pub fn post_json() -> TestCase {
    let request = RequestSpec::post("/post").with_json(json!({"key": "value"}));
    TestCase::new("post echoes json body", request).expect_all([
        Expectation::status(200),
        Expectation::has("$.json"),
        Expectation::json_eq("$.json.key", json!("value")),
    ])
}

/// PUT `/put`; the echoed `json` deep-equals the body sent.
#[must_use]
pub fn put_json() -> TestCase {
    let body = json!({"name": "John Doe", "age": 30});
    let request = RequestSpec::put("/put").with_json(body.clone());
    TestCase::new("put echoes json body", request).expect_all([
        Expectation::status(200),
        Expectation::json_eq("$.json", body),
    ])
}

/// DELETE `/delete` answers 200 and echoes the URL it was sent to.
#[must_use]
pub fn delete_echoes_url() -> TestCase {
    TestCase::new("delete echoes url", RequestSpec::delete("/delete"))
        .expect_all([Expectation::status(200), Expectation::echoes_url()])
}

/// A caller-supplied `User-Agent` replaces the harness default.
#[must_use]
pub fn custom_user_agent() -> TestCase {
    let request = RequestSpec::get("/get").with_header("User-Agent", CUSTOM_USER_AGENT);
    TestCase::new("custom user agent is echoed", request).expect_all([
        Expectation::status(200),
        Expectation::has("$.headers"),
        Expectation::json_eq("$.headers.User-Agent", json!(CUSTOM_USER_AGENT)),
    ])
}

/// Custom headers are echoed verbatim and the response is JSON.
#[must_use]
pub fn custom_headers() -> TestCase {
    let request = RequestSpec::get("/get")
        .with_header("X-Custom-Header", "CustomValue")
        .with_header("Another-Header", "AnotherValue");
    TestCase::new("custom headers are echoed", request).expect_all([
        Expectation::status(200),
        Expectation::header_contains("content-type", "application/json"),
        Expectation::json_eq("$.headers['X-Custom-Header']", json!("CustomValue")),
        Expectation::json_eq("$.headers['Another-Header']", json!("AnotherValue")),
    ])
}

/// Query mapping values come back as strings, numbers included.
#[must_use]
pub fn query_params() -> TestCase {
    let request = RequestSpec::get("/get")
        .with_query("name", "John Doe")
        .with_query("age", 30);
    TestCase::new("query parameters are echoed", request).expect_all([
        Expectation::status(200),
        Expectation::json_eq("$.args.name", json!("John Doe")),
        Expectation::json_eq("$.args.age", json!("30")),
    ])
}

/// Two random lowercase tokens embedded directly in the URL are echoed in
/// `args`.
pub fn random_query_params(rng: &mut impl Rng) -> TestCase {
    let first = random_token(rng, 5);
    let second = random_token(rng, 5);
    let request = RequestSpec::get(format!("/get?param1={first}&param2={second}"));
    TestCase::new("random query parameters are echoed", request).expect_all([
        Expectation::status(200),
        Expectation::json_eq("$.args.param1", json!(first)),
        Expectation::json_eq("$.args.param2", json!(second)),
    ])
}

/// GET `/get` echoes its own URL.
#[must_use]
pub fn get_echoes_url() -> TestCase {
    TestCase::new("get echoes url", RequestSpec::get("/get"))
        .expect_all([Expectation::status(200), Expectation::echoes_url()])
}

/// GET `/get` completes in under `RESPONSE_TIME_LIMIT_MS`.
///
/// Timing depends on the network; keep this apart from functional checks.
#[must_use]
pub fn response_time() -> TestCase {
    TestCase::new("get responds quickly", RequestSpec::get("/get")).expect_all([
        Expectation::status(200),
        Expectation::response_time_within(RESPONSE_TIME_LIMIT_MS),
    ])
}

/// Every functional scenario, in a stable order. `response_time` is left
/// out.
pub fn functional(rng: &mut impl Rng) -> Vec<TestCase> {
    vec![
        get_echo_shape(),
        post_json(),
        put_json(),
        delete_echoes_url(),
        custom_user_agent(),
        custom_headers(),
        query_params(),
        random_query_params(rng),
        get_echoes_url(),
    ]
}

/// `len` characters from `[0-9a-z]`.
pub fn random_token(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| char::from(TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}
