//! Echo route handlers.
//!
//! Every echo response is a JSON object describing the request that
//! produced it: `args`, `headers`, `origin`, and `url`, plus `data`, `form`,
//! and `json` for routes that accept a body.

use std::borrow::Cow;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{ConnectInfo, Path},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{any, delete, get, patch, post, put},
};
use serde_json::{Map, Value};

/// Longest delay `/delay/{ms}` will honour.
const MAX_DELAY_MS: u64 = 10_000;

const HTML_PAGE: &str = "<!DOCTYPE html>\n<html>\n  <head><title>httpcheck echo</title></head>\n  <body><h1>Not JSON</h1></body>\n</html>\n";

/// Builds the echo router.
pub fn router() -> Router {
    Router::new()
        .route("/get", get(echo_query))
        .route("/post", post(echo_body))
        .route("/put", put(echo_body))
        .route("/patch", patch(echo_body))
        .route("/delete", delete(echo_body))
        .route("/anything", any(echo_anything))
        .route("/anything/{*rest}", any(echo_anything))
        .route("/headers", get(echo_headers))
        .route("/user-agent", get(echo_user_agent))
        .route("/status/{code}", any(status))
        .route("/delay/{ms}", get(delay))
        .route("/html", get(html))
}

/// A query string or form body that does not decode to UTF-8. Answered
/// with 400 rather than echoed as an empty object.
#[derive(Debug, thiserror::Error)]
#[error("malformed {part}: {source}")]
struct Malformed {
    part: &'static str,
    #[source]
    source: std::string::FromUtf8Error,
}

impl IntoResponse for Malformed {
    fn into_response(self) -> Response {
        tracing::debug!(part = self.part, error = %self.source, "rejecting undecodable input");
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

type EchoResult = Result<Json<Value>, Malformed>;

/// The parts of a request every echo reports.
struct Echo<'a> {
    peer: SocketAddr,
    uri: &'a Uri,
    headers: &'a HeaderMap,
}

impl Echo<'_> {
    fn base(&self) -> Result<Map<String, Value>, Malformed> {
        let mut body = Map::new();
        body.insert("args".to_string(), query_args(self.uri.query())?);
        body.insert("headers".to_string(), Value::Object(title_case_headers(self.headers)));
        body.insert("origin".to_string(), Value::String(self.peer.ip().to_string()));
        body.insert("url".to_string(), Value::String(request_url(self.uri, self.headers)));
        Ok(body)
    }

    fn with_body(&self, bytes: &Bytes) -> Result<Map<String, Value>, Malformed> {
        let mut body = self.base()?;
        let form = if is_form(self.headers) {
            form_fields(bytes)?
        } else {
            Value::Object(Map::new())
        };
        let json = serde_json::from_slice(bytes).unwrap_or(Value::Null);

        body.insert(
            "data".to_string(),
            Value::String(String::from_utf8_lossy(bytes).into_owned()),
        );
        body.insert("form".to_string(), form);
        body.insert("json".to_string(), json);
        Ok(body)
    }
}

async fn echo_query(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
    headers: HeaderMap,
) -> EchoResult {
    let echo = Echo {
        peer,
        uri: &uri,
        headers: &headers,
    };
    Ok(Json(Value::Object(echo.base()?)))
}

async fn echo_body(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
    headers: HeaderMap,
    bytes: Bytes,
) -> EchoResult {
    let echo = Echo {
        peer,
        uri: &uri,
        headers: &headers,
    };
    Ok(Json(Value::Object(echo.with_body(&bytes)?)))
}

async fn echo_anything(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    bytes: Bytes,
) -> EchoResult {
    let echo = Echo {
        peer,
        uri: &uri,
        headers: &headers,
    };
    let mut body = echo.with_body(&bytes)?;
    body.insert("method".to_string(), Value::String(method.to_string()));
    Ok(Json(Value::Object(body)))
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    Json(serde_json::json!({ "headers": title_case_headers(&headers) }))
}

async fn echo_user_agent(headers: HeaderMap) -> Json<Value> {
    let agent = headers
        .get(header::USER_AGENT)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    Json(serde_json::json!({ "user-agent": agent }))
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => status.into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid status code").into_response(),
    }
}

async fn delay(
    Path(ms): Path<u64>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
    headers: HeaderMap,
) -> EchoResult {
    tokio::time::sleep(Duration::from_millis(ms.min(MAX_DELAY_MS))).await;
    let echo = Echo {
        peer,
        uri: &uri,
        headers: &headers,
    };
    Ok(Json(Value::Object(echo.base()?)))
}

async fn html() -> Response {
    (
        [(header::CONTENT_TYPE, mime::TEXT_HTML_UTF_8.as_ref())],
        HTML_PAGE,
    )
        .into_response()
}

/// Query parameters as JSON: one value stays a string, repeats become an
/// array.
fn query_args(query: Option<&str>) -> Result<Value, Malformed> {
    let pairs = decode_pairs(query.unwrap_or_default())
        .map_err(|source| Malformed { part: "query string", source })?;
    Ok(pairs_to_json(pairs))
}

fn form_fields(bytes: &[u8]) -> Result<Value, Malformed> {
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|source| Malformed { part: "form body", source })?;
    let pairs = decode_pairs(&text).map_err(|source| Malformed { part: "form body", source })?;
    Ok(pairs_to_json(pairs))
}

/// Splits `application/x-www-form-urlencoded` text into decoded pairs.
/// Empty segments are skipped and a key without `=` gets an empty value.
fn decode_pairs(encoded: &str) -> Result<Vec<(String, String)>, std::string::FromUtf8Error> {
    let decode = |part: &str| urlencoding::decode(&part.replace('+', " ")).map(Cow::into_owned);
    encoded
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| -> Result<_, std::string::FromUtf8Error> {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            Ok((decode(key)?, decode(value)?))
        })
        .collect()
}

fn pairs_to_json(pairs: Vec<(String, String)>) -> Value {
    let mut map = Map::new();
    for (key, value) in pairs {
        match map.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }
    Value::Object(map)
}

/// Request headers keyed by Title-Case name; repeated values joined by ",".
fn title_case_headers(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        let name = title_case(name.as_str());
        match map.get_mut(&name) {
            Some(Value::String(existing)) => {
                existing.push(',');
                existing.push_str(&value);
            }
            _ => {
                map.insert(name, Value::String(value));
            }
        }
    }
    map
}

fn title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// `http://{Host}{path-and-query}`, as the client addressed it.
fn request_url(uri: &Uri, headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    format!("http://{host}{path}")
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
}
