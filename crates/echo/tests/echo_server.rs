//! HTTP-level tests for the echo server.

#![allow(clippy::unwrap_used)]

use httpcheck_echo::EchoServer;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn get_json(client: &reqwest::Client, url: &str) -> Value {
    client.get(url).send().await.unwrap().json().await.unwrap()
}

#[tokio::test]
async fn get_echoes_args_headers_origin_and_url() {
    let server = EchoServer::spawn().await.unwrap();
    let client = reqwest::Client::new();
    let url = format!("{}/get?name=John+Doe&age=30", server.base_url());

    let response = client
        .get(&url)
        .header("X-Custom-Header", "CustomValue")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .contains("application/json")
    );

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["args"], json!({"name": "John Doe", "age": "30"}));
    assert_eq!(body["headers"]["X-Custom-Header"], json!("CustomValue"));
    assert_eq!(body["origin"], json!("127.0.0.1"));
    assert_eq!(body["url"], json!(url));
}

#[tokio::test]
async fn post_and_put_echo_json_body() {
    let server = EchoServer::spawn().await.unwrap();
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{}/post", server.base_url()))
        .json(&json!({"key": "value"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["json"], json!({"key": "value"}));
    assert_eq!(body["data"], json!(r#"{"key":"value"}"#));

    let body: Value = client
        .put(format!("{}/put", server.base_url()))
        .json(&json!({"name": "John Doe", "age": 30}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["json"], json!({"name": "John Doe", "age": 30}));
}

#[tokio::test]
async fn post_form_body_is_echoed_as_form() {
    let server = EchoServer::spawn().await.unwrap();
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{}/post", server.base_url()))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("a=1&b=two")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["form"], json!({"a": "1", "b": "two"}));
    assert_eq!(body["json"], Value::Null);
}

#[tokio::test]
async fn delete_echoes_url() {
    let server = EchoServer::spawn().await.unwrap();
    let client = reqwest::Client::new();
    let url = format!("{}/delete", server.base_url());

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["url"], json!(url));
}

#[tokio::test]
async fn wrong_method_is_rejected() {
    let server = EchoServer::spawn().await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/get", server.base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 405);
}

#[tokio::test]
async fn anything_reports_method() {
    let server = EchoServer::spawn().await.unwrap();
    let client = reqwest::Client::new();

    let body: Value = client
        .patch(format!("{}/anything/deep/path", server.base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["method"], json!("PATCH"));
}

#[tokio::test]
async fn status_route_returns_requested_code() {
    let server = EchoServer::spawn().await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/status/418", server.base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 418);
}

#[tokio::test]
async fn html_is_not_json() {
    let server = EchoServer::spawn().await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/html", server.base_url()))
        .send()
        .await
        .unwrap();

    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let text = response.text().await.unwrap();
    assert!(serde_json::from_str::<Value>(&text).is_err());
}

#[tokio::test]
async fn user_agent_route() {
    let server = EchoServer::spawn().await.unwrap();
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{}/user-agent", server.base_url()))
        .header("User-Agent", "MyCustomUserAgent/1.0")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"user-agent": "MyCustomUserAgent/1.0"}));
    let headers = get_json(&client, &format!("{}/headers", server.base_url())).await;
    assert!(headers["headers"]["Host"].is_string());
}

#[tokio::test]
async fn shutdown_closes_listener() {
    let server = EchoServer::spawn().await.unwrap();
    let addr = server.addr();
    server.shutdown().await;

    let result = reqwest::Client::new()
        .get(format!("http://{addr}/get"))
        .send()
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn undecodable_query_or_form_is_bad_request() {
    let server = EchoServer::spawn().await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/get?name=%FF", server.base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = client
        .post(format!("{}/post", server.base_url()))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("a=%C3%28")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = client
        .post(format!("{}/post", server.base_url()))
        .header("Content-Type", "text/plain")
        .body("a=%C3%28")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
