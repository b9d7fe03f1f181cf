//! HTTP integration tests.
//!
//! Starts the router on an ephemeral port and talks to it with reqwest.

use super::users_dispatcher;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlapi::http::{router, AppState};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestServer {
    base_url: String,
    _templates: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let (templates, dispatcher) = users_dispatcher().await;
        let app = router(Arc::new(AppState::new(dispatcher)));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            _templates: templates,
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = reqwest::get(format!("{}{}", self.base_url, path))
            .await
            .unwrap();
        let status = response.status();
        let body = response.json::<Value>().await.unwrap();
        (status, body)
    }
}

fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn test_call_returns_rows() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/users?id=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "name": "ada" }]));
}

#[tokio::test]
async fn test_call_with_no_rows_returns_empty_array() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/users?id=999").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_unknown_call_is_not_found() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/missing?id=1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(error_message(&body).contains("missing"));
}

#[tokio::test]
async fn test_encoded_traversal_is_not_found() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/..%2Fusers?id=1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_missing_parameter_is_bad_request() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/users").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains(":id"));
}

#[tokio::test]
async fn test_extra_parameters_do_not_appear() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/users?id=1&extra=1&name=x").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "name": "ada" }]));
}

#[tokio::test]
async fn test_unsupported_column_returns_error_without_rows() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/user_ages").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.is_array());
    assert!(error_message(&body).contains("age"));
}

#[tokio::test]
async fn test_sql_error_is_server_error() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/broken").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_message(&body).starts_with("Query error"));
}

#[tokio::test]
async fn test_empty_call_returns_fixed_message() {
    let server = TestServer::start().await;

    for path in ["/api/", "/api"] {
        let (status, body) = server.get(path).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body, json!("Unknown API call"), "{path}");
    }
}

#[tokio::test]
async fn test_percent_encoded_parameters() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/search?q=carol%40example.com").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "name": "carol" }]));
}

#[tokio::test]
async fn test_server_keeps_serving_after_failures() {
    let server = TestServer::start().await;

    server.get("/api/broken").await;
    server.get("/api/user_ages").await;
    server.get("/api/missing").await;

    let (status, body) = server.get("/api/all_users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{ "name": "ada" }, { "name": "bob" }, { "name": "carol" }])
    );
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
