mod common;

use axum::http::Method;
use common::{response_json, response_text, TestApp};

#[tokio::test]
async fn health_reports_catalog_status() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;

    assert_eq!(body["status"], "up");
    assert_eq!(body["catalog"]["status"], "up");
    assert_eq!(body["catalog"]["message"], "20 products");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn metrics_expose_chat_counters() {
    let app = TestApp::new().await;
    assert_eq!(app.chat("hello", None).await.status(), 200);

    let response = app.request(Method::GET, "/metrics", None, None).await;
    assert_eq!(response.status(), 200);
    let text = response_text(response).await;

    assert!(text.contains("storefront_chat_turns_total"));
    assert!(text.contains("storefront_http_requests_total"));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert!(response.headers().contains_key("x-request-id"));
}
