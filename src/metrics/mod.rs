//! Prometheus metrics for the storefront.
//!
//! Everything registers into the default registry; [`gather_metrics`] renders
//! the text exposition served at `/metrics`.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Instant;
use thiserror::Error;
use tracing::trace;

lazy_static! {
    // HTTP metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "storefront_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    ).expect("http request counter registers");

    pub static ref HTTP_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "storefront_http_request_duration_seconds",
        "HTTP request latencies in seconds",
        &["method", "path"]
    ).expect("http latency histogram registers");

    // Assistant metrics
    pub static ref CHAT_TURNS: IntCounter = register_int_counter!(
        "storefront_chat_turns_total",
        "Total number of completed chat turns"
    ).expect("chat turn counter registers");

    pub static ref CHAT_TURNS_FAILED: IntCounter = register_int_counter!(
        "storefront_chat_turns_failed_total",
        "Total number of chat turns that were rolled back"
    ).expect("failed turn counter registers");

    pub static ref CHAT_INTENTS: IntCounterVec = register_int_counter_vec!(
        "storefront_chat_intents_total",
        "Classified intents by tag",
        &["intent"]
    ).expect("intent counter registers");

    pub static ref CONVERSATIONS_DELETED: IntCounter = register_int_counter!(
        "storefront_conversations_deleted_total",
        "Total number of conversations deleted by their owners"
    ).expect("deletion counter registers");

    // Account metrics
    pub static ref USER_REGISTRATIONS: IntCounter = register_int_counter!(
        "storefront_user_registrations_total",
        "Total number of registered users"
    ).expect("registration counter registers");

    pub static ref USER_LOGINS: IntCounterVec = register_int_counter_vec!(
        "storefront_user_logins_total",
        "Login attempts by outcome",
        &["outcome"]
    ).expect("login counter registers");
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
    #[error("Metrics output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn record_http_request(method: &str, path: &str, status: u16, started: Instant) {
    let latency = started.elapsed().as_secs_f64();
    trace!(
        http.method = method,
        http.path = path,
        http.status = status,
        latency_secs = latency,
        "recording HTTP request metrics"
    );

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, path])
        .observe(latency);
}

pub fn record_intent(intent: &str) {
    CHAT_INTENTS.with_label_values(&[intent]).inc();
}

pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    USER_LOGINS.with_label_values(&[outcome]).inc();
}

/// Records count and latency for every request. Paths are labelled by their
/// route template so ids do not explode label cardinality.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_http_request(&method, &path, response.status().as_u16(), started);
    response
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> Result<String, MetricsError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
