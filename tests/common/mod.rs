#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use storefront_api::{
    assistant::{RandomSource, SeededRandom},
    config::AppConfig,
    AppState,
};
use tower::ServiceExt;

/// Helper harness around the full application router with in-memory stores.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    user_id: String,
}

impl TestApp {
    /// Construct a new test application and register a default shopper.
    pub async fn new() -> Self {
        Self::with_config(AppConfig::development()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let random: Arc<dyn RandomSource> = Arc::new(SeededRandom::new(7));
        let state =
            AppState::with_random_source(config, random).expect("failed to build test state");
        let router = storefront_api::app_router(state.clone());

        let mut app = Self {
            router,
            state,
            token: String::new(),
            user_id: String::new(),
        };

        let (token, user_id) = app.register("shopper@example.com", "s3cret-pass").await;
        app.token = token;
        app.user_id = user_id;
        app
    }

    /// Registers a user and returns its token and id.
    pub async fn register(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .request(
                Method::POST,
                "/api/auth/register",
                Some(json!({
                    "email": email,
                    "password": password,
                    "firstName": "Test",
                    "lastName": "Shopper",
                })),
                None,
            )
            .await;
        assert_eq!(response.status(), 200, "registration failed for {email}");

        let body = response_json(response).await;
        (
            body["token"].as_str().expect("token").to_string(),
            body["user"]["id"].as_str().expect("user id").to_string(),
        )
    }

    /// Access the bearer token for the default shopper.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for authenticated JSON requests.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    /// Sends one chat message as the default shopper.
    pub async fn chat(&self, message: &str, conversation_id: Option<&str>) -> Response {
        let mut payload = json!({ "message": message });
        if let Some(id) = conversation_id {
            payload["conversationId"] = json!(id);
        }
        self.request_authenticated(Method::POST, "/api/chat", Some(payload))
            .await
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 response")
}
