//! Storefront API Library
//!
//! Product catalog, shopper accounts and a rule-based shopping assistant that
//! keeps per-user conversations.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod assistant;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod conversations;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod middleware_helpers;
pub mod models;
pub mod services;
pub mod tracing;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;

use crate::assistant::{RandomSource, ShoppingAssistant, ThreadRandom};
use crate::auth::{AuthRouterExt, AuthService, UserStore};
use crate::catalog::{InMemoryCatalog, ProductCatalog};
use crate::conversations::{ConversationStore, InMemoryConversationStore};
use crate::errors::ServiceError;
use crate::services::{ChatService, ProductService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::AppConfig>,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires in-memory stores and services from `config`.
    pub fn from_config(config: config::AppConfig) -> Result<Self, ServiceError> {
        Self::with_random_source(config, Arc::new(ThreadRandom))
    }

    /// Same as [`AppState::from_config`] with an explicit randomness source
    /// for the popular-products fallback.
    pub fn with_random_source(
        config: config::AppConfig,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, ServiceError> {
        let catalog: Arc<dyn ProductCatalog> = if config.seed_catalog {
            Arc::new(InMemoryCatalog::with_seed_data()?)
        } else {
            Arc::new(InMemoryCatalog::new(Vec::new())?)
        };
        let store: Arc<dyn ConversationStore> = Arc::new(InMemoryConversationStore::new());

        let auth = Arc::new(AuthService::new(config.auth_config(), UserStore::new()));
        let assistant = ShoppingAssistant::with_policy(config.selector_policy(), random);
        let chat = ChatService::new(store, catalog.clone(), assistant, config.chat_settings());
        let products = ProductService::new(catalog);

        Ok(Self {
            config: Arc::new(config),
            services: handlers::AppServices::new(auth, products, chat),
        })
    }
}

/// Routes mounted under `/api`
pub fn api_routes(auth: Arc<AuthService>) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/products", get(handlers::products::list_products))
        .route("/products/:id", get(handlers::products::get_product));

    let protected = Router::new()
        .route("/chat", post(handlers::chat::send_message))
        .route(
            "/conversations",
            get(handlers::conversations::list_conversations),
        )
        .route(
            "/conversations/:id",
            get(handlers::conversations::get_conversation)
                .delete(handlers::conversations::delete_conversation),
        )
        .with_auth(auth);

    public.merge(protected)
}

/// Full application router with tracing, metrics, compression and request
/// ids. CORS is layered on by the binary since it depends on deployment.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::health::metrics))
        .nest("/api", api_routes(state.services.auth.clone()))
        .layer(axum::middleware::from_fn(metrics::track_http_metrics))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
