//! Storefront API library
//!
//! Categories, seller-owned products and buyer reviews over a relational
//! store, with product ratings derived from active reviews.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::{any::Any, sync::Arc};
use tower_http::catch_panic::CatchPanicLayer;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires the auth service and every domain service onto one pool
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let auth = Arc::new(auth::AuthService::new(
            auth::AuthConfig::from_app_config(&config),
            db.clone(),
        ));
        let services = handlers::AppServices::new(db.clone(), auth.clone());
        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the storefront API" }))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    ::tracing::error!(panic = detail, "Handler panicked");
    errors::unhandled_failure_response()
}

/// Every API route, without middleware
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .merge(handlers::categories::categories_routes())
        .merge(handlers::products::products_routes())
        .merge(handlers::reviews::reviews_routes())
        .merge(handlers::users::users_routes())
        .merge(health::health_routes())
}

/// Full application router: routes, Swagger UI, panic guard, access log,
/// HTTP tracing and request ids. CORS and compression are added by the binary.
pub fn build_router(state: AppState) -> Router {
    api_routes()
        .merge(openapi::swagger_ui())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(axum::middleware::from_fn(
            middleware_helpers::access_log_middleware,
        ))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
