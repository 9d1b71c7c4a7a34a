#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use storefront_api::{
    config::AppConfig,
    db,
    entities::{user, UserRole},
    AppState,
};
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

/// Seeded account with a ready-to-use bearer token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i32,
    pub email: String,
    pub token: String,
}

/// Application backed by a fresh in-memory SQLite database, with one admin,
/// two sellers and two buyers already registered.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin: TestUser,
    pub seller: TestUser,
    pub other_seller: TestUser,
    pub buyer: TestUser,
    pub other_buyer: TestUser,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_storefront_tests_32+".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_000,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.db_idle_timeout_secs = 3600;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = storefront_api::build_router(state.clone());

        let admin = seed_user(&state, "admin@example.com", UserRole::Admin).await;
        let seller = seed_user(&state, "seller@example.com", UserRole::Seller).await;
        let other_seller = seed_user(&state, "seller2@example.com", UserRole::Seller).await;
        let buyer = seed_user(&state, "buyer@example.com", UserRole::Buyer).await;
        let other_buyer = seed_user(&state, "buyer2@example.com", UserRole::Buyer).await;

        Self {
            router,
            state,
            admin,
            seller,
            other_seller,
            buyer,
            other_buyer,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
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

    /// POST an urlencoded form body.
    pub async fn post_form(&self, uri: &str, form: &str) -> axum::response::Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends the request and returns status plus parsed JSON body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    pub async fn create_category(&self, name: &str, parent_id: Option<i64>) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/categories/",
                Some(json!({ "name": name, "parent_id": parent_id })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create category: {body}");
        body["id"].as_i64().expect("category id")
    }

    pub async fn create_product(&self, token: &str, category_id: i64, name: &str) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/products/",
                Some(product_payload(name, category_id)),
                Some(token),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create product: {body}");
        body["id"].as_i64().expect("product id")
    }

    pub async fn create_review(&self, token: &str, product_id: i64, grade: i64) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/reviews/",
                Some(json!({ "product_id": product_id, "grade": grade, "comment": "ok" })),
                Some(token),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create review: {body}");
        body["id"].as_i64().expect("review id")
    }

    pub async fn product_rating(&self, product_id: i64) -> f64 {
        let (status, body) = self
            .call(Method::GET, &format!("/products/{product_id}"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK, "get product: {body}");
        body["rating"].as_f64().expect("rating")
    }
}

pub fn product_payload(name: &str, category_id: i64) -> Value {
    json!({
        "name": name,
        "description": "Seeded for integration tests",
        "price": "19.50",
        "stock": 10,
        "category_id": category_id,
    })
}

pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

pub fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .expect("json array")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}

async fn seed_user(state: &AppState, email: &str, role: UserRole) -> TestUser {
    let hashed = state.auth.hash_password(PASSWORD).expect("hash password");
    let account = user::ActiveModel {
        email: Set(email.to_string()),
        hashed_password: Set(hashed),
        role: Set(role),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&*state.db)
    .await
    .expect("seed user");

    let token = state.auth.generate_token(&account).expect("issue token");
    TestUser {
        id: account.id,
        email: account.email,
        token: token.access_token,
    }
}
