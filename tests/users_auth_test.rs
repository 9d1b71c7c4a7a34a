mod common;

use axum::http::{header, Method, StatusCode};
use common::{json_body, TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn register_defaults_to_buyer_and_hides_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/users/",
            Some(json!({ "email": "New.Buyer@Example.com", "password": "hunter2hunter2" })),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "new.buyer@example.com");
    assert_eq!(body["role"], "buyer");
    assert_eq!(body["is_active"], json!(true));
    assert!(body.get("hashed_password").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_duplicates_and_admin_role() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/users/",
            Some(json!({ "email": "seller@example.com", "password": "another-password" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered");

    let (status, _) = app
        .call(
            Method::POST,
            "/users/",
            Some(json!({ "email": "root@example.com", "password": "another-password", "role": "admin" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::POST,
            "/users/",
            Some(json!({ "email": "not-an-email", "password": "another-password" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::POST,
            "/users/",
            Some(json!({ "email": "short@example.com", "password": "short" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registered_seller_can_login_and_sell() {
    let app = TestApp::new().await;
    let category = app.create_category("Handmade", None).await;

    let (status, _) = app
        .call(
            Method::POST,
            "/users/",
            Some(json!({ "email": "maker@example.com", "password": "woodwork-123", "role": "seller" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = app
        .post_form("/users/token", "username=maker%40example.com&password=woodwork-123")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().expect("access token").to_string();

    let product = app.create_product(&token, category, "Oak bowl").await;
    assert!(product > 0);
}

#[tokio::test]
async fn login_with_seeded_account() {
    let app = TestApp::new().await;

    let form = format!("username=buyer%40example.com&password={PASSWORD}");
    let response = app.post_form("/users/token", &form).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = TestApp::new().await;

    for form in [
        "username=buyer%40example.com&password=wrong-password",
        "username=nobody%40example.com&password=wrong-password",
    ] {
        let response = app.post_form("/users/token", form).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Incorrect email or password");
    }
}

#[tokio::test]
async fn login_form_missing_fields_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app.post_form("/users/token", "username=buyer%40example.com").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Invalid request body");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/products/", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::DELETE,
            "/reviews/1",
            None,
            Some("not.a.jwt"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    let body = json_body(response).await;
    assert_eq!(body["message"], "Could not validate credentials");
}

#[tokio::test]
async fn root_and_health_endpoints() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the storefront API");

    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");

    let (status, _) = app.call(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/products/{id}"].is_object());
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert!(response.headers().contains_key("x-request-id"));

    let (status, body) = app.call(Method::GET, "/products/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["request_id"].is_string());
}
