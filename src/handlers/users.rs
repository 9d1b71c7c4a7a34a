use crate::{
    auth::TokenResponse,
    errors::ApiError,
    handlers::common::{created_response, json_payload, success_response},
    services::users::{RegisterUserInput, UserResponse},
    AppState,
};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Json, State,
    },
    response::IntoResponse,
    routing::post,
    Form, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;

/// OAuth2 password-grant form; `username` carries the email
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    #[schema(example = "seller@example.com")]
    pub username: String,
    #[schema(format = Password)]
    pub password: String,
}

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", post(register_user))
        .route("/users/token", post(login))
}

/// Register a buyer or seller account
#[utoipa::path(
    post,
    path = "/users/",
    request_body = RegisterUserInput,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid payload or email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUserInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input = json_payload(payload)?;
    let user = state.services.users.register(input).await?;
    Ok(created_response(user))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/users/token",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token", body = TokenResponse),
        (status = 401, description = "Incorrect email or password", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Form(form) = form.map_err(ApiError::invalid_body)?;
    let token = state
        .services
        .users
        .authenticate(&form.username, &form.password)
        .await?;
    Ok(success_response(token))
}
