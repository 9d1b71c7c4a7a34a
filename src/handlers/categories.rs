use crate::{
    entities::category,
    errors::ApiError,
    handlers::common::{created_response, json_payload, success_response},
    services::categories::{CreateCategoryInput, UpdateCategoryInput},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};

/// Creates the router for category endpoints
pub fn categories_routes() -> Router<AppState> {
    Router::new()
        .route("/categories/", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            put(update_category).delete(delete_category),
        )
}

/// List active categories
#[utoipa::path(
    get,
    path = "/categories/",
    responses(
        (status = 200, description = "Active categories", body = [category::Model])
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.services.categories.list_active().await?;
    Ok(success_response(categories))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories/",
    request_body = CreateCategoryInput,
    responses(
        (status = 201, description = "Category created", body = category::Model),
        (status = 400, description = "Invalid payload or parent category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CreateCategoryInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input = json_payload(payload)?;
    let category = state.services.categories.create(input).await?;
    Ok(created_response(category))
}

/// Partially update a category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = UpdateCategoryInput,
    responses(
        (status = 200, description = "Category updated", body = category::Model),
        (status = 400, description = "Invalid parent", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateCategoryInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input = json_payload(payload)?;
    let category = state.services.categories.update(id, input).await?;
    Ok(success_response(category))
}

/// Soft-delete a category
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deactivated", body = category::Model),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.services.categories.soft_delete(id).await?;
    Ok(success_response(category))
}
