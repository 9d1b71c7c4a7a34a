use crate::{
    auth::{require_role, AuthUser},
    entities::{review, UserRole},
    errors::ApiError,
    handlers::common::{created_response, json_payload, success_response, MessageResponse},
    services::reviews::CreateReviewInput,
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::IntoResponse,
    routing::{delete, get},
    Router,
};

pub fn reviews_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews/", get(list_reviews).post(create_review))
        .route("/reviews/:id", delete(delete_review))
}

/// List active reviews
#[utoipa::path(
    get,
    path = "/reviews/",
    responses((status = 200, description = "Active reviews", body = [review::Model])),
    tag = "reviews"
)]
pub async fn list_reviews(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let reviews = state.services.reviews.list_active().await?;
    Ok(success_response(reviews))
}

/// Review a product as a buyer
#[utoipa::path(
    post,
    path = "/reviews/",
    request_body = CreateReviewInput,
    responses(
        (status = 201, description = "Review created", body = review::Model),
        (status = 400, description = "Grade out of range or invalid payload", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not a buyer", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "reviews"
)]
pub async fn create_review(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateReviewInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, UserRole::Buyer)?;
    let input = json_payload(payload)?;
    let review = state.services.reviews.create(input, user.id).await?;
    Ok(created_response(review))
}

/// Soft-delete a review (admin only)
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = i32, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review deleted", body = MessageResponse),
        (status = 403, description = "Caller is not an admin", body = crate::errors::ErrorResponse),
        (status = 404, description = "Review not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "reviews"
)]
pub async fn delete_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, UserRole::Admin)?;
    state.services.reviews.soft_delete(id).await?;
    Ok(success_response(MessageResponse::new("Review deleted")))
}
