use crate::{
    auth::{require_role, AuthUser},
    entities::{product, review, UserRole},
    errors::ApiError,
    handlers::common::{created_response, json_payload, success_response},
    services::products::ProductInput,
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/products/", get(list_products).post(create_product))
        .route("/products/category/:category_id", get(list_products_by_category))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/:id/reviews", get(list_product_reviews))
}

/// List active products
#[utoipa::path(
    get,
    path = "/products/",
    responses((status = 200, description = "Active products", body = [product::Model])),
    tag = "products"
)]
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state.services.products.list_active().await?;
    Ok(success_response(products))
}

/// Create a product owned by the calling seller
#[utoipa::path(
    post,
    path = "/products/",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = product::Model),
        (status = 400, description = "Invalid payload or category not found", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not a seller", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn create_product(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, UserRole::Seller)?;
    let input = json_payload(payload)?;
    let product = state.services.products.create(input, user.id).await?;
    Ok(created_response(product))
}

/// List active products of an active category
#[utoipa::path(
    get,
    path = "/products/category/{category_id}",
    params(("category_id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Products in category", body = [product::Model]),
        (status = 400, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.services.products.list_by_category(category_id).await?;
    Ok(success_response(products))
}

/// Get a product
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = product::Model),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.services.products.get(id).await?;
    Ok(success_response(product))
}

/// Replace a product's mutable fields
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = product::Model),
        (status = 400, description = "Invalid payload or category not found", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not the owning seller", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn update_product(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, UserRole::Seller)?;
    // Non-owners get 403 whatever the body holds.
    state
        .services
        .products
        .check_ownership(id, user.id, "update")
        .await?;
    let input = json_payload(payload)?;
    let product = state.services.products.update(id, input, user.id).await?;
    Ok(success_response(product))
}

/// Soft-delete a product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deactivated", body = product::Model),
        (status = 403, description = "Not the owning seller", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn delete_product(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, UserRole::Seller)?;
    let product = state.services.products.soft_delete(id, user.id).await?;
    Ok(success_response(product))
}

/// List active reviews of a product
#[utoipa::path(
    get,
    path = "/products/{id}/reviews",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Reviews", body = [review::Model]),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_product_reviews(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = state.services.products.list_reviews(id).await?;
    Ok(success_response(reviews))
}
