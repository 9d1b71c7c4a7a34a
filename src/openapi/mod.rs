use crate::{
    auth::TokenResponse,
    entities::{category, product, review, UserRole},
    errors::ErrorResponse,
    handlers::{self, common::MessageResponse, users::LoginForm},
    health::{self, HealthInfo, HealthStatus, ReadinessInfo},
    services::{
        categories::{CreateCategoryInput, UpdateCategoryInput},
        products::ProductInput,
        reviews::CreateReviewInput,
        users::{RegisterUserInput, UserResponse},
    },
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
Categories, seller-owned products and buyer reviews.

Product ratings are the mean grade of active reviews and are maintained by the
service. Deleted records are deactivated, never removed.

## Authentication

Obtain a token from `POST /users/token` (form fields `username`, `password`)
and send it as:

```
Authorization: Bearer <token>
```
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    tags(
        (name = "categories", description = "Category tree"),
        (name = "products", description = "Seller product catalog"),
        (name = "reviews", description = "Buyer reviews and ratings"),
        (name = "users", description = "Registration and tokens"),
        (name = "health", description = "Liveness and readiness")
    ),
    paths(
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::list_products_by_category,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::list_product_reviews,
        handlers::reviews::list_reviews,
        handlers::reviews::create_review,
        handlers::reviews::delete_review,
        handlers::users::register_user,
        handlers::users::login,
        health::health_check,
        health::readiness_check,
    ),
    components(
        schemas(
            category::Model,
            product::Model,
            review::Model,
            UserRole,
            CreateCategoryInput,
            UpdateCategoryInput,
            ProductInput,
            CreateReviewInput,
            RegisterUserInput,
            UserResponse,
            LoginForm,
            TokenResponse,
            MessageResponse,
            ErrorResponse,
            HealthInfo,
            HealthStatus,
            ReadinessInfo,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
