use crate::{
    auth::AuthService,
    db::DbPool,
    services::{CategoryService, ProductService, ReviewService, UserService},
};
use std::sync::Arc;

pub mod categories;
pub mod common;
pub mod products;
pub mod reviews;
pub mod users;

/// Service container shared by every handler through `AppState`
#[derive(Clone)]
pub struct AppServices {
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
    pub reviews: Arc<ReviewService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, auth_service: Arc<AuthService>) -> Self {
        Self {
            categories: Arc::new(CategoryService::new(db_pool.clone())),
            products: Arc::new(ProductService::new(db_pool.clone())),
            reviews: Arc::new(ReviewService::new(db_pool.clone())),
            users: Arc::new(UserService::new(db_pool, auth_service)),
        }
    }
}
