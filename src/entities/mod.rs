//! sea-orm entities for the storefront schema.
//!
//! Rows are never physically removed: every table carries `is_active` and
//! readers filter on it.

pub mod category;
pub mod product;
pub mod review;
pub mod user;

pub use user::UserRole;
