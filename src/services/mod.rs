pub mod categories;
pub mod products;
pub mod rating;
pub mod reviews;
pub mod users;

pub use categories::CategoryService;
pub use products::ProductService;
pub use reviews::ReviewService;
pub use users::UserService;

use serde::{Deserialize, Deserializer};

/// Distinguishes an explicit `null` from an absent field in partial updates:
/// absent stays `None`, `null` becomes `Some(None)`.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Trims a string and drops it when nothing is left
pub(crate) fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
