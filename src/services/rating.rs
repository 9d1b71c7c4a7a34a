//! Product rating aggregation.
//!
//! A product's `rating` is the mean grade of its active reviews, or 0 when it
//! has none. It is rewritten from scratch on every review mutation, inside the
//! transaction that performed the mutation.

use crate::entities::{product, review};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait, QueryFilter,
    QuerySelect,
};
use tracing::debug;

/// Arithmetic mean of `grades`; 0.0 for an empty slice
pub fn average_grade(grades: &[i32]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    let total: i64 = grades.iter().map(|&g| i64::from(g)).sum();
    total as f64 / grades.len() as f64
}

/// Loads a product row and, on PostgreSQL, holds `FOR UPDATE` on it until the
/// surrounding transaction ends. Concurrent review mutations for the same
/// product queue behind this lock. SQLite serializes writers on its own.
pub async fn lock_product<C>(
    conn: &C,
    product_id: i32,
    active_only: bool,
) -> Result<Option<product::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query = product::Entity::find_by_id(product_id);
    if active_only {
        query = query.filter(product::Column::IsActive.eq(true));
    }
    if conn.get_database_backend() == DbBackend::Postgres {
        query = query.lock_exclusive();
    }
    query.one(conn).await
}

/// Rewrites `product.rating` from the product's active reviews
pub async fn recompute<C>(conn: &C, product_id: i32) -> Result<f64, DbErr>
where
    C: ConnectionTrait,
{
    let grades: Vec<i32> = review::Entity::find()
        .select_only()
        .column(review::Column::Grade)
        .filter(review::Column::ProductId.eq(product_id))
        .filter(review::Column::IsActive.eq(true))
        .into_tuple()
        .all(conn)
        .await?;

    let rating = average_grade(&grades);

    product::Entity::update_many()
        .col_expr(product::Column::Rating, Expr::value(rating))
        .filter(product::Column::Id.eq(product_id))
        .exec(conn)
        .await?;

    debug!(product_id, reviews = grades.len(), rating, "Recomputed product rating");
    Ok(rating)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn product_row() -> product::Model {
        product::Model {
            id: 3,
            name: "Desk Lamp".into(),
            description: None,
            price: dec!(25.00),
            image_url: None,
            stock: 4,
            category_id: 1,
            seller_id: 2,
            rating: 0.0,
            is_active: true,
        }
    }

    #[test]
    fn empty_grades_average_to_zero() {
        assert_eq!(average_grade(&[]), 0.0);
    }

    #[test]
    fn mean_of_grades() {
        assert_eq!(average_grade(&[4, 5]), 4.5);
        assert_eq!(average_grade(&[1, 2, 3, 4, 5]), 3.0);
        assert_eq!(average_grade(&[5]), 5.0);
    }

    #[tokio::test]
    async fn postgres_lock_uses_for_update() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_row()]])
            .into_connection();

        let found = lock_product(&db, 3, true).await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(3));

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log);
        assert!(sql.contains("FOR UPDATE"), "expected row lock in {sql}");
    }

    #[tokio::test]
    async fn sqlite_lookup_skips_row_lock() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![product_row()]])
            .into_connection();

        lock_product(&db, 3, false).await.unwrap();

        let sql = format!("{:?}", db.into_transaction_log());
        assert!(!sql.contains("FOR UPDATE"));
    }
}
