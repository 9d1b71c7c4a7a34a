use crate::{
    db::with_transaction,
    entities::review,
    errors::ServiceError,
    services::{normalize_optional_string, rating},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

pub const MIN_GRADE: i32 = 1;
pub const MAX_GRADE: i32 = 5;

/// Grade range is enforced by the service after the product lookup, not by
/// payload validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReviewInput {
    #[schema(example = 1)]
    pub product_id: i32,

    #[validate(length(max = 1000, message = "Comment cannot exceed 1000 characters"))]
    #[schema(example = "Great sound, battery lasts all week")]
    pub comment: Option<String>,

    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub grade: i32,
}

pub fn ensure_grade(grade: i32) -> Result<(), ServiceError> {
    if (MIN_GRADE..=MAX_GRADE).contains(&grade) {
        Ok(())
    } else {
        Err(ServiceError::InvalidGrade(grade))
    }
}

/// Buyer reviews; every mutation rewrites the reviewed product's rating in
/// the same transaction.
#[derive(Clone)]
pub struct ReviewService {
    db: Arc<DatabaseConnection>,
}

impl ReviewService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<review::Model>, ServiceError> {
        let reviews = review::Entity::find()
            .filter(review::Column::IsActive.eq(true))
            .order_by_asc(review::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(reviews)
    }

    #[instrument(skip(self, input), fields(product_id = input.product_id, grade = input.grade))]
    pub async fn create(
        &self,
        input: CreateReviewInput,
        buyer_id: i32,
    ) -> Result<review::Model, ServiceError> {
        let (created, new_rating) = with_transaction::<_, _, ServiceError>(&self.db, move |txn| {
            Box::pin(async move {
                rating::lock_product(txn, input.product_id, true)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Product"))?;
                ensure_grade(input.grade)?;
                input.validate()?;

                let model = review::ActiveModel {
                    user_id: Set(buyer_id),
                    product_id: Set(input.product_id),
                    comment: Set(normalize_optional_string(input.comment)),
                    comment_date: Set(Utc::now()),
                    grade: Set(input.grade),
                    is_active: Set(true),
                    ..Default::default()
                };
                let created = model.insert(txn).await?;
                let new_rating = rating::recompute(txn, created.product_id).await?;
                Ok((created, new_rating))
            })
        })
        .await?;

        info!(
            review_id = created.id,
            product_id = created.product_id,
            rating = new_rating,
            "Created review"
        );
        Ok(created)
    }

    /// Marks the review inactive and refreshes the product rating
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: i32) -> Result<review::Model, ServiceError> {
        let (deleted, new_rating) = with_transaction::<_, _, ServiceError>(&self.db, move |txn| {
            Box::pin(async move {
                let existing = review::Entity::find_by_id(id)
                    .filter(review::Column::IsActive.eq(true))
                    .one(txn)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Review"))?;

                // The product may itself be soft-deleted; its rating still tracks.
                rating::lock_product(txn, existing.product_id, false).await?;

                let mut active: review::ActiveModel = existing.into();
                active.is_active = Set(false);
                let deleted = active.update(txn).await?;
                let new_rating = rating::recompute(txn, deleted.product_id).await?;
                Ok((deleted, new_rating))
            })
        })
        .await?;

        info!(
            review_id = id,
            product_id = deleted.product_id,
            rating = new_rating,
            "Soft-deleted review"
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(5)]
    fn grades_in_range_pass(#[case] grade: i32) {
        assert!(ensure_grade(grade).is_ok());
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(-3)]
    fn grades_out_of_range_fail(#[case] grade: i32) {
        assert_matches!(ensure_grade(grade), Err(ServiceError::InvalidGrade(g)) if g == grade);
    }
}
