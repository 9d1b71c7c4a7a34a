use crate::{
    db::with_transaction,
    entities::category,
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

const PARENT_NOT_FOUND: &str = "Parent category not found";

/// Input for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryInput {
    #[validate(length(min = 3, max = 50, message = "Name must be between 3 and 50 characters"))]
    #[schema(example = "Electronics")]
    pub name: String,
    #[schema(example = json!(null))]
    pub parent_id: Option<i32>,
}

impl CreateCategoryInput {
    /// Trims the name so length rules apply to what gets stored
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

/// Partial update: absent fields are left untouched, `"parent_id": null`
/// turns the category into a root.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 3, max = 50, message = "Name must be between 3 and 50 characters"))]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i32>, nullable)]
    pub parent_id: Option<Option<i32>>,
}

impl UpdateCategoryInput {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self
    }
}

/// Looks up a category that has not been soft-deleted
pub(crate) async fn find_active<C>(conn: &C, id: i32) -> Result<Option<category::Model>, DbErr>
where
    C: ConnectionTrait,
{
    category::Entity::find_by_id(id)
        .filter(category::Column::IsActive.eq(true))
        .one(conn)
        .await
}

/// Category tree management
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All active categories
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<category::Model>, ServiceError> {
        let categories = category::Entity::find()
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(categories)
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateCategoryInput) -> Result<category::Model, ServiceError> {
        let input = input.normalized();
        input.validate()?;
        let CreateCategoryInput { name, parent_id } = input;

        let created = with_transaction::<_, _, ServiceError>(&self.db, move |txn| {
            Box::pin(async move {
                if let Some(parent_id) = parent_id {
                    if find_active(txn, parent_id).await?.is_none() {
                        return Err(ServiceError::InvalidReference(PARENT_NOT_FOUND.to_string()));
                    }
                }

                let model = category::ActiveModel {
                    name: Set(name),
                    parent_id: Set(parent_id),
                    is_active: Set(true),
                    ..Default::default()
                };
                Ok(model.insert(txn).await?)
            })
        })
        .await?;

        info!(category_id = created.id, "Created category");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: UpdateCategoryInput,
    ) -> Result<category::Model, ServiceError> {
        let input = input.normalized();
        input.validate()?;
        let UpdateCategoryInput { name, parent_id } = input;

        let updated = with_transaction::<_, _, ServiceError>(&self.db, move |txn| {
            Box::pin(async move {
                let existing = find_active(txn, id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Category"))?;

                if let Some(Some(parent_id)) = parent_id {
                    if parent_id == id {
                        return Err(ServiceError::InvalidSelfReference);
                    }
                    if find_active(txn, parent_id).await?.is_none() {
                        return Err(ServiceError::InvalidReference(PARENT_NOT_FOUND.to_string()));
                    }
                }

                let mut active: category::ActiveModel = existing.into();
                if let Some(name) = name {
                    active.name = Set(name);
                }
                if let Some(parent_id) = parent_id {
                    active.parent_id = Set(parent_id);
                }
                Ok(active.update(txn).await?)
            })
        })
        .await?;

        info!(category_id = id, "Updated category");
        Ok(updated)
    }

    /// Marks the category inactive and returns its final state
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: i32) -> Result<category::Model, ServiceError> {
        let deleted = with_transaction::<_, _, ServiceError>(&self.db, move |txn| {
            Box::pin(async move {
                let existing = find_active(txn, id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Category"))?;

                let mut active: category::ActiveModel = existing.into();
                active.is_active = Set(false);
                Ok(active.update(txn).await?)
            })
        })
        .await?;

        info!(category_id = id, "Soft-deleted category");
        Ok(deleted)
    }
}
