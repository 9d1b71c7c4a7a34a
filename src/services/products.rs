use crate::{
    db::with_transaction,
    entities::{product, review},
    errors::ServiceError,
    services::{categories, normalize_optional_string},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

const CATEGORY_NOT_FOUND: &str = "Category not found";

fn validate_positive_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("price_positive");
        err.message = Some("Price must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

/// Product payload for both create and update. Update overwrites every
/// mutable field with the values given here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(length(min = 3, max = 100, message = "Name must be between 3 and 100 characters"))]
    #[schema(example = "Wireless Headphones")]
    pub name: String,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,

    #[validate(custom = "validate_positive_price")]
    #[schema(value_type = String, example = "199.99")]
    pub price: Decimal,

    #[validate(length(max = 1024, message = "Image URL cannot exceed 1024 characters"))]
    pub image_url: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[schema(example = 25)]
    pub stock: i32,

    #[schema(example = 1)]
    pub category_id: i32,
}

impl ProductInput {
    /// Trims text fields and drops blank optional ones before validation
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = normalize_optional_string(self.description);
        self.image_url = normalize_optional_string(self.image_url);
        self
    }
}

pub(crate) async fn find_active<C>(conn: &C, id: i32) -> Result<Option<product::Model>, DbErr>
where
    C: ConnectionTrait,
{
    product::Entity::find_by_id(id)
        .filter(product::Column::IsActive.eq(true))
        .one(conn)
        .await
}

async fn ensure_category<C>(conn: &C, category_id: i32) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    match categories::find_active(conn, category_id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::InvalidReference(CATEGORY_NOT_FOUND.to_string())),
    }
}

fn ensure_owner(product: &product::Model, seller_id: i32, action: &str) -> Result<(), ServiceError> {
    if product.seller_id == seller_id {
        return Ok(());
    }
    warn!(
        product_id = product.id,
        owner_id = product.seller_id,
        seller_id,
        "Seller attempted to {} a product they do not own",
        action
    );
    Err(ServiceError::Forbidden(format!(
        "You can only {action} your own products"
    )))
}

/// Seller-owned product catalog
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<product::Model>, ServiceError> {
        let products = product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    /// Active products of an active category
    #[instrument(skip(self))]
    pub async fn list_by_category(
        &self,
        category_id: i32,
    ) -> Result<Vec<product::Model>, ServiceError> {
        ensure_category(&*self.db, category_id).await?;

        let products = product::Entity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<product::Model, ServiceError> {
        find_active(&*self.db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product"))
    }

    #[instrument(skip(self, input), fields(category_id = input.category_id))]
    pub async fn create(
        &self,
        input: ProductInput,
        seller_id: i32,
    ) -> Result<product::Model, ServiceError> {
        let input = input.normalized();
        input.validate()?;

        let created = with_transaction::<_, _, ServiceError>(&self.db, move |txn| {
            Box::pin(async move {
                ensure_category(txn, input.category_id).await?;

                let model = product::ActiveModel {
                    name: Set(input.name),
                    description: Set(input.description),
                    price: Set(input.price),
                    image_url: Set(input.image_url),
                    stock: Set(input.stock),
                    category_id: Set(input.category_id),
                    seller_id: Set(seller_id),
                    rating: Set(0.0),
                    is_active: Set(true),
                    ..Default::default()
                };
                Ok(model.insert(txn).await?)
            })
        })
        .await?;

        info!(product_id = created.id, seller_id, "Created product");
        Ok(created)
    }

    /// Overwrites the product's mutable fields. Ownership is checked before
    /// the payload is looked at.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: i32,
        input: ProductInput,
        seller_id: i32,
    ) -> Result<product::Model, ServiceError> {
        let updated = with_transaction::<_, _, ServiceError>(&self.db, move |txn| {
            Box::pin(async move {
                let existing = find_active(txn, id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Product"))?;
                ensure_owner(&existing, seller_id, "update")?;

                let input = input.normalized();
                input.validate()?;
                ensure_category(txn, input.category_id).await?;

                let mut active: product::ActiveModel = existing.into();
                active.name = Set(input.name);
                active.description = Set(input.description);
                active.price = Set(input.price);
                active.image_url = Set(input.image_url);
                active.stock = Set(input.stock);
                active.category_id = Set(input.category_id);
                Ok(active.update(txn).await?)
            })
        })
        .await?;

        info!(product_id = id, seller_id, "Updated product");
        Ok(updated)
    }

    /// Resolves an active product and confirms `seller_id` owns it, so the
    /// caller can answer 404/403 before looking at a request body.
    #[instrument(skip(self))]
    pub async fn check_ownership(
        &self,
        id: i32,
        seller_id: i32,
        action: &str,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.get(id).await?;
        ensure_owner(&existing, seller_id, action)?;
        Ok(existing)
    }

    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: i32, seller_id: i32) -> Result<product::Model, ServiceError> {
        let deleted = with_transaction::<_, _, ServiceError>(&self.db, move |txn| {
            Box::pin(async move {
                let existing = find_active(txn, id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Product"))?;
                ensure_owner(&existing, seller_id, "delete")?;

                let mut active: product::ActiveModel = existing.into();
                active.is_active = Set(false);
                Ok(active.update(txn).await?)
            })
        })
        .await?;

        info!(product_id = id, seller_id, "Soft-deleted product");
        Ok(deleted)
    }

    /// Active reviews of an active product
    #[instrument(skip(self))]
    pub async fn list_reviews(&self, product_id: i32) -> Result<Vec<review::Model>, ServiceError> {
        self.get(product_id).await?;

        let reviews = review::Entity::find()
            .filter(review::Column::ProductId.eq(product_id))
            .filter(review::Column::IsActive.eq(true))
            .order_by_asc(review::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(reviews)
    }
}
