use sea_orm_migration::prelude::*;

use super::m20250101_000003_create_products_table::Products;
use super::m20250101_000004_create_reviews_table::Reviews;

#[derive(DeriveMigrationName)]
pub struct Migration;

const PRODUCTS_CATEGORY_IDX: &str = "idx_products_category_active";
const REVIEWS_PRODUCT_IDX: &str = "idx_reviews_product_active";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Listing by category and the rating recompute both filter on (fk, is_active).
        manager
            .create_index(
                Index::create()
                    .name(PRODUCTS_CATEGORY_IDX)
                    .table(Products::Table)
                    .col(Products::CategoryId)
                    .col(Products::IsActive)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(REVIEWS_PRODUCT_IDX)
                    .table(Reviews::Table)
                    .col(Reviews::ProductId)
                    .col(Reviews::IsActive)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(REVIEWS_PRODUCT_IDX)
                    .table(Reviews::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name(PRODUCTS_CATEGORY_IDX)
                    .table(Products::Table)
                    .to_owned(),
            )
            .await
    }
}
