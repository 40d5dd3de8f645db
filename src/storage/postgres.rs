use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    database,
    error::Result,
    models::{
        Category, CategoryChanges, CategoryFilter, NewCategory, NewProduct, Product,
        ProductChanges, ProductFilter,
    },
    queries::{category_queries, product_queries},
    storage::{CategoryStore, ProductStore, Store},
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn find_category_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        category_queries::find_by_id(&self.pool, id).await
    }

    async fn list_categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        category_queries::get_all(&self.pool, filter).await
    }

    async fn create_category(&self, input: NewCategory) -> Result<Category> {
        category_queries::create_category(&self.pool, input).await
    }

    async fn update_category(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Option<Category>> {
        category_queries::update_category(&self.pool, id, changes).await
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool> {
        category_queries::delete_category(&self.pool, id).await
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        product_queries::find_by_id(&self.pool, id).await
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        product_queries::search_products(&self.pool, filter).await
    }

    async fn create_product(&self, input: NewProduct) -> Result<Product> {
        product_queries::create_product(&self.pool, input).await
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>> {
        product_queries::update_product(&self.pool, id, changes).await
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        product_queries::delete_product(&self.pool, id).await
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn check_health(&self) -> Result<()> {
        database::check_health(&self.pool).await
    }
}
