//! # Storage
//!
//! Persistence interface consumed by the routes, with a PostgreSQL backend and
//! an in-memory backend sharing the same contract:
//!
//! - `update_*` returns `Ok(None)` and `delete_*` returns `Ok(false)` when the id
//!   does not exist.
//! - Referential and uniqueness rules surface as `AppError::ConstraintViolation`.
//! - A category that still owns products cannot be deleted.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        Category, CategoryChanges, CategoryFilter, NewCategory, NewProduct, Product,
        ProductChanges, ProductFilter,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Resolves a filter's `limit`/`offset` into a bounded `(limit, offset)` pair.
pub fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn find_category_by_id(&self, id: Uuid) -> Result<Option<Category>>;

    /// Ordered by name.
    async fn list_categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>>;

    async fn create_category(&self, input: NewCategory) -> Result<Category>;

    async fn update_category(&self, id: Uuid, changes: CategoryChanges)
        -> Result<Option<Category>>;

    async fn delete_category(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>>;

    /// Newest first.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

    async fn create_product(&self, input: NewProduct) -> Result<Product>;

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>>;

    async fn delete_product(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait Store: CategoryStore + ProductStore {
    /// Short backend name reported by the readiness endpoint.
    fn backend(&self) -> &'static str;

    async fn check_health(&self) -> Result<()>;
}
