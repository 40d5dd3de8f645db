use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        Category, CategoryChanges, CategoryFilter, NewCategory, NewProduct, Product,
        ProductChanges, ProductFilter,
    },
    storage::{CategoryStore, ProductStore, Store, page},
};

#[derive(Default)]
struct Tables {
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
}

impl Tables {
    fn ensure_category_exists(&self, id: Uuid) -> Result<()> {
        if !self.categories.contains_key(&id) {
            return Err(AppError::ConstraintViolation(format!(
                "Category {} does not exist",
                id
            )));
        }
        Ok(())
    }

    fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> Result<()> {
        let taken = self
            .categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except);

        if taken {
            return Err(AppError::ConstraintViolation(format!(
                "Category named {} already exists",
                name
            )));
        }
        Ok(())
    }
}

/// Keeps both tables behind one lock so cross-table rules are checked atomically.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn find_category_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        let (limit, offset) = page(filter.limit, filter.offset);
        let needle = filter.name.as_ref().map(|n| n.to_lowercase());

        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| match needle {
                Some(ref needle) => c.name.to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect();

        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(categories
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn create_category(&self, input: NewCategory) -> Result<Category> {
        let mut tables = self.tables.write().await;
        tables.ensure_name_free(&input.name, None)?;

        let category = Category::new(Uuid::new_v4(), input, Utc::now());
        tables.categories.insert(category.id, category.clone());

        tracing::info!(category_id = %category.id, "Category created");

        Ok(category)
    }

    async fn update_category(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Option<Category>> {
        let mut tables = self.tables.write().await;

        if !tables.categories.contains_key(&id) {
            return Ok(None);
        }

        if let Some(ref name) = changes.name {
            tables.ensure_name_free(name, Some(id))?;
        }

        let Some(category) = tables.categories.get_mut(&id) else {
            return Ok(None);
        };
        category.apply(changes, Utc::now());

        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;

        if !tables.categories.contains_key(&id) {
            return Ok(false);
        }

        let product_count = tables
            .products
            .values()
            .filter(|p| p.category_id == id)
            .count();

        if product_count > 0 {
            return Err(AppError::ConstraintViolation(format!(
                "Category {} still has {} product(s)",
                id, product_count
            )));
        }

        tables.categories.remove(&id);
        tracing::info!(category_id = %id, "Category deleted");

        Ok(true)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let (limit, offset) = page(filter.limit, filter.offset);

        let tables = self.tables.read().await;
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(products
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn create_product(&self, input: NewProduct) -> Result<Product> {
        let mut tables = self.tables.write().await;
        tables.ensure_category_exists(input.category_id)?;

        let product = Product::new(Uuid::new_v4(), input, Utc::now());
        tables.products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, category_id = %product.category_id, "Product created");

        Ok(product)
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>> {
        let mut tables = self.tables.write().await;

        if !tables.products.contains_key(&id) {
            return Ok(None);
        }

        if let Some(category_id) = changes.category_id {
            tables.ensure_category_exists(category_id)?;
        }

        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(None);
        };
        product.apply(changes, Utc::now());

        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let removed = self.tables.write().await.products.remove(&id).is_some();

        if removed {
            tracing::info!(product_id = %id, "Product deleted");
        }

        Ok(removed)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn check_health(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    async fn seed_category(store: &MemoryStore, name: &str) -> Category {
        store
            .create_category(NewCategory {
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap()
    }

    fn widget(category_id: Uuid) -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            description: None,
            price: dec!(9.99),
            stock_quantity: 5,
            category_id,
        }
    }

    #[tokio::test]
    async fn create_product_assigns_id_and_created_at() {
        let store = MemoryStore::new();
        let category = seed_category(&store, "Hardware").await;

        let before = Utc::now();
        let product = store.create_product(widget(category.id)).await.unwrap();

        assert!(!product.id.is_nil());
        assert!(product.created_at >= before);
        assert_eq!(product.updated_at, None);
        assert_eq!(
            store.find_product_by_id(product.id).await.unwrap(),
            Some(product)
        );
    }

    #[tokio::test]
    async fn create_product_rejects_unknown_category() {
        let store = MemoryStore::new();

        let err = store.create_product(widget(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn update_product_is_partial() {
        let store = MemoryStore::new();
        let category = seed_category(&store, "Hardware").await;
        let product = store
            .create_product(NewProduct {
                name: "A".to_string(),
                price: dec!(10),
                ..widget(category.id)
            })
            .await
            .unwrap();

        let updated = store
            .update_product(
                product.id,
                ProductChanges {
                    price: Some(dec!(20)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "A");
        assert_eq!(updated.price, dec!(20));
        assert_eq!(updated.created_at, product.created_at);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_product_to_unknown_category_fails() {
        let store = MemoryStore::new();
        let category = seed_category(&store, "Hardware").await;
        let product = store.create_product(widget(category.id)).await.unwrap();

        let err = store
            .update_product(
                product.id,
                ProductChanges {
                    category_id: Some(Uuid::new_v4()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));

        let unchanged = store.find_product_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(unchanged, product);
    }

    #[tokio::test]
    async fn update_missing_returns_none() {
        let store = MemoryStore::new();

        let result = store
            .update_product(Uuid::new_v4(), ProductChanges::default())
            .await
            .unwrap();
        assert!(result.is_none());

        let result = store
            .update_category(Uuid::new_v4(), CategoryChanges::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_category_with_products_is_rejected() {
        let store = MemoryStore::new();
        let category = seed_category(&store, "Hardware").await;
        let product = store.create_product(widget(category.id)).await.unwrap();

        let err = store.delete_category(category.id).await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
        assert!(store.find_category_by_id(category.id).await.unwrap().is_some());
        assert!(store.find_product_by_id(product.id).await.unwrap().is_some());

        assert!(store.delete_product(product.id).await.unwrap());
        assert!(store.delete_category(category.id).await.unwrap());
        assert!(!store.delete_category(category.id).await.unwrap());
    }

    #[tokio::test]
    async fn category_names_are_unique() {
        let store = MemoryStore::new();
        seed_category(&store, "Hardware").await;
        let garden = seed_category(&store, "Garden").await;

        let err = store
            .create_category(NewCategory {
                name: "Hardware".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));

        let err = store
            .update_category(
                garden.id,
                CategoryChanges {
                    name: Some("Hardware".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));

        let renamed = store
            .update_category(
                garden.id,
                CategoryChanges {
                    name: Some("Garden".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert!(renamed.is_some());
    }

    #[tokio::test]
    async fn list_categories_sorts_and_filters() {
        let store = MemoryStore::new();
        for name in ["Tools", "Garden", "Toys"] {
            seed_category(&store, name).await;
        }

        let all = store
            .list_categories(&CategoryFilter::default())
            .await
            .unwrap();
        let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Garden", "Tools", "Toys"]);

        let filtered = store
            .list_categories(&CategoryFilter {
                name: Some("to".to_string()),
                limit: Some(1),
                offset: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Toys");
    }

    #[tokio::test]
    async fn list_products_by_category() {
        let store = MemoryStore::new();
        let tools = seed_category(&store, "Tools").await;
        let garden = seed_category(&store, "Garden").await;

        store.create_product(widget(tools.id)).await.unwrap();
        store.create_product(widget(tools.id)).await.unwrap();
        store.create_product(widget(garden.id)).await.unwrap();

        let listed = store
            .list_products(&ProductFilter::in_category(tools.id))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|p| p.category_id == tools.id));
    }
}
