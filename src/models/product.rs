use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{self, FieldErrors, not_blank, not_nil, valid_price};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(id: Uuid, input: NewProduct, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            stock_quantity: input.stock_quantity,
            category_id: input.category_id,
            created_at,
            updated_at: None,
        }
    }

    /// Overwrites the provided fields; stamps `updated_at` only when something was provided.
    pub fn apply(&mut self, changes: ProductChanges, now: DateTime<Utc>) {
        if changes.is_empty() {
            return;
        }

        if let Some(name) = changes.name {
            self.name = name;
        }

        if let Some(description) = changes.description {
            self.description = Some(description);
        }

        if let Some(price) = changes.price {
            self.price = price;
        }

        if let Some(stock_quantity) = changes.stock_quantity {
            self.stock_quantity = stock_quantity;
        }

        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }

        self.updated_at = Some(now);
    }
}

/// A create payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: Uuid,
}

/// The fields of an update payload that passed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub category_id: Option<Uuid>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock_quantity.is_none()
            && self.category_id.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(
        required(message = "is required"),
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(required(message = "is required"), custom(function = "valid_price"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock_quantity: Option<i32>,
    #[validate(required(message = "is required"), custom(function = "not_nil"))]
    pub category_id: Option<Uuid>,
}

impl CreateProductRequest {
    pub fn validate_create(self) -> Result<NewProduct, FieldErrors> {
        validation::validate(&self)?;

        Ok(NewProduct {
            name: validation::required(self.name, "name")?,
            description: self.description,
            price: validation::required(self.price, "price")?,
            stock_quantity: self.stock_quantity.unwrap_or(0),
            category_id: validation::required(self.category_id, "category_id")?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "valid_price"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock_quantity: Option<i32>,
    #[validate(custom(function = "not_nil"))]
    pub category_id: Option<Uuid>,
}

impl UpdateProductRequest {
    pub fn validate_update(self) -> Result<ProductChanges, FieldErrors> {
        validation::validate(&self)?;

        Ok(ProductChanges {
            name: self.name,
            description: self.description,
            price: self.price,
            stock_quantity: self.stock_quantity,
            category_id: self.category_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductFilter {
    pub fn in_category(category_id: Uuid) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category_id) = self.category_id {
            if product.category_id != category_id {
                return false;
            }
        }

        if let Some(ref name) = self.name {
            if !product.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }

        if let Some(min_price) = self.min_price {
            if product.price < min_price {
                return false;
            }
        }

        if let Some(max_price) = self.max_price {
            if product.price > max_price {
                return false;
            }
        }

        true
    }
}

/// Outbound projection of a [`Product`]. Only the category's id is exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock_quantity: product.stock_quantity,
            category_id: product.category_id,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        product.clone().into()
    }
}

impl From<ProductResponse> for Product {
    fn from(response: ProductResponse) -> Self {
        Self {
            id: response.id,
            name: response.name,
            description: response.description,
            price: response.price,
            stock_quantity: response.stock_quantity,
            category_id: response.category_id,
            created_at: response.created_at,
            updated_at: response.updated_at,
        }
    }
}
