use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{NewProduct, Product, ProductChanges, ProductFilter},
    queries::contains_pattern,
    storage::page,
};

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn search_products(pool: &PgPool, params: &ProductFilter) -> Result<Vec<Product>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM products WHERE 1=1");

    // category
    if let Some(category_id) = params.category_id {
        query.push(" AND category_id = ");
        query.push_bind(category_id);
    }

    // text search
    if let Some(ref name) = params.name {
        query.push(" AND name ILIKE ");
        query.push_bind(contains_pattern(name));
        query.push(" ESCAPE '\\'");
    }

    // price range
    if let Some(min_price) = params.min_price {
        query.push(" AND price >= ");
        query.push_bind(min_price);
    }

    if let Some(max_price) = params.max_price {
        query.push(" AND price <= ");
        query.push_bind(max_price);
    }

    let (limit, offset) = page(params.limit, params.offset);

    query.push(" ORDER BY created_at DESC, id ASC LIMIT ");
    query.push_bind(limit);
    query.push(" OFFSET ");
    query.push_bind(offset);

    let products = query.build_query_as::<Product>().fetch_all(pool).await?;

    Ok(products)
}

pub async fn create_product(pool: &PgPool, input: NewProduct) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, name, description, price, stock_quantity, category_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.price)
    .bind(input.stock_quantity)
    .bind(input.category_id)
    .fetch_one(pool)
    .await?;

    tracing::info!(product_id = %product.id, category_id = %product.category_id, "Product created");

    Ok(product)
}

pub async fn update_product(
    pool: &PgPool,
    id: Uuid,
    changes: ProductChanges,
) -> Result<Option<Product>> {
    if changes.is_empty() {
        return find_by_id(pool, id).await;
    }

    let mut query_builder = QueryBuilder::<Postgres>::new("UPDATE products SET ");
    let mut fields = query_builder.separated(", ");

    if let Some(name) = changes.name {
        fields.push("name = ");
        fields.push_bind_unseparated(name);
    }

    if let Some(description) = changes.description {
        fields.push("description = ");
        fields.push_bind_unseparated(description);
    }

    if let Some(price) = changes.price {
        fields.push("price = ");
        fields.push_bind_unseparated(price);
    }

    if let Some(stock_quantity) = changes.stock_quantity {
        fields.push("stock_quantity = ");
        fields.push_bind_unseparated(stock_quantity);
    }

    if let Some(category_id) = changes.category_id {
        fields.push("category_id = ");
        fields.push_bind_unseparated(category_id);
    }

    fields.push("updated_at = NOW()");

    query_builder.push(" WHERE id = ");
    query_builder.push_bind(id);
    query_builder.push(" RETURNING *");

    let product = query_builder
        .build_query_as::<Product>()
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn delete_product(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!(product_id = %id, "Product deleted");
    }

    Ok(result.rows_affected() > 0)
}
