use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Category, CategoryChanges, CategoryFilter, NewCategory},
    queries::contains_pattern,
    storage::page,
};

/// Find category by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(category)
}

/// List categories ordered by name
pub async fn get_all(pool: &PgPool, filter: &CategoryFilter) -> Result<Vec<Category>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM categories WHERE 1=1");

    if let Some(ref name) = filter.name {
        query.push(" AND name ILIKE ");
        query.push_bind(contains_pattern(name));
        query.push(" ESCAPE '\\'");
    }

    let (limit, offset) = page(filter.limit, filter.offset);

    query.push(" ORDER BY name ASC, id ASC LIMIT ");
    query.push_bind(limit);
    query.push(" OFFSET ");
    query.push_bind(offset);

    let categories = query.build_query_as::<Category>().fetch_all(pool).await?;

    Ok(categories)
}

/// Create a new category
pub async fn create_category(pool: &PgPool, input: NewCategory) -> Result<Category> {
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, description)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&input.name)
    .bind(&input.description)
    .fetch_one(pool)
    .await?;

    tracing::info!(category_id = %category.id, "Category created");

    Ok(category)
}

/// Update an existing category
pub async fn update_category(
    pool: &PgPool,
    id: Uuid,
    changes: CategoryChanges,
) -> Result<Option<Category>> {
    if changes.is_empty() {
        return find_by_id(pool, id).await;
    }

    let mut query_builder = QueryBuilder::<Postgres>::new("UPDATE categories SET ");
    let mut fields = query_builder.separated(", ");

    if let Some(name) = changes.name {
        fields.push("name = ");
        fields.push_bind_unseparated(name);
    }

    if let Some(description) = changes.description {
        fields.push("description = ");
        fields.push_bind_unseparated(description);
    }

    fields.push("updated_at = NOW()");

    query_builder.push(" WHERE id = ");
    query_builder.push_bind(id);
    query_builder.push(" RETURNING *");

    let category = query_builder
        .build_query_as::<Category>()
        .fetch_optional(pool)
        .await?;

    Ok(category)
}

/// Delete a category that no longer owns products
pub async fn delete_category(pool: &PgPool, id: Uuid) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

    if locked.is_none() {
        return Ok(false);
    }

    let product_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

    if product_count > 0 {
        return Err(AppError::ConstraintViolation(format!(
            "Category {} still has {} product(s)",
            id, product_count
        )));
    }

    // The RESTRICT foreign key still guards against a product inserted concurrently.
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(category_id = %id, "Category deleted");

    Ok(result.rows_affected() > 0)
}
