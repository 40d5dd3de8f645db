use axum::{Json, extract::State};
use http::StatusCode;
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateProductRequest, ProductFilter, ProductResponse, UpdateProductRequest},
    storage::{CategoryStore, ProductStore},
    utils::extractors::{JsonBody, PathParam, QueryParams},
};

async fn ensure_category_exists(state: &AppState, category_id: Uuid) -> Result<()> {
    if state.store.find_category_by_id(category_id).await?.is_none() {
        return Err(AppError::ConstraintViolation(format!(
            "Category {} does not exist",
            category_id
        )));
    }
    Ok(())
}

pub async fn list_products(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ProductFilter>,
) -> Result<Json<Vec<ProductResponse>>> {
    let products = state.store.list_products(&filter).await?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

pub async fn get_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ProductResponse>> {
    let product = state
        .store
        .find_product_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", id)))?;

    Ok(Json(product.into()))
}

pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let input = payload.validate_create()?;
    ensure_category_exists(&state, input.category_id).await?;

    let product = state.store.create_product(input).await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

pub async fn update_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateProductRequest>,
) -> Result<Json<ProductResponse>> {
    let changes = payload.validate_update()?;

    if state.store.find_product_by_id(id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Product with id {} not found",
            id
        )));
    }

    if let Some(category_id) = changes.category_id {
        ensure_category_exists(&state, category_id).await?;
    }

    let product = state
        .store
        .update_product(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", id)))?;

    Ok(Json(product.into()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode> {
    if !state.store.delete_product(id).await? {
        return Err(AppError::NotFound(format!(
            "Product with id {} not found",
            id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
