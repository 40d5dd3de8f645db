use axum::{Json, extract::State};
use http::StatusCode;
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        CategoryFilter, CategoryResponse, CreateCategoryRequest, ProductFilter, ProductResponse,
        UpdateCategoryRequest,
    },
    storage::{CategoryStore, ProductStore},
    utils::extractors::{JsonBody, PathParam, QueryParams},
};

pub async fn list_categories(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<CategoryFilter>,
) -> Result<Json<Vec<CategoryResponse>>> {
    let categories = state.store.list_categories(&filter).await?;

    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

pub async fn get_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<CategoryResponse>> {
    let category = state
        .store
        .find_category_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))?;

    Ok(Json(category.into()))
}

pub async fn create_category(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    let input = payload.validate_create()?;
    let category = state.store.create_category(input).await?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

pub async fn update_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>> {
    let changes = payload.validate_update()?;

    let category = state
        .store
        .update_category(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))?;

    Ok(Json(category.into()))
}

pub async fn delete_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode> {
    if !state.store.delete_category(id).await? {
        return Err(AppError::NotFound(format!(
            "Category with id {} not found",
            id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_category_products(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    QueryParams(filter): QueryParams<ProductFilter>,
) -> Result<Json<Vec<ProductResponse>>> {
    if state.store.find_category_by_id(id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Category with id {} not found",
            id
        )));
    }

    let filter = ProductFilter {
        category_id: Some(id),
        ..filter
    };
    let products = state.store.list_products(&filter).await?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}
