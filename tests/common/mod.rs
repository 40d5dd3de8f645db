use std::sync::Arc;

use axum::{body::Body, Router};
use catalog_back::{routes, storage::MemoryStore, AppState};
use http::{Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn test_app() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()));
    routes::create_router().with_state(state)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    let builder = Request::builder().method(method).uri(uri);

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, value))
}

pub async fn create_category(app: &Router, name: &str) -> Result<String, Box<dyn std::error::Error>> {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/categories",
        Some(serde_json::json!({ "name": name })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    Ok(body["id"].as_str().ok_or("category id missing")?.to_string())
}

pub async fn create_product(
    app: &Router,
    category_id: &str,
    name: &str,
    price: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/products",
        Some(serde_json::json!({
            "name": name,
            "price": price,
            "stock_quantity": 5,
            "category_id": category_id,
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    Ok(body)
}
