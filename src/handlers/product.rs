// src/handlers/product.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use crate::dtos::product::{CreateProductRequest, UpdateProductRequest, ProductResponse, Pagination};
use crate::models::product::Product;
use crate::state::AppState;
use crate::error::AppError;
use tracing::{info, instrument};

fn validate_fields(name: Option<&str>, price: Option<f64>, stock: Option<i32>) -> Result<(), AppError> {
    if matches!(name, Some(n) if n.trim().is_empty()) {
        return Err(AppError::validation("Product name required"));
    }
    if matches!(price, Some(p) if !(p > 0.0)) {
        return Err(AppError::validation("Price must be greater than 0"));
    }
    if matches!(stock, Some(s) if s < 0) {
        return Err(AppError::validation("Stock cannot be negative"));
    }
    Ok(())
}

// GET /products - List products
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let (skip, limit) = page.bounds();
    let store = state.store.read().await;
    let response = store.products(skip, limit).into_iter().map(ProductResponse::from).collect();
    Ok(Json(response))
}

// GET /products/{id} - Get single product
#[instrument(skip(state))]
pub async fn get_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ProductResponse>, AppError> {
    let store = state.store.read().await;
    let product = store
        .product(id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductResponse::from(product)))
}

// POST /products - Create new product
#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    validate_fields(Some(&payload.name), Some(payload.price), Some(payload.stock))?;

    let now = state.clock.now();
    let mut store = state.store.write().await;
    let id = store.next_id();
    let product = store.insert_product(Product {
        id,
        name: payload.name.trim().to_string(),
        description: payload.description,
        price: payload.price,
        stock: payload.stock,
        image_url: payload.image_url,
        category: payload.category,
        created_at: now,
    });
    info!(id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

// PUT /products/{id} - Update product
#[instrument(skip(state, payload))]
pub async fn update_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    validate_fields(payload.name.as_deref(), payload.price, payload.stock)?;

    let mut store = state.store.write().await;
    let product = store
        .product_mut(id)
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    if let Some(name) = payload.name {
        product.name = name.trim().to_string();
    }
    if let Some(description) = payload.description {
        product.description = Some(description);
    }
    if let Some(price) = payload.price {
        product.price = price;
    }
    if let Some(stock) = payload.stock {
        product.stock = stock;
    }
    if let Some(image_url) = payload.image_url {
        product.image_url = Some(image_url);
    }
    if let Some(category) = payload.category {
        product.category = Some(category);
    }

    Ok(Json(ProductResponse::from(product.clone())))
}

// DELETE /products/{id} - Delete product
#[instrument(skip(state))]
pub async fn delete_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.write().await;
    store
        .remove_product(id)
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    info!(id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}
