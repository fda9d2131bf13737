use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::dtos::product::Pagination;
use crate::error::AppError;
use crate::models::order::{Order, ShippingMethod, SHIPPING_METHODS};
use crate::state::AppState;

// GET /orders/{id}
pub async fn get_order(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Order>, AppError> {
    let store = state.store.read().await;
    let order = store.order(&id).cloned().ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(Json(order))
}

// GET /orders/session/{session_id}
pub async fn list_session_orders(
    Path(session_id): Path<String>,
    Query(page): Query<Pagination>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, AppError> {
    let (skip, limit) = page.bounds();
    let store = state.store.read().await;
    Ok(Json(store.orders_for_session(&session_id, skip, limit)))
}

// GET /shipping-methods
pub async fn list_shipping_methods() -> Json<&'static [ShippingMethod]> {
    Json(SHIPPING_METHODS.as_slice())
}
